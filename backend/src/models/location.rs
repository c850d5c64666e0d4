//! Observer site description.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Geographic observer location with its civil timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Display name of the site
    pub name: String,
    /// Latitude in decimal degrees (-90 to 90), north positive
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180), east positive
    pub longitude: f64,
    /// Elevation in meters above sea level
    pub elevation_m: f64,
    /// IANA timezone used for local midnight and display
    pub timezone: Tz,
}

impl Location {
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        elevation_m: f64,
        timezone: &str,
    ) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err("Latitude must be between -90 and 90 degrees".to_string());
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err("Longitude must be between -180 and 180 degrees".to_string());
        }
        if !elevation_m.is_finite() {
            return Err("Elevation must be a finite number of meters".to_string());
        }
        let timezone: Tz = timezone
            .parse()
            .map_err(|e| format!("Unknown timezone '{}': {}", timezone, e))?;
        Ok(Self {
            name: name.into(),
            latitude,
            longitude,
            elevation_m,
            timezone,
        })
    }

    /// Frankfurt am Main, Germany.
    pub fn frankfurt() -> Self {
        Self {
            name: "Frankfurt".to_string(),
            latitude: 50.110573,
            longitude: 8.684966,
            elevation_m: 207.0,
            timezone: chrono_tz::Europe::Berlin,
        }
    }

    /// Windhoek, Namibia.
    pub fn windhoek() -> Self {
        Self {
            name: "Windhoek".to_string(),
            latitude: -22.5608807,
            longitude: 17.0657549,
            elevation_m: 1655.0,
            timezone: chrono_tz::Africa::Windhoek,
        }
    }

    /// Look up a built-in site by case-insensitive name.
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "frankfurt" => Some(Self::frankfurt()),
            "windhoek" => Some(Self::windhoek()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_rejects_bad_latitude() {
        let err = Location::new("x", 91.0, 0.0, 0.0, "UTC").unwrap_err();
        assert!(err.contains("Latitude"));
    }

    #[test]
    fn test_location_rejects_bad_longitude() {
        assert!(Location::new("x", 0.0, -180.5, 0.0, "UTC").is_err());
    }

    #[test]
    fn test_location_rejects_unknown_timezone() {
        let err = Location::new("x", 10.0, 10.0, 0.0, "Mars/Olympus").unwrap_err();
        assert!(err.contains("Mars/Olympus"));
    }

    #[test]
    fn test_location_accepts_valid_input() {
        let loc = Location::new("Home", 50.11, 8.68, 207.0, "Europe/Berlin").unwrap();
        assert_eq!(loc.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(loc.name, "Home");
    }

    #[test]
    fn test_presets() {
        assert_eq!(Location::preset("Frankfurt"), Some(Location::frankfurt()));
        assert_eq!(Location::preset(" windhoek "), Some(Location::windhoek()));
        assert!(Location::preset("atlantis").is_none());
        assert!(Location::windhoek().latitude < 0.0);
    }
}
