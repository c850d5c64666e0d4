//! Planner configuration file support.
//!
//! Configuration is read from a TOML file with every field defaulted, so an
//! empty file (or none at all) yields a Frankfurt-based setup with the standard
//! analysis parameters.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use crate::error::{PlannerError, PlannerResult};
use crate::models::Location;
use crate::resolver::CatalogEntry;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "DSO_PLANNER_CONFIG";

/// Environment variable selecting a built-in site preset.
pub const SITE_ENV: &str = "DSO_PLANNER_SITE";

/// Top-level planner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub location: LocationSettings,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
}

/// Observer site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSettings {
    #[serde(default = "default_site_name")]
    pub name: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_elevation_m")]
    pub elevation_m: f64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Parameters of the nightly track and visibility test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Hours sampled either side of local midnight
    #[serde(default = "default_half_window_hours")]
    pub half_window_hours: f64,
    /// Samples per night track
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    /// Altitude a sample must exceed to count towards visibility
    #[serde(default = "default_min_visible_altitude_deg")]
    pub min_visible_altitude_deg: f64,
    /// Samples above the altitude threshold must exceed this count
    #[serde(default = "default_min_visible_samples")]
    pub min_visible_samples: usize,
    /// Moon illumination below this percentage counts as dim
    #[serde(default = "default_moon_illumination_threshold_pct")]
    pub moon_illumination_threshold_pct: f64,
}

/// Execution limits for concurrent per-target work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_target_timeout_secs")]
    pub target_timeout_secs: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_site_name() -> String {
    "Frankfurt".to_string()
}

fn default_latitude() -> f64 {
    50.110573
}

fn default_longitude() -> f64 {
    8.684966
}

fn default_elevation_m() -> f64 {
    207.0
}

fn default_timezone() -> String {
    "Europe/Berlin".to_string()
}

fn default_half_window_hours() -> f64 {
    12.0
}

fn default_sample_count() -> usize {
    1000
}

fn default_min_visible_altitude_deg() -> f64 {
    5.0
}

fn default_min_visible_samples() -> usize {
    30
}

fn default_moon_illumination_threshold_pct() -> f64 {
    50.0
}

fn default_target_timeout_secs() -> u64 {
    30
}

fn default_max_concurrency() -> usize {
    8
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            elevation_m: default_elevation_m(),
            timezone: default_timezone(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            half_window_hours: default_half_window_hours(),
            sample_count: default_sample_count(),
            min_visible_altitude_deg: default_min_visible_altitude_deg(),
            min_visible_samples: default_min_visible_samples(),
            moon_illumination_threshold_pct: default_moon_illumination_threshold_pct(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            target_timeout_secs: default_target_timeout_secs(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl LocationSettings {
    /// Validate and convert into a [`Location`].
    pub fn to_location(&self) -> PlannerResult<Location> {
        Location::new(
            self.name.clone(),
            self.latitude,
            self.longitude,
            self.elevation_m,
            &self.timezone,
        )
        .map_err(PlannerError::configuration)
    }
}

impl From<&Location> for LocationSettings {
    fn from(location: &Location) -> Self {
        Self {
            name: location.name.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            elevation_m: location.elevation_m,
            timezone: location.timezone.name().to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Spacing between consecutive track samples.
    pub fn cadence(&self) -> chrono::Duration {
        let intervals = self.sample_count.saturating_sub(1).max(1) as i64;
        let span_ms = (2.0 * self.half_window_hours * 3_600_000.0).round() as i64;
        chrono::Duration::milliseconds(span_ms / intervals)
    }

    /// Real-time duration implied by the visibility sample threshold
    /// (about 43 minutes with the defaults).
    pub fn min_visible_duration(&self) -> chrono::Duration {
        self.cadence() * self.min_visible_samples as i32
    }

    pub fn validate(&self) -> PlannerResult<()> {
        if !self.half_window_hours.is_finite() || self.half_window_hours <= 0.0 || self.half_window_hours > 24.0 {
            return Err(PlannerError::configuration(format!(
                "half_window_hours must be in (0, 24], got {}",
                self.half_window_hours
            )));
        }
        if self.sample_count < 2 {
            return Err(PlannerError::configuration(format!(
                "sample_count must be at least 2, got {}",
                self.sample_count
            )));
        }
        if !(-90.0..=90.0).contains(&self.min_visible_altitude_deg) {
            return Err(PlannerError::configuration(format!(
                "min_visible_altitude_deg must be within [-90, 90], got {}",
                self.min_visible_altitude_deg
            )));
        }
        if self.min_visible_samples >= self.sample_count {
            return Err(PlannerError::configuration(format!(
                "min_visible_samples ({}) must be below sample_count ({})",
                self.min_visible_samples, self.sample_count
            )));
        }
        if !(0.0..=100.0).contains(&self.moon_illumination_threshold_pct) {
            return Err(PlannerError::configuration(format!(
                "moon_illumination_threshold_pct must be within [0, 100], got {}",
                self.moon_illumination_threshold_pct
            )));
        }
        Ok(())
    }
}

impl RuntimeConfig {
    pub fn target_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.target_timeout_secs)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        if self.target_timeout_secs == 0 {
            return Err(PlannerError::configuration("target_timeout_secs must be positive"));
        }
        if self.max_concurrency == 0 {
            return Err(PlannerError::configuration("max_concurrency must be positive"));
        }
        Ok(())
    }
}

impl PlannerConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> PlannerResult<Self> {
        toml::from_str(content)
            .map_err(|e| PlannerError::configuration(format!("Failed to parse config file: {}", e)))
    }

    /// Load planner configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(PlannerConfig)` if successful
    /// * `Err(PlannerError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            PlannerError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded planner configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load planner configuration from the default location.
    ///
    /// Searches for `dso-planner.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> PlannerResult<Self> {
        let search_paths = [
            PathBuf::from("dso-planner.toml"),
            PathBuf::from("backend/dso-planner.toml"),
            PathBuf::from("../dso-planner.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(PlannerError::configuration(
            "No dso-planner.toml found in standard locations",
        ))
    }

    /// Resolve configuration from the environment.
    ///
    /// `DSO_PLANNER_CONFIG` wins if set; otherwise the default locations are
    /// searched, falling back to built-in defaults. `DSO_PLANNER_SITE` then
    /// replaces the location with a named preset.
    pub fn from_env_or_default() -> PlannerResult<Self> {
        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::from_default_location().unwrap_or_else(|e| {
                log::info!("{}; using built-in defaults", e);
                Self::default()
            }),
        };
        if let Ok(site) = env::var(SITE_ENV) {
            config.apply_site_preset(&site)?;
        }
        Ok(config)
    }

    /// Replace the location with a built-in preset (`frankfurt`, `windhoek`).
    pub fn apply_site_preset(&mut self, site: &str) -> PlannerResult<()> {
        let location = Location::preset(site)
            .ok_or_else(|| PlannerError::configuration(format!("Unknown site preset '{}'", site)))?;
        self.location = LocationSettings::from(&location);
        Ok(())
    }

    /// Validate every section; the location is returned ready for use.
    pub fn validate(&self) -> PlannerResult<Location> {
        let location = self.location.to_location()?;
        self.analysis.validate()?;
        self.runtime.validate()?;
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = PlannerConfig::from_toml_str("").unwrap();
        assert_eq!(config.location.name, "Frankfurt");
        assert_eq!(config.analysis.sample_count, 1000);
        assert_eq!(config.analysis.min_visible_samples, 30);
        assert_eq!(config.analysis.half_window_hours, 12.0);
        assert_eq!(config.runtime.target_timeout_secs, 30);
        assert!(config.catalog.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let toml = r#"
[location]
name = "Windhoek"
latitude = -22.5608807
longitude = 17.0657549
timezone = "Africa/Windhoek"

[analysis]
sample_count = 2000
"#;
        let config = PlannerConfig::from_toml_str(toml).unwrap();
        let location = config.validate().unwrap();
        assert_eq!(location.timezone, chrono_tz::Africa::Windhoek);
        assert_eq!(config.location.elevation_m, 207.0);
        assert_eq!(config.analysis.sample_count, 2000);
        assert_eq!(config.analysis.min_visible_altitude_deg, 5.0);
    }

    #[test]
    fn test_catalog_entries_parse() {
        let toml = r#"
[[catalog]]
name = "M13"
identifier = "NGC 6205"
ra_deg = 250.4235
dec_deg = 36.4613
object_type = "GlC"
magnitude = 5.8
"#;
        let config = PlannerConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.catalog.len(), 1);
        assert_eq!(config.catalog[0].name, "M13");
        assert_eq!(config.catalog[0].magnitude, Some(5.8));
        assert_eq!(config.catalog[0].major_axis_arcmin, None);
    }

    #[test]
    fn test_invalid_latitude_is_configuration_error() {
        let toml = r#"
[location]
latitude = 123.0
"#;
        let config = PlannerConfig::from_toml_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.condition(), "configuration");
    }

    #[test]
    fn test_invalid_analysis_is_rejected() {
        let mut config = PlannerConfig::default();
        config.analysis.min_visible_samples = 5000;
        assert!(config.validate().is_err());

        let mut config = PlannerConfig::default();
        config.analysis.half_window_hours = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_visible_duration_default() {
        let analysis = AnalysisConfig::default();
        // 30 samples at ~86.5 s cadence
        assert_eq!(analysis.min_visible_duration().num_minutes(), 43);
    }

    #[test]
    fn test_site_preset() {
        let mut config = PlannerConfig::default();
        config.apply_site_preset("windhoek").unwrap();
        assert_eq!(config.location.timezone, "Africa/Windhoek");
        assert!(config.apply_site_preset("gotham").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[runtime]\nmax_concurrency = 2").unwrap();
        let config = PlannerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.runtime.max_concurrency, 2);
        assert_eq!(config.runtime.target_timeout_secs, 30);
    }

    #[test]
    fn test_from_missing_file() {
        let err = PlannerConfig::from_file("/nonexistent/dso-planner.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
