//! Sixteen-point compass buckets for azimuth bearings.

use qtty::Degrees;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 16-point compass label.
///
/// Bucket edges sit on multiples of 15° rather than the usual 11.25° steps;
/// the four cardinal points cover 30° each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassDirection {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NWN,
}

/// Upper bucket edge (exclusive) paired with its label, in bearing order.
const BUCKETS: [(f64, CompassDirection); 16] = [
    (15.0, CompassDirection::N),
    (30.0, CompassDirection::NNE),
    (60.0, CompassDirection::NE),
    (75.0, CompassDirection::ENE),
    (105.0, CompassDirection::E),
    (135.0, CompassDirection::ESE),
    (150.0, CompassDirection::SE),
    (165.0, CompassDirection::SSE),
    (195.0, CompassDirection::S),
    (225.0, CompassDirection::SSW),
    (240.0, CompassDirection::SW),
    (255.0, CompassDirection::WSW),
    (285.0, CompassDirection::W),
    (300.0, CompassDirection::WNW),
    (330.0, CompassDirection::NW),
    (345.0, CompassDirection::NWN),
];

impl CompassDirection {
    /// Map an azimuth bearing in degrees to its compass bucket.
    ///
    /// Any finite input is wrapped into `[0, 360)` first, so `from_azimuth(x)`
    /// equals `from_azimuth(x + 360 * k)`. Non-finite input maps to `N`.
    pub fn from_azimuth(azimuth_deg: f64) -> Self {
        if !azimuth_deg.is_finite() {
            return CompassDirection::N;
        }
        let bearing = Degrees::new(azimuth_deg).wrap_pos().value();
        BUCKETS
            .iter()
            .find(|(upper, _)| bearing < *upper)
            .map(|(_, direction)| *direction)
            .unwrap_or(CompassDirection::N)
    }

    /// Short label, e.g. `"SSW"`.
    pub fn label(&self) -> &'static str {
        match self {
            CompassDirection::N => "N",
            CompassDirection::NNE => "NNE",
            CompassDirection::NE => "NE",
            CompassDirection::ENE => "ENE",
            CompassDirection::E => "E",
            CompassDirection::ESE => "ESE",
            CompassDirection::SE => "SE",
            CompassDirection::SSE => "SSE",
            CompassDirection::S => "S",
            CompassDirection::SSW => "SSW",
            CompassDirection::SW => "SW",
            CompassDirection::WSW => "WSW",
            CompassDirection::W => "W",
            CompassDirection::WNW => "WNW",
            CompassDirection::NW => "NW",
            CompassDirection::NWN => "NWN",
        }
    }

    /// Substring match against the label, so `"S"` matches `S`, `SSE` and `SW`.
    pub fn matches(&self, filter: &str) -> bool {
        self.label().contains(filter.trim())
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Convenience wrapper for [`CompassDirection::from_azimuth`].
pub fn direction(azimuth_deg: f64) -> CompassDirection {
    CompassDirection::from_azimuth(azimuth_deg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_north_wraps_both_ends() {
        assert_eq!(direction(0.0), CompassDirection::N);
        assert_eq!(direction(360.0), CompassDirection::N);
        assert_eq!(direction(14.999), CompassDirection::N);
        assert_eq!(direction(345.0), CompassDirection::N);
    }

    #[test]
    fn test_bucket_edges_are_half_open() {
        assert_eq!(direction(15.0), CompassDirection::NNE);
        assert_eq!(direction(30.0), CompassDirection::NE);
        assert_eq!(direction(59.999), CompassDirection::NE);
        assert_eq!(direction(75.0), CompassDirection::E);
        assert_eq!(direction(165.0), CompassDirection::S);
        assert_eq!(direction(194.999), CompassDirection::S);
        assert_eq!(direction(195.0), CompassDirection::SSW);
        assert_eq!(direction(330.0), CompassDirection::NWN);
        assert_eq!(direction(344.999), CompassDirection::NWN);
    }

    #[test]
    fn test_negative_azimuth_is_normalized() {
        assert_eq!(direction(-90.0), CompassDirection::W);
        assert_eq!(direction(-10.0), CompassDirection::N);
        assert_eq!(direction(-180.0), CompassDirection::S);
    }

    #[test]
    fn test_non_finite_maps_to_north() {
        assert_eq!(direction(f64::NAN), CompassDirection::N);
        assert_eq!(direction(f64::INFINITY), CompassDirection::N);
    }

    #[test]
    fn test_label_substring_filter() {
        assert!(CompassDirection::SSE.matches("S"));
        assert!(CompassDirection::SSW.matches("S"));
        assert!(CompassDirection::S.matches("S"));
        assert!(!CompassDirection::NNE.matches("S"));
        assert!(CompassDirection::WNW.matches("NW"));
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(CompassDirection::NWN.to_string(), "NWN");
    }

    proptest! {
        #[test]
        fn prop_direction_is_periodic(x in 0.0f64..360.0, k in -20i32..20) {
            let shifted = x + 360.0 * k as f64;
            // Skip values that land on a bucket edge after float wrap-around.
            let wrapped = Degrees::new(shifted).wrap_pos().value();
            prop_assume!((wrapped - x).abs() < 1e-9);
            prop_assert_eq!(direction(x), direction(shifted));
        }
    }
}
