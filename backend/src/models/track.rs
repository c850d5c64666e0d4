//! Alt/az trajectory samples over one night.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::compass::CompassDirection;

/// A single trajectory point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSample {
    pub instant: DateTime<Utc>,
    /// Degrees above the horizon; negative below
    pub altitude_deg: f64,
    /// Compass bearing in [0, 360)
    pub azimuth_deg: f64,
}

impl TrackSample {
    pub fn direction(&self) -> CompassDirection {
        CompassDirection::from_azimuth(self.azimuth_deg)
    }
}

/// Evenly spaced samples ordered by instant. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    samples: Vec<TrackSample>,
}

impl Track {
    /// Returns `None` for an empty sample list or one not strictly ordered by
    /// instant.
    pub fn new(samples: Vec<TrackSample>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        if samples.windows(2).any(|w| w[0].instant >= w[1].instant) {
            return None;
        }
        Some(Self { samples })
    }

    pub fn samples(&self) -> &[TrackSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> &TrackSample {
        &self.samples[0]
    }

    pub fn last(&self) -> &TrackSample {
        &self.samples[self.samples.len() - 1]
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample(minute: i64, alt: f64) -> TrackSample {
        TrackSample {
            instant: Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap() + Duration::minutes(minute),
            altitude_deg: alt,
            azimuth_deg: 180.0,
        }
    }

    #[test]
    fn test_track_rejects_empty() {
        assert!(Track::new(Vec::new()).is_none());
    }

    #[test]
    fn test_track_rejects_unordered() {
        assert!(Track::new(vec![sample(5, 1.0), sample(1, 2.0)]).is_none());
        assert!(Track::new(vec![sample(1, 1.0), sample(1, 2.0)]).is_none());
    }

    #[test]
    fn test_sample_direction() {
        assert_eq!(sample(0, 10.0).direction(), CompassDirection::S);
    }
}
