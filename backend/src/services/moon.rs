//! Moon interference scoring.
//!
//! Three independent checks are evaluated at the instant a target peaks:
//! the Moon below the horizon (TOP), the Moon in a different compass
//! direction (OK) and a dim Moon (Nice). Each passing check adds a rationale
//! line and marks the score as acceptable; only the first also marks it TOP.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::ephemeris::{Body, CrossingKind, Ephemeris, HorizonCrossing, Period};
use crate::models::{CompassDirection, Location};

/// Marker prefix of a rationale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonMarker {
    /// Moon below the horizon
    Top,
    /// Moon in a different direction than the target
    Ok,
    /// Moon illumination below the threshold
    Nice,
}

impl MoonMarker {
    pub fn label(&self) -> &'static str {
        match self {
            MoonMarker::Top => "TOP",
            MoonMarker::Ok => "OK",
            MoonMarker::Nice => "Nice",
        }
    }
}

/// One passed check with its human-readable explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonRemark {
    pub marker: MoonMarker,
    pub text: String,
}

/// Moon conditions at the instant of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonScore {
    pub is_ok: bool,
    pub is_top: bool,
    pub remarks: Vec<MoonRemark>,
    pub direction: Option<CompassDirection>,
    pub altitude_deg: Option<f64>,
    pub azimuth_deg: Option<f64>,
    pub illumination_percent: Option<f64>,
    /// Moon-Sun elongation measured eastward, in [0, 360)
    pub phase_angle_deg: Option<f64>,
    pub next_moonrise: Option<DateTime<Utc>>,
    pub next_moonset: Option<DateTime<Utc>>,
    pub next_full_moon: Option<DateTime<Utc>>,
    /// Set when the Moon could not be evaluated
    pub unavailable_reason: Option<String>,
}

impl MoonScore {
    /// Conservative score used when the Moon cannot be evaluated.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_ok: false,
            is_top: false,
            remarks: Vec::new(),
            direction: None,
            altitude_deg: None,
            azimuth_deg: None,
            illumination_percent: None,
            phase_angle_deg: None,
            next_moonrise: None,
            next_moonset: None,
            next_full_moon: None,
            unavailable_reason: Some(reason.into()),
        }
    }

    pub fn has_marker(&self, marker: MoonMarker) -> bool {
        self.remarks.iter().any(|r| r.marker == marker)
    }

    /// Rationale lines, newline separated.
    pub fn rationale(&self) -> String {
        match &self.unavailable_reason {
            Some(reason) => format!("Moon check unavailable: {}", reason),
            None => self
                .remarks
                .iter()
                .map(|r| r.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Evaluates the Moon's interference for one observer.
pub struct MoonScorer<'a> {
    ephemeris: &'a dyn Ephemeris,
    location: &'a Location,
    illumination_threshold_pct: f64,
}

impl<'a> MoonScorer<'a> {
    pub fn new(ephemeris: &'a dyn Ephemeris, location: &'a Location, config: &AnalysisConfig) -> Self {
        Self {
            ephemeris,
            location,
            illumination_threshold_pct: config.moon_illumination_threshold_pct,
        }
    }

    /// Score the Moon at `instant` against a target seen in `target_direction`.
    ///
    /// Never fails: an ephemeris error yields [`MoonScore::unavailable`].
    pub fn score(
        &self,
        instant: DateTime<Utc>,
        target_direction: CompassDirection,
        target_azimuth_deg: f64,
    ) -> MoonScore {
        let position = match self.ephemeris.position(&Body::Moon, instant, self.location) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Moon position unavailable at {}: {}", instant, e);
                return MoonScore::unavailable(e.to_string());
            }
        };
        let phase = match self.ephemeris.moon_phase(instant) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Moon phase unavailable at {}: {}", instant, e);
                return MoonScore::unavailable(e.to_string());
            }
        };

        let moon_direction = position.direction();
        let local = instant.with_timezone(&self.location.timezone);
        let mut remarks = Vec::new();
        let mut is_ok = false;
        let mut is_top = false;

        if position.altitude_deg < 0.0 {
            is_ok = true;
            is_top = true;
            remarks.push(MoonRemark {
                marker: MoonMarker::Top,
                text: format!("TOP: Moon below the horizon at {}", local.format("%d.%m. %H:%M")),
            });
        }
        if moon_direction != target_direction {
            is_ok = true;
            remarks.push(MoonRemark {
                marker: MoonMarker::Ok,
                text: format!(
                    "OK: Moon in {} ({:.0}°, alt {:.0}°), target in {} ({:.0}°)",
                    moon_direction,
                    position.azimuth_deg,
                    position.altitude_deg,
                    target_direction,
                    target_azimuth_deg
                ),
            });
        }
        if phase.illumination_percent < self.illumination_threshold_pct {
            is_ok = true;
            remarks.push(MoonRemark {
                marker: MoonMarker::Nice,
                text: format!(
                    "Nice: Moon illumination < {:.0} %: {:.2} %",
                    self.illumination_threshold_pct, phase.illumination_percent
                ),
            });
        }

        let crossings = self.crossings_after(instant);
        MoonScore {
            is_ok,
            is_top,
            remarks,
            direction: Some(moon_direction),
            altitude_deg: Some(position.altitude_deg),
            azimuth_deg: Some(position.azimuth_deg),
            illumination_percent: Some(phase.illumination_percent),
            phase_angle_deg: Some(phase.phase_angle_deg),
            next_moonrise: first_of(&crossings, CrossingKind::Rising),
            next_moonset: first_of(&crossings, CrossingKind::Setting),
            next_full_moon: self
                .ephemeris
                .next_full_moon(instant)
                .map_err(|e| log::debug!("No full moon found after {}: {}", instant, e))
                .ok(),
            unavailable_reason: None,
        }
    }

    /// Moon horizon crossings over the 48 hours following `from`.
    fn crossings_after(&self, from: DateTime<Utc>) -> Vec<HorizonCrossing> {
        let span = Period {
            start: from,
            end: from + Duration::hours(48),
        };
        self.ephemeris
            .crossings(&Body::Moon, self.location, span, 0.0)
            .map_err(|e| log::debug!("No moon rise or set after {}: {}", from, e))
            .unwrap_or_default()
    }
}

fn first_of(crossings: &[HorizonCrossing], kind: CrossingKind) -> Option<DateTime<Utc>> {
    crossings.iter().find(|c| c.kind == kind).map(|c| c.instant)
}
