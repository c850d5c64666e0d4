//! Ephemeris provider interface.
//!
//! The observability engine treats positions as a black box: anything that can
//! report the horizontal position of the Sun, the Moon or a fixed target at an
//! instant for an observer can drive it. [`SiderustEphemeris`] is the built-in
//! provider backed by the siderust astronomy library; tests substitute
//! synthetic ones.

pub mod sky;

pub use sky::SiderustEphemeris;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CompassDirection, EquatorialCoord, Location};

/// Result type for ephemeris evaluations
pub type EphemerisResult<T> = Result<T, EphemerisError>;

/// Body whose position is requested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    /// Target fixed on the celestial sphere (J2000 coordinates)
    Fixed(EquatorialCoord),
}

/// Local horizontal position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCoord {
    pub altitude_deg: f64,
    /// Compass bearing, clockwise from north, in [0, 360)
    pub azimuth_deg: f64,
}

impl HorizontalCoord {
    pub fn direction(&self) -> CompassDirection {
        CompassDirection::from_azimuth(self.azimuth_deg)
    }
}

/// Lunar phase data at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonPhase {
    /// Illuminated fraction of the disk, 0-100
    pub illumination_percent: f64,
    /// Moon-Sun elongation measured eastward, in [0, 360); 180 at full moon
    pub phase_angle_deg: f64,
}

/// Half-open search interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Returns `None` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// Whether a body climbs above or sinks below a horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossingKind {
    Rising,
    Setting,
}

/// One pass of a body through a horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonCrossing {
    pub instant: DateTime<Utc>,
    pub kind: CrossingKind,
}

/// Conditions raised by ephemeris evaluations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EphemerisError {
    /// Inputs or outputs were not usable (non-finite values, invalid observer,
    /// instants outside the time model).
    #[error("degenerate ephemeris evaluation: {reason}")]
    Degenerate { reason: String },

    /// The provider cannot answer this kind of query.
    #[error("ephemeris provider does not support {operation}")]
    Unsupported { operation: &'static str },
}

/// Position source consumed by the observability engine.
///
/// Only [`Ephemeris::position`] and [`Ephemeris::moon_phase`] are required.
/// The event searches default to [`EphemerisError::Unsupported`].
pub trait Ephemeris: Send + Sync {
    /// Horizontal position of `body` at `instant` for an observer at `location`.
    fn position(
        &self,
        body: &Body,
        instant: DateTime<Utc>,
        location: &Location,
    ) -> EphemerisResult<HorizontalCoord>;

    /// Lunar illumination and phase angle at `instant`.
    fn moon_phase(&self, instant: DateTime<Utc>) -> EphemerisResult<MoonPhase>;

    /// Sub-periods of `span` during which `body` stays below `horizon_deg`,
    /// in time order and clipped to `span`.
    fn periods_below(
        &self,
        body: &Body,
        location: &Location,
        span: Period,
        horizon_deg: f64,
    ) -> EphemerisResult<Vec<Period>> {
        let _ = (body, location, span, horizon_deg);
        Err(EphemerisError::Unsupported {
            operation: "periods_below",
        })
    }

    /// Every pass of `body` through `horizon_deg` within `span`, in time order.
    fn crossings(
        &self,
        body: &Body,
        location: &Location,
        span: Period,
        horizon_deg: f64,
    ) -> EphemerisResult<Vec<HorizonCrossing>> {
        let _ = (body, location, span, horizon_deg);
        Err(EphemerisError::Unsupported {
            operation: "crossings",
        })
    }

    /// First full moon after `from`.
    fn next_full_moon(&self, from: DateTime<Utc>) -> EphemerisResult<DateTime<Utc>> {
        let _ = from;
        Err(EphemerisError::Unsupported {
            operation: "next_full_moon",
        })
    }
}
