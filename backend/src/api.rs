//! Public API surface of the planner.
//!
//! This file consolidates the result types handed to callers. Everything here
//! serializes with serde so results can be printed as JSON or stored.

pub use crate::config::{AnalysisConfig, LocationSettings, PlannerConfig, RuntimeConfig};
pub use crate::error::{ErrorContext, PlannerError, PlannerResult};
pub use crate::models::{
    CatalogMetadata, CompassDirection, EquatorialCoord, Location, NightWindows, Target,
    TwilightDepth, TwilightWindow,
};
pub use crate::services::classifier::{ClassificationFilter, MoonFilter, NightClassification};
pub use crate::services::journal::{JournalEntry, JournalLevel};
pub use crate::services::moon::{MoonMarker, MoonRemark, MoonScore};
pub use crate::services::night_track::DirectionCheckpoint;
pub use crate::services::planner::{NightPlan, Planner};
pub use crate::services::visibility::{PeakSample, VisibilityReport};
pub use crate::services::yearly::{YearlyBestFinder, YearlyOverview};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Everything computed for one target on one night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationResult {
    pub target: Target,
    /// Civil date on whose evening the night starts
    pub date: NaiveDate,
    pub windows: NightWindows,
    pub visibility: VisibilityReport,
    /// Moon conditions at the night maximum
    pub moon: MoonScore,
    /// Target direction at fixed local clock times through the night
    pub checkpoints: Vec<DirectionCheckpoint>,
}

impl ObservationResult {
    pub fn night_max(&self) -> Option<&PeakSample> {
        self.visibility.night_max.as_ref()
    }

    /// Instant used to order results within a bucket: the night maximum,
    /// or the overall maximum when the target never reaches darkness.
    pub fn sort_instant(&self) -> DateTime<Utc> {
        self.visibility
            .night_max
            .map_or(self.visibility.overall_max.instant, |peak| peak.instant)
    }

    /// One-line human summary with times shown in `tz`.
    pub fn summary(&self, tz: Tz) -> String {
        let kind = self
            .target
            .metadata
            .object_type_description()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        match self.night_max() {
            Some(peak) => {
                let local = peak.instant.with_timezone(&tz);
                format!(
                    "{}{}: max {:.1}° in {} at {}{}",
                    self.target.name,
                    kind,
                    peak.altitude_deg,
                    peak.direction,
                    local.format("%d.%m. %H:%M"),
                    if self.visibility.visible { "" } else { ", too briefly above the visibility altitude" }
                )
            }
            None => format!(
                "{}{}: not observable in darkness, overall max {:.1}° in {}",
                self.target.name, kind, self.visibility.overall_max.altitude_deg, self.visibility.overall_max.direction
            ),
        }
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
