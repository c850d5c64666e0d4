//! Partition a night's observation results into viewing buckets.

use serde::{Deserialize, Serialize};

use crate::api::ObservationResult;
use crate::models::{widen_fallback, TwilightDepth};
use crate::services::moon::{MoonMarker, MoonScore};

/// Moon-quality requirement applied to bucketed targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonFilter {
    /// No Moon requirement
    #[default]
    Ignore,
    /// Require a TOP or OK remark
    Acceptable,
    /// Require a TOP remark
    TopOnly,
}

impl MoonFilter {
    /// Build from the two boolean switches; `top_only` has no effect unless
    /// the Moon filter is enabled.
    pub fn from_flags(moon_filter_enabled: bool, top_only: bool) -> Self {
        match (moon_filter_enabled, top_only) {
            (false, _) => MoonFilter::Ignore,
            (true, false) => MoonFilter::Acceptable,
            (true, true) => MoonFilter::TopOnly,
        }
    }

    pub fn accepts(&self, score: &MoonScore) -> bool {
        match self {
            MoonFilter::Ignore => true,
            MoonFilter::Acceptable => score.has_marker(MoonMarker::Top) || score.has_marker(MoonMarker::Ok),
            MoonFilter::TopOnly => score.has_marker(MoonMarker::Top),
        }
    }
}

/// Optional filters for [`classify`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationFilter {
    #[serde(default)]
    pub moon: MoonFilter,
    /// Substring matched against the compass label of the night maximum
    #[serde(default)]
    pub direction: Option<String>,
}

impl ClassificationFilter {
    fn accepts(&self, result: &ObservationResult) -> bool {
        if !self.moon.accepts(&result.moon) {
            return false;
        }
        match (&self.direction, result.visibility.night_max) {
            (Some(filter), Some(peak)) => peak.direction.matches(filter),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

/// Buckets of one night, each ordered by the instant of maximum altitude.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NightClassification<'a> {
    /// Peak strictly inside astronomical night
    pub astronomical: Vec<&'a ObservationResult>,
    /// Peak strictly inside nautical (but not astronomical) night
    pub nautical: Vec<&'a ObservationResult>,
    /// Night maximum missing or not above the horizon
    pub invisible: Vec<&'a ObservationResult>,
    /// Peak above the horizon but only during twilight
    pub excluded: Vec<&'a ObservationResult>,
    /// Would have been bucketed but failed the Moon or direction filter
    pub filtered: Vec<&'a ObservationResult>,
}

/// Classify a night's results.
///
/// A peak goes to the astronomical bucket when it falls inside astronomical
/// night. On nights without one, such as midsummer at mid and high
/// latitudes where the Sun never sinks 18° below the horizon, the nautical
/// window stands in and every peak inside it goes to the nautical bucket.
/// The astronomical bucket is therefore empty on those nights.
///
/// Results are independent of one another; the input order only matters for
/// ties in peak time, which keep their relative order.
pub fn classify<'a>(
    results: &'a [ObservationResult],
    filter: &ClassificationFilter,
) -> NightClassification<'a> {
    let mut classification = NightClassification::default();

    for result in results {
        let peak = match result.visibility.night_max {
            Some(peak) if peak.altitude_deg > 0.0 => peak,
            _ => {
                log::debug!("{}: invisible", result.target.name);
                classification.invisible.push(result);
                continue;
            }
        };

        let bucket = widen_fallback(
            &result.windows,
            TwilightDepth::Astronomical,
            TwilightDepth::Nautical,
            Some(peak.instant),
        );
        let Some((depth, _)) = bucket else {
            log::debug!("{}: peak at {} falls in twilight only", result.target.name, peak.instant);
            classification.excluded.push(result);
            continue;
        };

        if !filter.accepts(result) {
            classification.filtered.push(result);
            continue;
        }

        log::debug!(
            "{}: {:.1}° in {} at {} ({} night)",
            result.target.name,
            peak.altitude_deg,
            peak.direction,
            peak.instant,
            depth.label()
        );
        match depth {
            TwilightDepth::Astronomical => classification.astronomical.push(result),
            _ => classification.nautical.push(result),
        }
    }

    for bucket in [
        &mut classification.astronomical,
        &mut classification.nautical,
        &mut classification.invisible,
        &mut classification.excluded,
        &mut classification.filtered,
    ] {
        bucket.sort_by_key(|r| r.sort_instant());
    }
    classification
}
