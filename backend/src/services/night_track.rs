//! Night trajectories centred on local midnight.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ephemeris::{Body, Ephemeris};
use crate::error::{ErrorContext, PlannerError, PlannerResult};
use crate::models::{local_instant, local_midnight, CompassDirection, Location, Track, TrackSample};

/// Local clock hours at which the evening direction checkpoints are taken.
pub const CHECKPOINT_HOURS: [u32; 6] = [20, 22, 0, 2, 4, 6];

/// Local midnight starting the day after `date`, in UTC.
pub fn reference_midnight(date: NaiveDate, location: &Location) -> PlannerResult<DateTime<Utc>> {
    date.succ_opt()
        .and_then(|next| local_midnight(next, location.timezone))
        .ok_or_else(|| {
            PlannerError::ephemeris_with_context(
                "no local midnight following the date",
                ErrorContext::new("night_track").with_date(date),
            )
        })
}

/// Build a fixed-cadence trajectory of `body` around `reference_midnight`.
///
/// Samples are evenly spaced over `[midnight - half_window, midnight +
/// half_window]` with both endpoints included.
///
/// # Arguments
/// * `half_window_hours` - Hours before and after the reference midnight
/// * `sample_count` - Number of samples; must be at least 1
pub fn build(
    ephemeris: &dyn Ephemeris,
    body: &Body,
    location: &Location,
    reference_midnight: DateTime<Utc>,
    half_window_hours: f64,
    sample_count: usize,
) -> PlannerResult<Track> {
    let never = AtomicBool::new(false);
    build_cancellable(
        ephemeris,
        body,
        location,
        reference_midnight,
        half_window_hours,
        sample_count,
        &never,
    )
}

/// [`build`] that stops sampling once `cancelled` is set.
///
/// # Errors
/// Returns [`PlannerError::Timeout`] when the flag is observed before the
/// last sample.
pub fn build_cancellable(
    ephemeris: &dyn Ephemeris,
    body: &Body,
    location: &Location,
    reference_midnight: DateTime<Utc>,
    half_window_hours: f64,
    sample_count: usize,
    cancelled: &AtomicBool,
) -> PlannerResult<Track> {
    let context = || ErrorContext::new("night_track").with_details(format!("{:?}", body));
    if sample_count == 0 || !half_window_hours.is_finite() || half_window_hours < 0.0 {
        return Err(PlannerError::configuration(format!(
            "invalid track parameters: half_window_hours={} sample_count={}",
            half_window_hours, sample_count
        )));
    }

    let half_window_ms = (half_window_hours * 3_600_000.0).round() as i64;
    let start = reference_midnight - Duration::milliseconds(half_window_ms);
    let span_ms = 2 * half_window_ms;
    let steps = (sample_count.max(2) - 1) as i64;

    let mut samples = Vec::with_capacity(sample_count);
    for i in 0..sample_count as i64 {
        if cancelled.load(Ordering::SeqCst) {
            return Err(PlannerError::timeout_with_context(
                format!("cancelled after {} of {} samples", i, sample_count),
                context(),
            ));
        }
        let instant = if sample_count == 1 {
            reference_midnight
        } else {
            start + Duration::milliseconds(span_ms * i / steps)
        };
        let position = ephemeris
            .position(body, instant, location)
            .map_err(|e| PlannerError::ephemeris_with_context(e.to_string(), context()))?;
        samples.push(TrackSample {
            instant,
            altitude_deg: position.altitude_deg,
            azimuth_deg: position.azimuth_deg,
        });
    }

    Track::new(samples).ok_or_else(|| {
        PlannerError::configuration(format!(
            "track window too short for {} samples",
            sample_count
        ))
    })
}

/// Compass direction of a body at one local clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionCheckpoint {
    pub local_time: NaiveTime,
    pub instant: DateTime<Utc>,
    pub altitude_deg: f64,
    pub direction: CompassDirection,
}

/// Directions of `body` at 20:00, 22:00, 00:00, 02:00, 04:00 and 06:00 local
/// time over the night starting on `date`. Clock times that do not exist
/// locally are skipped.
pub fn direction_checkpoints(
    ephemeris: &dyn Ephemeris,
    body: &Body,
    location: &Location,
    date: NaiveDate,
) -> PlannerResult<Vec<DirectionCheckpoint>> {
    let mut checkpoints = Vec::with_capacity(CHECKPOINT_HOURS.len());
    for hour in CHECKPOINT_HOURS {
        let day = if hour >= 12 { Some(date) } else { date.succ_opt() };
        let Some(local_time) = NaiveTime::from_hms_opt(hour, 0, 0) else {
            continue;
        };
        let Some(instant) = day.and_then(|d| local_instant(d, local_time, location.timezone)) else {
            continue;
        };
        let position = ephemeris.position(body, instant, location).map_err(|e| {
            PlannerError::ephemeris_with_context(
                e.to_string(),
                ErrorContext::new("direction_checkpoints").with_date(date),
            )
        })?;
        checkpoints.push(DirectionCheckpoint {
            local_time,
            instant,
            altitude_deg: position.altitude_deg,
            direction: position.direction(),
        });
    }
    Ok(checkpoints)
}
