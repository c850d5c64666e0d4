//! Ephemeris backed by siderust.
//!
//! Sun and Moon positions come from siderust's VSOP87 and ELP2000 pipelines
//! with topocentric parallax; fixed targets are treated as ICRS directions.
//! Threshold periods, horizon crossings and lunar phase events use siderust's
//! event searches. No atmospheric refraction is applied.
//!
//! siderust evaluates on the TT axis; instants cross the boundary through
//! the UTC conversions of its time model.

use chrono::{DateTime, Duration, Utc};
use siderust::bodies::{Moon, Sun};
use siderust::coordinates::centers::Geodetic;
use siderust::coordinates::frames::ECEF;
use siderust::coordinates::spherical::direction;
use siderust::ephemeris::Vsop87Ephemeris;
use siderust::event::altitude::{self, AltitudeProvider, CrossingDirection, SearchOpts};
use siderust::event::azimuth::AzimuthProvider;
use siderust::event::lunar::phase::{find_phase_events, moon_phase_geocentric, PhaseKind, PhaseSearchOpts};
use siderust::qtty::{Degree, Degrees, Meter, Quantity};
use siderust::time::{Interval, JulianDate, ModifiedJulianDate};

use super::{
    Body, CrossingKind, Ephemeris, EphemerisError, EphemerisResult, HorizonCrossing, HorizontalCoord, MoonPhase,
    Period,
};
use crate::models::{EquatorialCoord, Location};

/// Days searched for the next full moon; longer than one synodic month.
const FULL_MOON_SEARCH_DAYS: i64 = 31;

/// Period edges this close to the search bounds are taken as the bounds.
const SNAP_MS: i64 = 500;

/// Evaluates `$eval` with `$object` bound to the siderust provider of `$body`.
macro_rules! with_provider {
    ($body:expr, $object:ident => $eval:expr) => {
        match $body {
            Body::Sun => {
                let $object = &Sun;
                $eval
            }
            Body::Moon => {
                let $object = &Moon;
                $eval
            }
            Body::Fixed(coord) => {
                let direction = fixed_direction(coord)?;
                let $object = &direction;
                $eval
            }
        }
    };
}

/// Position provider built on siderust.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiderustEphemeris;

impl SiderustEphemeris {
    pub fn new() -> Self {
        Self
    }
}

impl Ephemeris for SiderustEphemeris {
    fn position(
        &self,
        body: &Body,
        instant: DateTime<Utc>,
        location: &Location,
    ) -> EphemerisResult<HorizontalCoord> {
        let site = observer_site(location)?;
        let mjd = to_mjd(instant)?;
        let horizontal = with_provider!(body, object => horizontal_at(object, &site, mjd));

        if !horizontal.altitude_deg.is_finite() || !horizontal.azimuth_deg.is_finite() {
            return Err(EphemerisError::Degenerate {
                reason: format!("non-finite position for {:?} at {}", body, instant),
            });
        }
        Ok(horizontal)
    }

    fn moon_phase(&self, instant: DateTime<Utc>) -> EphemerisResult<MoonPhase> {
        let jd = JulianDate::try_from_chrono(instant).map_err(|e| EphemerisError::Degenerate {
            reason: format!("instant {} outside the time model: {}", instant, e),
        })?;
        let geometry = moon_phase_geocentric::<Vsop87Ephemeris>(jd);

        let illumination_percent = geometry.illuminated_fraction.value() * 100.0;
        let elongation_deg = geometry.elongation.to::<Degree>().value();
        let phase_angle_deg = if geometry.waxing {
            elongation_deg
        } else {
            (360.0 - elongation_deg).rem_euclid(360.0)
        };

        if !illumination_percent.is_finite() || !phase_angle_deg.is_finite() {
            return Err(EphemerisError::Degenerate {
                reason: format!("non-finite lunar phase at {}", instant),
            });
        }
        Ok(MoonPhase {
            illumination_percent,
            phase_angle_deg,
        })
    }

    fn periods_below(
        &self,
        body: &Body,
        location: &Location,
        span: Period,
        horizon_deg: f64,
    ) -> EphemerisResult<Vec<Period>> {
        let site = observer_site(location)?;
        let window = to_interval(span)?;
        let threshold = Degrees::new(horizon_deg);
        let periods = with_provider!(body, object => {
            altitude::below_threshold(object, &site, window, threshold, SearchOpts::default())
        });

        let mut clipped = Vec::with_capacity(periods.len());
        for period in periods {
            let start = snap(from_mjd(period.start)?, span.start).max(span.start);
            let end = snap(from_mjd(period.end)?, span.end).min(span.end);
            clipped.extend(Period::new(start, end));
        }
        Ok(clipped)
    }

    fn crossings(
        &self,
        body: &Body,
        location: &Location,
        span: Period,
        horizon_deg: f64,
    ) -> EphemerisResult<Vec<HorizonCrossing>> {
        let site = observer_site(location)?;
        let window = to_interval(span)?;
        let threshold = Degrees::new(horizon_deg);
        let events = with_provider!(body, object => {
            altitude::crossings(object, &site, window, threshold, SearchOpts::default())
        });

        events
            .into_iter()
            .map(|event| {
                Ok(HorizonCrossing {
                    instant: from_mjd(event.mjd)?,
                    kind: match event.direction {
                        CrossingDirection::Rising => CrossingKind::Rising,
                        CrossingDirection::Setting => CrossingKind::Setting,
                    },
                })
            })
            .collect()
    }

    fn next_full_moon(&self, from: DateTime<Utc>) -> EphemerisResult<DateTime<Utc>> {
        let span = Period {
            start: from,
            end: from + Duration::days(FULL_MOON_SEARCH_DAYS),
        };
        let event = find_phase_events::<Vsop87Ephemeris>(to_interval(span)?, PhaseSearchOpts::default())
            .into_iter()
            .find(|event| event.kind == PhaseKind::FullMoon)
            .ok_or_else(|| EphemerisError::Degenerate {
                reason: format!("no full moon within {} days of {}", FULL_MOON_SEARCH_DAYS, from),
            })?;
        from_mjd(event.mjd)
    }
}

fn horizontal_at<T>(object: &T, site: &Geodetic<ECEF>, mjd: ModifiedJulianDate) -> HorizontalCoord
where
    T: AltitudeProvider + AzimuthProvider,
{
    HorizontalCoord {
        altitude_deg: object.altitude_at(site, mjd).to::<Degree>().value(),
        azimuth_deg: object.azimuth_at(site, mjd).to::<Degree>().value().rem_euclid(360.0),
    }
}

fn observer_site(location: &Location) -> EphemerisResult<Geodetic<ECEF>> {
    if !(-90.0..=90.0).contains(&location.latitude)
        || !location.longitude.is_finite()
        || !location.elevation_m.is_finite()
    {
        return Err(EphemerisError::Degenerate {
            reason: format!(
                "invalid observer lat={} lon={} elevation={}",
                location.latitude, location.longitude, location.elevation_m
            ),
        });
    }
    // Geodetic takes (lon, lat, height)
    Ok(Geodetic::<ECEF>::new(
        Degrees::new(location.longitude),
        Degrees::new(location.latitude),
        Quantity::<Meter>::new(location.elevation_m),
    ))
}

fn fixed_direction(coord: &EquatorialCoord) -> EphemerisResult<direction::ICRS> {
    if !coord.ra_deg.is_finite() || !(-90.0..=90.0).contains(&coord.dec_deg) {
        return Err(EphemerisError::Degenerate {
            reason: format!("invalid target coordinates ra={} dec={}", coord.ra_deg, coord.dec_deg),
        });
    }
    Ok(direction::ICRS::new(
        Degrees::new(coord.ra_deg.rem_euclid(360.0)),
        Degrees::new(coord.dec_deg),
    ))
}

fn to_mjd(instant: DateTime<Utc>) -> EphemerisResult<ModifiedJulianDate> {
    ModifiedJulianDate::try_from_chrono(instant).map_err(|e| EphemerisError::Degenerate {
        reason: format!("instant {} outside the time model: {}", instant, e),
    })
}

fn from_mjd(mjd: ModifiedJulianDate) -> EphemerisResult<DateTime<Utc>> {
    mjd.to_chrono().ok_or_else(|| EphemerisError::Degenerate {
        reason: format!("MJD {} has no UTC representation", mjd.value()),
    })
}

/// `bound` when `instant` only differs from it by TT/UTC round-trip noise.
fn snap(instant: DateTime<Utc>, bound: DateTime<Utc>) -> DateTime<Utc> {
    if (instant - bound).abs() < Duration::milliseconds(SNAP_MS) {
        bound
    } else {
        instant
    }
}

fn to_interval(span: Period) -> EphemerisResult<Interval<ModifiedJulianDate>> {
    Ok(Interval::new(to_mjd(span.start)?, to_mjd(span.end)?))
}
