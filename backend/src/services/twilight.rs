//! Twilight window computation.
//!
//! For one civil date and observer, finds the span during which the Sun stays
//! below each depression threshold, starting from local noon of that date.

use chrono::{Duration, NaiveDate};

use crate::ephemeris::{Body, Ephemeris, Period};
use crate::error::{ErrorContext, PlannerError, PlannerResult};
use crate::models::{local_noon, Location, NightWindows, TwilightDepth, TwilightWindow};

/// Computes the civil, nautical and astronomical windows of a night.
pub struct TwilightCalculator<'a> {
    ephemeris: &'a dyn Ephemeris,
    location: &'a Location,
}

impl<'a> TwilightCalculator<'a> {
    pub fn new(ephemeris: &'a dyn Ephemeris, location: &'a Location) -> Self {
        Self {
            ephemeris,
            location,
        }
    }

    /// Compute the night windows starting on the evening of `date`.
    ///
    /// The civil window is searched over the 24 hours following local noon of
    /// `date`; each deeper window is searched inside the next broader one, so
    /// the windows are always nested. A threshold the Sun never reaches yields
    /// an undefined window. When the Sun stays below a threshold for the whole
    /// search span, the window covers the whole span.
    ///
    /// # Errors
    /// Returns [`PlannerError::EphemerisUnavailable`] if the Sun's position
    /// cannot be evaluated.
    pub fn compute(&self, date: NaiveDate) -> PlannerResult<NightWindows> {
        let noon = local_noon(date, self.location.timezone).ok_or_else(|| {
            PlannerError::ephemeris_with_context(
                "local noon does not exist",
                ErrorContext::new("twilight").with_date(date),
            )
        })?;
        let span = Period {
            start: noon,
            end: noon + Duration::hours(24),
        };

        let civil = self.window(date, TwilightDepth::Civil, span)?;
        let nautical = match civil {
            Some(outer) => self.window(date, TwilightDepth::Nautical, bounds(outer))?,
            None => None,
        };
        let astronomical = match nautical {
            Some(outer) => self.window(date, TwilightDepth::Astronomical, bounds(outer))?,
            None => None,
        };
        let windows = NightWindows {
            date,
            civil,
            nautical,
            astronomical,
        };

        log::debug!(
            "Twilight windows for {} at {}: civil={:?} nautical={:?} astronomical={:?}",
            date,
            self.location.name,
            windows.civil,
            windows.nautical,
            windows.astronomical
        );
        Ok(windows)
    }

    /// Longest period inside `within` with the Sun below the depth's
    /// threshold, the earlier one on ties.
    fn window(&self, date: NaiveDate, depth: TwilightDepth, within: Period) -> PlannerResult<Option<TwilightWindow>> {
        let horizon = depth.horizon_deg();
        let periods = self
            .ephemeris
            .periods_below(&Body::Sun, self.location, within, horizon)
            .map_err(|e| {
                PlannerError::ephemeris_with_context(
                    e.to_string(),
                    ErrorContext::new("twilight")
                        .with_date(date)
                        .with_details(format!("{} threshold", depth.label())),
                )
            })?;

        let longest = periods.into_iter().fold(None, |best: Option<Period>, period| match best {
            Some(best) if best.duration() >= period.duration() => Some(best),
            _ => Some(period),
        });
        match longest {
            Some(period) => Ok(TwilightWindow::new(period.start, period.end)),
            None => {
                log::debug!("No {} night on {}: Sun stays above {}°", depth.label(), date, horizon);
                Ok(None)
            }
        }
    }
}

fn bounds(window: TwilightWindow) -> Period {
    Period {
        start: window.start,
        end: window.end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::SiderustEphemeris;
    use chrono::{Datelike, Timelike};
    use chrono_tz::Tz;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_winter_night_has_all_windows_nested() {
        let eph = SiderustEphemeris::new();
        let loc = Location::frankfurt();
        let windows = TwilightCalculator::new(&eph, &loc).compute(date(2024, 1, 15)).unwrap();

        assert!(windows.civil.is_some());
        assert!(windows.nautical.is_some());
        assert!(windows.astronomical.is_some());
        assert!(windows.is_strictly_nested());
    }

    #[test]
    fn test_summer_solstice_frankfurt_has_no_astronomical_night() {
        let eph = SiderustEphemeris::new();
        let loc = Location::frankfurt();
        let windows = TwilightCalculator::new(&eph, &loc).compute(date(2024, 6, 21)).unwrap();

        assert!(windows.astronomical.is_none());
        assert!(windows.nautical.is_some());
        assert!(windows.civil.is_some());
        assert!(windows.is_strictly_nested());
    }

    #[test]
    fn test_windows_start_in_evening_and_end_next_morning() {
        let eph = SiderustEphemeris::new();
        let loc = Location::frankfurt();
        let windows = TwilightCalculator::new(&eph, &loc).compute(date(2024, 3, 10)).unwrap();
        let nautical = windows.nautical.unwrap();

        let tz: Tz = loc.timezone;
        let start_local = nautical.start.with_timezone(&tz);
        let end_local = nautical.end.with_timezone(&tz);
        assert_eq!(start_local.date_naive(), date(2024, 3, 10));
        assert_eq!(end_local.date_naive(), date(2024, 3, 11));
        assert!(start_local.hour() >= 18 && start_local.hour() <= 20);
        assert!(end_local.hour() >= 5 && end_local.hour() <= 6);
    }

    #[test]
    fn test_southern_site_all_year() {
        let eph = SiderustEphemeris::new();
        let loc = Location::windhoek();
        for month in 1..=12 {
            let windows = TwilightCalculator::new(&eph, &loc)
                .compute(date(2024, month, 1))
                .unwrap();
            assert!(windows.astronomical.is_some(), "month {}", month);
            assert!(windows.is_strictly_nested(), "month {}", month);
        }
    }

    #[test]
    fn test_polar_day_and_night() {
        let eph = SiderustEphemeris::new();
        let svalbard = Location::new("Longyearbyen", 78.22, 15.65, 10.0, "Arctic/Longyearbyen").unwrap();
        let calc = TwilightCalculator::new(&eph, &svalbard);

        let summer = calc.compute(date(2024, 6, 21)).unwrap();
        assert!(summer.civil.is_none());
        assert!(summer.nautical.is_none());
        assert!(summer.astronomical.is_none());

        // Sun peaks near -11.7° at midwinter noon at 78.22°N
        let winter = calc.compute(date(2024, 12, 21)).unwrap();
        let civil = winter.civil.unwrap();
        assert_eq!(civil.duration(), Duration::hours(24));
        assert!(winter.nautical.is_some());
        assert!(winter.is_nested());
    }

    #[test]
    fn test_high_latitude_windows_stay_nested() {
        let eph = SiderustEphemeris::new();
        // Sun hovers between the thresholds around noon here
        let south = Location::new("Polar plateau", -85.0, 0.0, 0.0, "UTC").unwrap();
        let windows = TwilightCalculator::new(&eph, &south).compute(date(2024, 5, 6)).unwrap();
        let civil = windows.civil.unwrap();
        let nautical = windows.nautical.unwrap();
        assert!(nautical.end <= civil.end);
        assert!(windows.is_nested());

        for latitude in [-85.0, -80.0, -72.0, 72.0, 80.0, 85.0] {
            let site = Location::new("Sweep", latitude, 0.0, 0.0, "UTC").unwrap();
            let calc = TwilightCalculator::new(&eph, &site);
            let mut day = date(2024, 1, 3);
            while day.year() == 2024 {
                let windows = calc.compute(day).unwrap();
                assert!(windows.is_nested(), "lat {} on {}: {:?}", latitude, day, windows);
                day += Duration::days(27);
            }
        }
    }

    #[test]
    fn test_degenerate_observer_is_dated_error() {
        let eph = SiderustEphemeris::new();
        let loc = Location {
            latitude: f64::NAN,
            ..Location::frankfurt()
        };
        let err = TwilightCalculator::new(&eph, &loc)
            .compute(date(2024, 1, 15))
            .unwrap_err();
        assert_eq!(err.context().date, Some(date(2024, 1, 15)));
        assert_eq!(err.condition(), "ephemeris_unavailable");
    }
}
