//! Night maximum and visibility verdict for one target track.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::models::{CompassDirection, Track, TrackSample, TwilightDepth, TwilightWindow};

/// A maximum-altitude event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakSample {
    pub instant: DateTime<Utc>,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
    pub direction: CompassDirection,
}

impl From<&TrackSample> for PeakSample {
    fn from(sample: &TrackSample) -> Self {
        Self {
            instant: sample.instant,
            altitude_deg: sample.altitude_deg,
            azimuth_deg: sample.azimuth_deg,
            direction: sample.direction(),
        }
    }
}

/// Outcome of analysing one target track against the night's windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityReport {
    /// Highest sample strictly inside the search window; `None` when no sample
    /// falls inside it (not observable in darkness).
    pub night_max: Option<PeakSample>,
    /// Highest sample over the whole track, regardless of darkness.
    pub overall_max: PeakSample,
    pub visible: bool,
    /// Depth of the window used for the peak search
    pub search_depth: Option<TwilightDepth>,
    /// Darkest defined window of the night
    pub dark_depth: Option<TwilightDepth>,
    /// Whether the night maximum falls strictly inside the darkest window
    pub peak_in_dark_window: bool,
    pub samples_in_window: usize,
    pub samples_above_threshold: usize,
}

/// Finds the night maximum and applies the minimum-duration visibility test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityAnalyzer {
    min_altitude_deg: f64,
    min_samples: usize,
}

impl Default for VisibilityAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl VisibilityAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            min_altitude_deg: config.min_visible_altitude_deg,
            min_samples: config.min_visible_samples,
        }
    }

    /// Analyse `track` against the night's windows.
    ///
    /// # Arguments
    /// * `search` - Nautical window, or its broader fallback, used to locate
    ///   the night maximum
    /// * `dark` - Astronomical window, or its broader fallback, reported only
    ///
    /// Samples count towards the window only when strictly inside it. Ties in
    /// altitude resolve to the earliest sample. The target is visible when more
    /// than `min_samples` in-window samples are above `min_altitude_deg`.
    pub fn analyze(
        &self,
        track: &Track,
        search: Option<(TwilightDepth, TwilightWindow)>,
        dark: Option<(TwilightDepth, TwilightWindow)>,
    ) -> VisibilityReport {
        let overall_max = PeakSample::from(highest(track.samples().iter()).unwrap_or(track.first()));

        let in_window: Vec<&TrackSample> = match search {
            Some((_, window)) => track
                .samples()
                .iter()
                .filter(|s| window.contains(s.instant))
                .collect(),
            None => Vec::new(),
        };

        let night_max = highest(in_window.iter().copied()).map(PeakSample::from);
        let samples_above_threshold = in_window
            .iter()
            .filter(|s| s.altitude_deg > self.min_altitude_deg)
            .count();
        let visible = samples_above_threshold > self.min_samples;

        let peak_in_dark_window = match (night_max, dark) {
            (Some(peak), Some((_, window))) => window.contains(peak.instant),
            _ => false,
        };

        log::debug!(
            "Night max {:?}, {} of {} in-window samples above {}°, visible={}",
            night_max.map(|p| p.altitude_deg),
            samples_above_threshold,
            in_window.len(),
            self.min_altitude_deg,
            visible
        );

        VisibilityReport {
            night_max,
            overall_max,
            visible,
            search_depth: search.map(|(depth, _)| depth),
            dark_depth: dark.map(|(depth, _)| depth),
            peak_in_dark_window,
            samples_in_window: in_window.len(),
            samples_above_threshold,
        }
    }
}

/// First sample with the greatest altitude; NaN altitudes never win.
fn highest<'a>(samples: impl Iterator<Item = &'a TrackSample>) -> Option<&'a TrackSample> {
    samples.fold(None, |best: Option<&TrackSample>, sample| match best {
        None if !sample.altitude_deg.is_nan() => Some(sample),
        Some(b) if sample.altitude_deg > b.altitude_deg => Some(sample),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 18, 0, 0).unwrap()
    }

    fn track_from(altitudes: &[f64]) -> Track {
        let samples = altitudes
            .iter()
            .enumerate()
            .map(|(i, alt)| TrackSample {
                instant: t0() + Duration::minutes(i as i64),
                altitude_deg: *alt,
                azimuth_deg: 10.0 * i as f64,
            })
            .collect();
        Track::new(samples).unwrap()
    }

    fn window(from_min: i64, to_min: i64) -> Option<(TwilightDepth, TwilightWindow)> {
        TwilightWindow::new(t0() + Duration::minutes(from_min), t0() + Duration::minutes(to_min))
            .map(|w| (TwilightDepth::Nautical, w))
    }

    #[test]
    fn test_exactly_31_samples_is_visible() {
        let mut alts = vec![-10.0; 100];
        for a in alts.iter_mut().skip(10).take(31) {
            *a = 20.0;
        }
        let report = VisibilityAnalyzer::default().analyze(&track_from(&alts), window(0, 99), None);
        assert_eq!(report.samples_above_threshold, 31);
        assert!(report.visible);
    }

    #[test]
    fn test_exactly_30_samples_is_not_visible() {
        let mut alts = vec![-10.0; 100];
        for a in alts.iter_mut().skip(10).take(30) {
            *a = 20.0;
        }
        let report = VisibilityAnalyzer::default().analyze(&track_from(&alts), window(0, 99), None);
        assert_eq!(report.samples_above_threshold, 30);
        assert!(!report.visible);
    }

    #[test]
    fn test_threshold_altitude_is_exclusive() {
        let alts = vec![5.0; 60];
        let report = VisibilityAnalyzer::default().analyze(&track_from(&alts), window(-1, 60), None);
        assert_eq!(report.samples_above_threshold, 0);
        assert!(!report.visible);
    }

    #[test]
    fn test_window_bounds_are_strict() {
        let alts: Vec<f64> = (0..10).map(|i| i as f64).collect();
        // Samples at minutes 2 and 8 sit on the bounds and are excluded
        let report = VisibilityAnalyzer::default().analyze(&track_from(&alts), window(2, 8), None);
        assert_eq!(report.samples_in_window, 5);
        assert_eq!(report.night_max.unwrap().altitude_deg, 7.0);
        assert_eq!(report.overall_max.altitude_deg, 9.0);
    }

    #[test]
    fn test_ties_resolve_to_earliest() {
        let alts = [1.0, 30.0, 12.0, 30.0, 30.0];
        let report = VisibilityAnalyzer::default().analyze(&track_from(&alts), window(-1, 10), None);
        let peak = report.night_max.unwrap();
        assert_eq!(peak.instant, t0() + Duration::minutes(1));
        assert_eq!(report.overall_max.instant, t0() + Duration::minutes(1));
    }

    #[test]
    fn test_empty_window_is_not_an_error() {
        let alts = [10.0, 20.0, 30.0];
        let report = VisibilityAnalyzer::default().analyze(&track_from(&alts), window(100, 200), None);
        assert!(report.night_max.is_none());
        assert!(!report.visible);
        assert_eq!(report.overall_max.altitude_deg, 30.0);
        assert_eq!(report.overall_max.instant, t0() + Duration::minutes(2));
    }

    #[test]
    fn test_undefined_search_window() {
        let alts = [10.0, 20.0];
        let report = VisibilityAnalyzer::default().analyze(&track_from(&alts), None, None);
        assert!(report.night_max.is_none());
        assert_eq!(report.search_depth, None);
    }

    #[test]
    fn test_peak_reported_against_dark_window() {
        let alts = [0.0, 1.0, 2.0, 50.0, 3.0, 2.0];
        let dark = TwilightWindow::new(t0() + Duration::minutes(2), t0() + Duration::minutes(5))
            .map(|w| (TwilightDepth::Astronomical, w));
        let report = VisibilityAnalyzer::default().analyze(&track_from(&alts), window(-1, 10), dark);
        assert!(report.peak_in_dark_window);
        assert_eq!(report.dark_depth, Some(TwilightDepth::Astronomical));
        assert_eq!(report.night_max.unwrap().direction, CompassDirection::NE);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let alts: Vec<f64> = (0..200).map(|i| ((i as f64) / 30.0).sin() * 40.0).collect();
        let track = track_from(&alts);
        let analyzer = VisibilityAnalyzer::default();
        let first = analyzer.analyze(&track, window(20, 180), None);
        let second = analyzer.analyze(&track, window(20, 180), None);
        assert_eq!(first, second);
    }
}
