//! Per-night planning pipeline.
//!
//! [`Planner`] runs twilight, track, visibility and Moon analysis for each
//! (target, date) pair. Batch runs share one set of twilight windows per date
//! and process targets on the blocking pool with a per-target time bound.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::api::ObservationResult;
use crate::config::PlannerConfig;
use crate::ephemeris::{Body, Ephemeris, SiderustEphemeris};
use crate::error::{ErrorContext, PlannerError, PlannerResult};
use crate::models::{widen_fallback, Location, NightWindows, Target, TwilightDepth};
use crate::resolver::{CatalogResolver, TargetResolver};
use crate::services::classifier::{classify, ClassificationFilter, NightClassification};
use crate::services::journal::{JournalEntry, JournalLevel, RunJournal};
use crate::services::moon::{MoonScore, MoonScorer};
use crate::services::night_track;
use crate::services::twilight::TwilightCalculator;
use crate::services::visibility::VisibilityAnalyzer;

/// Outcome of planning one night for a set of targets.
#[derive(Debug, Clone, Serialize)]
pub struct NightPlan {
    pub date: NaiveDate,
    pub location: Location,
    pub windows: NightWindows,
    /// Successful results in request order
    pub results: Vec<ObservationResult>,
    /// Journal of the run, including dropped targets
    pub journal: Vec<JournalEntry>,
}

impl NightPlan {
    pub fn classify(&self, filter: &ClassificationFilter) -> NightClassification<'_> {
        classify(&self.results, filter)
    }

    /// Journal entries for targets missing from `results`.
    pub fn failures(&self) -> impl Iterator<Item = &JournalEntry> {
        self.journal.iter().filter(|e| e.level == JournalLevel::Error)
    }
}

/// Observation planner for one observer site.
#[derive(Clone)]
pub struct Planner {
    config: Arc<PlannerConfig>,
    location: Arc<Location>,
    ephemeris: Arc<dyn Ephemeris>,
    resolver: Arc<dyn TargetResolver>,
}

impl Planner {
    /// Create a planner, validating the configuration up front.
    ///
    /// # Errors
    /// Returns [`PlannerError::Configuration`] for an invalid location,
    /// timezone, analysis or runtime setting.
    pub fn new(
        config: PlannerConfig,
        ephemeris: Arc<dyn Ephemeris>,
        resolver: Arc<dyn TargetResolver>,
    ) -> PlannerResult<Self> {
        let location = config.validate()?;
        log::info!(
            "Planner ready for {} ({:.4}, {:.4}, {})",
            location.name,
            location.latitude,
            location.longitude,
            location.timezone
        );
        let analysis = &config.analysis;
        log::info!(
            "Sampling every {}s; visible needs {} samples above {:.1}° (about {} min)",
            analysis.cadence().num_seconds(),
            analysis.min_visible_samples,
            analysis.min_visible_altitude_deg,
            analysis.min_visible_duration().num_minutes()
        );
        Ok(Self {
            config: Arc::new(config),
            location: Arc::new(location),
            ephemeris,
            resolver,
        })
    }

    /// Planner backed by siderust and the configured catalog.
    pub fn from_config(config: PlannerConfig) -> PlannerResult<Self> {
        let resolver = CatalogResolver::new(config.catalog.clone());
        Self::new(config, Arc::new(SiderustEphemeris::new()), Arc::new(resolver))
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn resolver(&self) -> &dyn TargetResolver {
        self.resolver.as_ref()
    }

    pub fn night_windows(&self, date: NaiveDate) -> PlannerResult<NightWindows> {
        TwilightCalculator::new(self.ephemeris.as_ref(), &self.location).compute(date)
    }

    /// Run the full pipeline for `target` on the night starting at `date`.
    pub fn observe(&self, target: &Target, date: NaiveDate) -> PlannerResult<ObservationResult> {
        let windows = self.night_windows(date)?;
        self.observe_in(target, &windows)
    }

    /// Run the pipeline against precomputed night windows.
    pub fn observe_in(&self, target: &Target, windows: &NightWindows) -> PlannerResult<ObservationResult> {
        self.observe_cancellable(target, windows, &AtomicBool::new(false))
    }

    /// [`Planner::observe_in`] that gives up once `cancelled` is set.
    pub fn observe_cancellable(
        &self,
        target: &Target,
        windows: &NightWindows,
        cancelled: &AtomicBool,
    ) -> PlannerResult<ObservationResult> {
        let date = windows.date;
        let analysis = &self.config.analysis;
        let ephemeris = self.ephemeris.as_ref();
        let body = Body::Fixed(target.coordinates);

        let midnight = night_track::reference_midnight(date, &self.location)?;
        let track = night_track::build_cancellable(
            ephemeris,
            &body,
            &self.location,
            midnight,
            analysis.half_window_hours,
            analysis.sample_count,
            cancelled,
        )
        .map_err(|e| e.with_target(&target.name).with_date(date))?;
        if cancelled.load(Ordering::SeqCst) {
            return Err(PlannerError::timeout_with_context(
                "cancelled after the track",
                ErrorContext::new("observe").with_target(&target.name).with_date(date),
            ));
        }

        let search = widen_fallback(windows, TwilightDepth::Nautical, TwilightDepth::Civil, None);
        let dark = widen_fallback(windows, TwilightDepth::Astronomical, TwilightDepth::Civil, None);
        if search.is_none() {
            log::debug!("{}: no darkness window on {}", target.name, date);
        }
        let visibility = VisibilityAnalyzer::new(analysis).analyze(&track, search, dark);

        let moon = match visibility.night_max {
            Some(peak) => MoonScorer::new(ephemeris, &self.location, analysis).score(
                peak.instant,
                peak.direction,
                peak.azimuth_deg,
            ),
            None => MoonScore::unavailable("no night maximum"),
        };

        let checkpoints = night_track::direction_checkpoints(ephemeris, &body, &self.location, date)
            .map_err(|e| e.with_target(&target.name))?;

        Ok(ObservationResult {
            target: target.clone(),
            date,
            windows: *windows,
            visibility,
            moon,
            checkpoints,
        })
    }

    /// [`Planner::observe`] on the blocking pool, bounded by the target timeout.
    pub async fn observe_async(&self, target: Target, date: NaiveDate) -> PlannerResult<ObservationResult> {
        let name = target.name.clone();
        let planner = self.clone();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let work = async move {
            tokio::task::spawn_blocking(move || {
                let windows = planner.night_windows(date)?;
                planner.observe_cancellable(&target, &windows, &flag)
            })
            .await
            .map_err(|e| PlannerError::task_with_context(e.to_string(), ErrorContext::new("observe")))?
        };
        self.bounded(&name, date, &cancelled, work).await
    }

    /// Plan one night for the named targets.
    ///
    /// Twilight is computed once for `date`. Targets are resolved and analysed
    /// concurrently, at most `runtime.max_concurrency` at a time; results keep
    /// the order of `names`. A target that fails to resolve, errors or times
    /// out is left out of the results and recorded in the journal.
    ///
    /// # Errors
    /// Only a failure to compute the night's twilight windows fails the run.
    pub async fn plan_night<S: AsRef<str>>(&self, date: NaiveDate, names: &[S]) -> PlannerResult<NightPlan> {
        let windows = self.night_windows(date)?;
        let journal = RunJournal::new();
        log::info!("Planning {} targets for the night of {} at {}", names.len(), date, self.location.name);
        journal.note(format!("Planning {} targets for the night of {}", names.len(), date));

        let outcomes: Vec<(String, PlannerResult<ObservationResult>)> = stream::iter(names.iter())
            .map(|name| async move {
                let name = name.as_ref().to_string();
                let outcome = self.run_target(&name, windows).await;
                (name, outcome)
            })
            .buffered(self.config.runtime.max_concurrency)
            .collect()
            .await;

        let mut results = Vec::with_capacity(outcomes.len());
        for (name, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    if let (Some(reason), Some(_)) = (&result.moon.unavailable_reason, result.visibility.night_max) {
                        let error = PlannerError::moon_with_context(
                            reason.clone(),
                            ErrorContext::new("moon_score").with_target(&name).with_date(date),
                        );
                        journal.record_degraded(&name, Some(date), &error);
                    }
                    results.push(result);
                }
                Err(e) => journal.record_failure(&name, Some(date), &e),
            }
        }

        log::info!(
            "Planned {} of {} targets for {} ({} visible)",
            results.len(),
            names.len(),
            date,
            results.iter().filter(|r| r.visibility.visible).count()
        );
        Ok(NightPlan {
            date,
            location: self.location.as_ref().clone(),
            windows,
            results,
            journal: journal.entries(),
        })
    }

    async fn run_target(&self, name: &str, windows: NightWindows) -> PlannerResult<ObservationResult> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let work = async {
            let target = self.resolver.target(name).await?;
            let planner = self.clone();
            tokio::task::spawn_blocking(move || planner.observe_cancellable(&target, &windows, &flag))
                .await
                .map_err(|e| PlannerError::task_with_context(e.to_string(), ErrorContext::new("observe")))?
        };
        self.bounded(name, windows.date, &cancelled, work).await
    }

    /// Await `work` for at most the target timeout. On expiry `cancelled` is
    /// raised so the detached blocking task stops at its next sample.
    async fn bounded<F>(
        &self,
        name: &str,
        date: NaiveDate,
        cancelled: &AtomicBool,
        work: F,
    ) -> PlannerResult<ObservationResult>
    where
        F: Future<Output = PlannerResult<ObservationResult>>,
    {
        let bound = self.config.runtime.target_timeout();
        match tokio::time::timeout(bound, work).await {
            Ok(outcome) => outcome.map_err(|e| e.with_target(name).with_date(date)),
            Err(_) => {
                cancelled.store(true, Ordering::SeqCst);
                log::warn!("{} on {}: no result within {}s, cancelling", name, date, bound.as_secs());
                Err(PlannerError::timeout_with_context(
                    format!("no result within {}s", bound.as_secs()),
                    ErrorContext::new("observe").with_target(name).with_date(date),
                ))
            }
        }
    }
}
