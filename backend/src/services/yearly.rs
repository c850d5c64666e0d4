//! Month-by-month overview of one target across a year.

use chrono::{Datelike, NaiveDate};
use futures::future::join_all;
use serde::Serialize;

use crate::api::ObservationResult;
use crate::error::{PlannerError, PlannerResult};
use crate::models::Target;
use crate::services::journal::{JournalEntry, RunJournal};
use crate::services::planner::Planner;

/// Nights of one target on the 1st of each month, January first.
#[derive(Debug, Clone, Serialize)]
pub struct YearlyOverview {
    pub target: Target,
    pub year: i32,
    /// Months that produced a result, in month order
    pub months: Vec<ObservationResult>,
    /// Months that failed, one error entry each
    pub journal: Vec<JournalEntry>,
}

impl YearlyOverview {
    /// Months in which the target passes the visibility test.
    pub fn visible_months(&self) -> Vec<u32> {
        self.months
            .iter()
            .filter(|r| r.visibility.visible)
            .map(|r| r.date.month())
            .collect()
    }

    /// Months without a result.
    pub fn failed_months(&self) -> Vec<u32> {
        self.journal
            .iter()
            .filter_map(|e| e.date.map(|d| d.month()))
            .collect()
    }
}

/// Runs the nightly pipeline on the 1st of each month.
pub struct YearlyBestFinder<'a> {
    planner: &'a Planner,
}

impl<'a> YearlyBestFinder<'a> {
    pub fn new(planner: &'a Planner) -> Self {
        Self { planner }
    }

    /// Observe `target` on the night starting the 1st of every month of `year`.
    ///
    /// Months are evaluated concurrently. The twelve outcomes are returned in
    /// month order; a failing month does not affect the others.
    ///
    /// # Errors
    /// Only a `year` outside the calendar range fails the call.
    pub async fn find_best(
        &self,
        target: &Target,
        year: i32,
    ) -> PlannerResult<Vec<(NaiveDate, PlannerResult<ObservationResult>)>> {
        let dates = first_of_months(year)?;
        log::info!("Yearly overview of {} for {}", target.name, year);
        let runs = dates
            .iter()
            .map(|&date| self.planner.observe_async(target.clone(), date));
        let outcomes = join_all(runs).await;
        Ok(dates.into_iter().zip(outcomes).collect())
    }

    /// [`YearlyBestFinder::find_best`] with failed months moved to a journal.
    pub async fn overview(&self, target: &Target, year: i32) -> PlannerResult<YearlyOverview> {
        let journal = RunJournal::new();
        let mut months = Vec::with_capacity(12);
        for (date, outcome) in self.find_best(target, year).await? {
            match outcome {
                Ok(result) => months.push(result),
                Err(e) => journal.record_failure(&target.name, Some(date), &e),
            }
        }
        if journal.has_failures() {
            log::warn!("{}: {} of 12 months failed in {}", target.name, 12 - months.len(), year);
        }
        Ok(YearlyOverview {
            target: target.clone(),
            year,
            months,
            journal: journal.failures(),
        })
    }
}

fn first_of_months(year: i32) -> PlannerResult<Vec<NaiveDate>> {
    (1..=12)
        .map(|month| {
            NaiveDate::from_ymd_opt(year, month, 1)
                .ok_or_else(|| PlannerError::configuration(format!("year {} out of range", year)))
        })
        .collect()
}
