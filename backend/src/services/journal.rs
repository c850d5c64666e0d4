//! Run journal for planning runs.
//!
//! Collects per-target failures and progress notes while targets are processed
//! concurrently, so a run can report which targets were dropped and why.

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::PlannerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalLevel {
    Info,
    Warning,
    Error,
}

/// A single journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub level: JournalLevel,
    pub target: Option<String>,
    pub date: Option<NaiveDate>,
    /// Short condition name, e.g. `timeout` or `resolution`
    pub condition: Option<String>,
    pub message: String,
}

/// Shared, append-only journal of one planning run.
#[derive(Clone, Default)]
pub struct RunJournal {
    entries: Arc<RwLock<Vec<JournalEntry>>>,
}

impl RunJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a target that was dropped from the run.
    pub fn record_failure(&self, target: &str, date: Option<NaiveDate>, error: &PlannerError) {
        log::warn!("Target {} dropped: {}", target, error);
        self.push(JournalLevel::Error, target, date, error);
    }

    /// Record a target that was kept with a partial result.
    pub fn record_degraded(&self, target: &str, date: Option<NaiveDate>, error: &PlannerError) {
        log::warn!("Target {} degraded: {}", target, error);
        self.push(JournalLevel::Warning, target, date, error);
    }

    fn push(&self, level: JournalLevel, target: &str, date: Option<NaiveDate>, error: &PlannerError) {
        self.entries.write().push(JournalEntry {
            timestamp: Utc::now(),
            level,
            target: Some(target.to_string()),
            date: date.or(error.context().date),
            condition: Some(error.condition().to_string()),
            message: error.to_string(),
        });
    }

    /// Add an informational note.
    pub fn note(&self, message: impl Into<String>) {
        self.entries.write().push(JournalEntry {
            timestamp: Utc::now(),
            level: JournalLevel::Info,
            target: None,
            date: None,
            condition: None,
            message: message.into(),
        });
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.read().clone()
    }

    /// Entries describing dropped targets, in recording order.
    pub fn failures(&self) -> Vec<JournalEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.level == JournalLevel::Error)
            .cloned()
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.entries.read().iter().any(|e| e.level == JournalLevel::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorContext;

    #[test]
    fn test_failures_exclude_notes() {
        let journal = RunJournal::new();
        journal.note("planning 2 targets");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        journal.record_failure(
            "M999",
            Some(date),
            &PlannerError::resolution_with_context("target 'M999' not found", ErrorContext::new("resolve_target")),
        );

        assert_eq!(journal.entries().len(), 2);
        let failures = journal.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].target.as_deref(), Some("M999"));
        assert_eq!(failures[0].condition.as_deref(), Some("resolution"));
        assert_eq!(failures[0].date, Some(date));
        assert!(journal.has_failures());
    }

    #[test]
    fn test_degraded_targets_are_not_failures() {
        let journal = RunJournal::new();
        journal.record_degraded(
            "M31",
            None,
            &PlannerError::moon_with_context("no lunar theory", ErrorContext::new("moon_score")),
        );
        assert!(journal.failures().is_empty());
        assert!(!journal.has_failures());
        assert_eq!(journal.entries()[0].level, JournalLevel::Warning);
        assert_eq!(journal.entries()[0].condition.as_deref(), Some("moon_score_unavailable"));
    }

    #[test]
    fn test_timeout_is_a_failure() {
        let journal = RunJournal::new();
        journal.record_failure(
            "M31",
            None,
            &PlannerError::timeout_with_context("exceeded 1s", ErrorContext::new("observe")),
        );
        assert_eq!(journal.failures()[0].condition.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_clones_share_entries() {
        let journal = RunJournal::new();
        let clone = journal.clone();
        clone.note("from clone");
        assert_eq!(journal.entries().len(), 1);
        assert!(!journal.has_failures());
    }
}
