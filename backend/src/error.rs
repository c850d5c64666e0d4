//! Error types for planner operations.
//!
//! Errors carry a structured [`ErrorContext`] naming the operation, target and
//! night they relate to, so per-target failures can be reported without
//! aborting a batch.

use chrono::NaiveDate;
use std::fmt;

use crate::ephemeris::EphemerisError;
use crate::resolver::ResolverError;

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

/// Structured context for planner errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "twilight", "resolve_target")
    pub operation: Option<String>,
    /// Target name if applicable
    pub target: Option<String>,
    /// Civil date of the night if applicable
    pub date: Option<NaiveDate>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the target name.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the night's civil date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref target) = self.target {
            parts.push(format!("target={}", target));
        }
        if let Some(ref date) = self.date {
            parts.push(format!("date={}", date));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for planner operations
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// Invalid location, timezone or analysis parameters. Raised before any
    /// per-target work starts.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// Target name not recognized by the resolver.
    #[error("Resolution error: {message} {context}")]
    Resolution {
        message: String,
        context: ErrorContext,
    },

    /// Ephemeris could not produce a usable value.
    #[error("Ephemeris unavailable: {message} {context}")]
    EphemerisUnavailable {
        message: String,
        context: ErrorContext,
    },

    /// Moon position or phase could not be evaluated.
    #[error("Moon score unavailable: {message} {context}")]
    MoonScoreUnavailable {
        message: String,
        context: ErrorContext,
    },

    /// Per-target work exceeded its time bound.
    #[error("Timeout error: {message} {context}")]
    Timeout {
        message: String,
        context: ErrorContext,
    },

    /// Blocking task panicked or was cancelled.
    #[error("Task error: {message} {context}")]
    Task {
        message: String,
        context: ErrorContext,
    },
}

impl PlannerError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::new("configuration"),
        }
    }

    /// Create a resolution error with context.
    pub fn resolution_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Resolution {
            message: message.into(),
            context,
        }
    }

    /// Create an ephemeris error with context.
    pub fn ephemeris_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::EphemerisUnavailable {
            message: message.into(),
            context,
        }
    }

    /// Create a moon score error with context.
    pub fn moon_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::MoonScoreUnavailable {
            message: message.into(),
            context,
        }
    }

    /// Create a timeout error with context.
    pub fn timeout_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Timeout {
            message: message.into(),
            context,
        }
    }

    /// Create a task error with context.
    pub fn task_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Task {
            message: message.into(),
            context,
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Configuration { context, .. }
            | Self::Resolution { context, .. }
            | Self::EphemerisUnavailable { context, .. }
            | Self::MoonScoreUnavailable { context, .. }
            | Self::Timeout { context, .. }
            | Self::Task { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Configuration { context, .. }
            | Self::Resolution { context, .. }
            | Self::EphemerisUnavailable { context, .. }
            | Self::MoonScoreUnavailable { context, .. }
            | Self::Timeout { context, .. }
            | Self::Task { context, .. } => context,
        }
    }

    /// Attach the target name to the error context.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.context_mut().target = Some(target.into());
        self
    }

    /// Attach the night's date unless the context already carries one.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        let context = self.context_mut();
        context.date.get_or_insert(date);
        self
    }

    /// Short condition name used in run journals.
    pub fn condition(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Resolution { .. } => "resolution",
            Self::EphemerisUnavailable { .. } => "ephemeris_unavailable",
            Self::MoonScoreUnavailable { .. } => "moon_score_unavailable",
            Self::Timeout { .. } => "timeout",
            Self::Task { .. } => "task",
        }
    }

    /// Whether only the affected target is lost, not the whole run.
    pub fn is_per_target(&self) -> bool {
        !matches!(self, Self::Configuration { .. })
    }
}

impl From<EphemerisError> for PlannerError {
    fn from(err: EphemerisError) -> Self {
        PlannerError::ephemeris_with_context(err.to_string(), ErrorContext::new("ephemeris"))
    }
}

impl From<ResolverError> for PlannerError {
    fn from(err: ResolverError) -> Self {
        let context = match &err {
            ResolverError::NotFound { name } => ErrorContext::new("resolve_target").with_target(name),
            ResolverError::Backend { .. } => ErrorContext::new("resolve_target"),
        };
        PlannerError::resolution_with_context(err.to_string(), context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new("twilight")
            .with_target("M31")
            .with_date(NaiveDate::from_ymd_opt(2024, 6, 21).unwrap())
            .with_details("non-finite altitude");

        let display = ctx.to_string();
        assert!(display.contains("operation=twilight"));
        assert!(display.contains("target=M31"));
        assert!(display.contains("date=2024-06-21"));
        assert!(display.contains("details=non-finite altitude"));
    }

    #[test]
    fn test_configuration_is_not_per_target() {
        let err = PlannerError::configuration("latitude out of range");
        assert!(!err.is_per_target());
        assert_eq!(err.condition(), "configuration");
        assert!(err.to_string().contains("latitude out of range"));
    }

    #[test]
    fn test_with_date_keeps_existing_date() {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = PlannerError::ephemeris_with_context("bad", ErrorContext::new("twilight").with_date(first))
            .with_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .with_target("M42");
        assert_eq!(err.context().date, Some(first));
        assert_eq!(err.context().target.as_deref(), Some("M42"));
    }

    #[test]
    fn test_resolver_not_found_conversion() {
        let err: PlannerError = ResolverError::NotFound {
            name: "NGC 99999".into(),
        }
        .into();
        assert!(err.is_per_target());
        assert_eq!(err.condition(), "resolution");
        assert_eq!(err.context().target.as_deref(), Some("NGC 99999"));
    }

    #[test]
    fn test_ephemeris_conversion() {
        let err: PlannerError = EphemerisError::Degenerate {
            reason: "NaN latitude".into(),
        }
        .into();
        assert_eq!(err.condition(), "ephemeris_unavailable");
        assert!(err.to_string().contains("NaN latitude"));
    }
}
