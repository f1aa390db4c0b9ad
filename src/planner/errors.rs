//! Planner error types
//!
//! Error codes:
//! - FOLDSCAN_PREDICATE_MALFORMED (REJECT)
//! - FOLDSCAN_QUERY_TOO_MANY_RANGES (REJECT)
//! - FOLDSCAN_QUERY_LIMIT_INVALID (REJECT)
//!
//! Every planner error is raised at compile time; none reach the executor.

use std::fmt;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Predicate cannot describe any key set (empty value list, inverted range)
    PredicateMalformed,
    /// Compiled range set exceeds the configured maximum
    TooManyRanges,
    /// Limit must be positive
    LimitInvalid,
}

impl PlannerErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::PredicateMalformed => "FOLDSCAN_PREDICATE_MALFORMED",
            PlannerErrorCode::TooManyRanges => "FOLDSCAN_QUERY_TOO_MANY_RANGES",
            PlannerErrorCode::LimitInvalid => "FOLDSCAN_QUERY_LIMIT_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerError {
    code: PlannerErrorCode,
    message: String,
    predicate: Option<&'static str>,
}

impl PlannerError {
    /// Create a malformed predicate error
    pub fn malformed(predicate: &'static str, reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::PredicateMalformed,
            message: reason.into(),
            predicate: Some(predicate),
        }
    }

    /// Create a too-many-ranges error
    pub fn too_many_ranges(predicate: &'static str, count: usize, max: usize) -> Self {
        Self {
            code: PlannerErrorCode::TooManyRanges,
            message: format!("Predicate compiles to {} ranges, maximum is {}", count, max),
            predicate: Some(predicate),
        }
    }

    /// Create an invalid limit error
    pub fn limit_invalid() -> Self {
        Self {
            code: PlannerErrorCode::LimitInvalid,
            message: "Query limit must be positive".into(),
            predicate: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the predicate kind if applicable
    pub fn predicate(&self) -> Option<&'static str> {
        self.predicate
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let Some(predicate) = self.predicate {
            write!(f, " (in {})", predicate)?;
        }
        Ok(())
    }
}

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
