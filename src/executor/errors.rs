//! Query error types
//!
//! Error codes:
//! - FOLDSCAN_PREDICATE_MALFORMED, FOLDSCAN_QUERY_* (REJECT, from the planner)
//! - FOLDSCAN_STORE_* (ERROR / FATAL, from the store)
//! - FOLDSCAN_FILTER_FAILED (ERROR)
//!
//! A query ends at the first error. Store and filter errors abort the scan
//! in flight; nothing is retried.

use thiserror::Error;

use crate::index::PrimaryKey;
use crate::planner::{FilterError, PlannerError};
use crate::store::StoreError;

/// Errors surfaced by `resolve` and by the result stream
#[derive(Debug, Error)]
pub enum QueryError {
    /// Predicate rejected at compile time; no scan was started
    #[error("Malformed predicate: {0}")]
    MalformedPredicate(#[from] PlannerError),

    /// Cursor or transaction failure, propagated unchanged
    #[error("Store failure: {0}")]
    StoreFailure(#[from] StoreError),

    /// Caller-supplied filter raised an error
    #[error("Auxiliary filter failed on record {primary_key}: {source}")]
    AuxiliaryFilterFailure {
        primary_key: PrimaryKey,
        #[source]
        source: FilterError,
    },
}

impl QueryError {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::MalformedPredicate(err) => err.code().code(),
            QueryError::StoreFailure(err) => err.code().code(),
            QueryError::AuxiliaryFilterFailure { .. } => "FOLDSCAN_FILTER_FAILED",
        }
    }

    /// Returns true if the error aborted a scan in flight
    pub fn is_fatal(&self) -> bool {
        !matches!(self, QueryError::MalformedPredicate(_))
    }

    /// Returns true if the query was rejected before any scan
    pub fn is_rejection(&self) -> bool {
        matches!(self, QueryError::MalformedPredicate(_))
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
