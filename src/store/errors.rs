//! Store error types
//!
//! Error codes:
//! - FOLDSCAN_STORE_UNKNOWN_TABLE (ERROR)
//! - FOLDSCAN_STORE_UNKNOWN_INDEX (ERROR)
//! - FOLDSCAN_STORE_CONSTRAINT (ERROR)
//! - FOLDSCAN_STORE_IO (FATAL)

use std::fmt;

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation failed but the store is healthy
    Error,
    /// The store cannot serve further reads in this transaction
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Store error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Table does not exist
    UnknownTable,
    /// Index does not exist on the table
    UnknownIndex,
    /// Write rejected by a unique index or an unindexable value
    Constraint,
    /// Cursor or transaction failure
    Io,
}

impl StoreErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::UnknownTable => "FOLDSCAN_STORE_UNKNOWN_TABLE",
            StoreErrorCode::UnknownIndex => "FOLDSCAN_STORE_UNKNOWN_INDEX",
            StoreErrorCode::Constraint => "FOLDSCAN_STORE_CONSTRAINT",
            StoreErrorCode::Io => "FOLDSCAN_STORE_IO",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StoreErrorCode::Io => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
}

impl StoreError {
    /// Create an unknown table error
    pub fn unknown_table(table: &str) -> Self {
        Self {
            code: StoreErrorCode::UnknownTable,
            message: format!("Table '{}' not found", table),
        }
    }

    /// Create an unknown index error
    pub fn unknown_index(table: &str, index: &str) -> Self {
        Self {
            code: StoreErrorCode::UnknownIndex,
            message: format!("Index '{}' not found on table '{}'", index, table),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::Constraint,
            message: reason.into(),
        }
    }

    /// Create a cursor or transaction failure
    pub fn io(reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::Io,
            message: reason.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
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

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for StoreError {}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreErrorCode::UnknownTable.code(), "FOLDSCAN_STORE_UNKNOWN_TABLE");
        assert_eq!(StoreErrorCode::UnknownIndex.code(), "FOLDSCAN_STORE_UNKNOWN_INDEX");
        assert_eq!(StoreErrorCode::Constraint.code(), "FOLDSCAN_STORE_CONSTRAINT");
        assert_eq!(StoreErrorCode::Io.code(), "FOLDSCAN_STORE_IO");
    }

    #[test]
    fn test_io_is_fatal() {
        assert!(StoreError::io("cursor closed").is_fatal());
        assert!(!StoreError::constraint("duplicate").is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::unknown_index("files", "size");
        let display = format!("{}", err);
        assert!(display.contains("FOLDSCAN_STORE_UNKNOWN_INDEX"));
        assert!(display.contains("ERROR"));
        assert!(display.contains("size"));
    }
}
