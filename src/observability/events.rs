//! Observability events for foldscan
//!
//! Events are explicit and typed. Scan events share the `SCAN` prefix used
//! by the scan's `ObservationScope`.

use std::fmt;

/// Observable events during query resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Resolver configuration loaded
    ConfigLoaded,
    /// Predicate compiled into a range set
    QueryCompiled,
    /// Predicate rejected at compile time
    QueryRejected,
    /// Range scan started
    ScanBegin,
    /// Range scan exhausted every range
    ScanComplete,
    /// Range scan ended by a store or filter failure
    ScanAborted,
    /// Range scan dropped by the consumer before exhaustion
    ScanCancelled,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::QueryCompiled => "QUERY_COMPILED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::ScanBegin => "SCAN_BEGIN",
            Event::ScanComplete => "SCAN_COMPLETE",
            Event::ScanAborted => "SCAN_FAILED",
            Event::ScanCancelled => "SCAN_INCOMPLETE",
        }
    }

    /// Returns true if this event ends a query with an error
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::QueryRejected | Event::ScanAborted)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
