//! Observability subsystem for foldscan
//!
//! This module provides:
//! - Structured logging (single-line JSON payloads through `tracing`)
//! - Query metrics
//! - Scan lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on query results
//! 3. No async or background threads
//! 4. Deterministic field ordering
//!
//! # Usage
//!
//! ```ignore
//! use foldscan::observability::{Logger, Event, MetricsRegistry, ObservationScope};
//!
//! Logger::info("QUERY_COMPILED", &[("ranges", "2")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_queries_compiled();
//!
//! let scope = ObservationScope::new("SCAN");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity, LOG_TARGET};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_failure() {
        Severity::Warn
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
