//! ObservationScope for automatic begin/complete logging
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` or `{name}_FAILED` on explicit exit
//! - Logs `{name}_INCOMPLETE` on drop without an explicit exit

use std::time::Instant;

use super::logger::Logger;

/// A scope that automatically logs begin and end events
///
/// # Usage
///
/// ```ignore
/// let scope = ObservationScope::with_fields("SCAN", &[("index", "files.filename")]);
/// // ... do work ...
/// scope.complete(); // logs SCAN_COMPLETE
/// // if dropped instead, logs SCAN_INCOMPLETE
/// ```
///
/// Fields given at creation are repeated on every event of the scope, so
/// all lines of one scope can be correlated.
#[derive(Debug)]
pub struct ObservationScope<'a> {
    name: &'a str,
    completed: bool,
    fields: Vec<(&'a str, String)>,
}

impl<'a> ObservationScope<'a> {
    /// Create a new observation scope
    ///
    /// Logs `{name}_BEGIN` immediately.
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Create a new observation scope with additional fields
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        let event = format!("{}_BEGIN", name);
        Logger::info(&event, fields);

        Self {
            name,
            completed: false,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
        }
    }

    fn all_fields<'f>(&'f self, extra: &[(&'f str, &'f str)]) -> Vec<(&'f str, &'f str)> {
        let mut all: Vec<(&str, &str)> = self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all.extend(extra.iter().copied());
        all
    }

    /// Mark the scope as successfully completed
    ///
    /// Logs `{name}_COMPLETE` at INFO level.
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Mark the scope as successfully completed with additional fields
    pub fn complete_with_fields(mut self, extra_fields: &[(&str, &str)]) {
        self.completed = true;
        let event = format!("{}_COMPLETE", self.name);
        Logger::info(&event, &self.all_fields(extra_fields));
    }

    /// Mark the scope as failed with a reason
    ///
    /// Logs `{name}_FAILED` at ERROR level.
    pub fn fail(self, reason: &str) {
        self.fail_with_fields(reason, &[]);
    }

    /// Mark the scope as failed with a reason and additional fields
    pub fn fail_with_fields(mut self, reason: &str, extra_fields: &[(&str, &str)]) {
        self.completed = true;
        let event = format!("{}_FAILED", self.name);
        let mut fields = self.all_fields(extra_fields);
        fields.push(("reason", reason));
        Logger::error(&event, &fields);
    }

    /// Check if the scope has been completed
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed {
            let event = format!("{}_INCOMPLETE", self.name);
            let mut fields = self.all_fields(&[]);
            fields.push(("reason", "scope dropped without completion"));
            Logger::info(&event, &fields);
        }
    }
}

/// A simple duration timer for logging elapsed time
#[derive(Debug)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed microseconds as a string
    pub fn elapsed_us(&self) -> String {
        self.start.elapsed().as_micros().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
