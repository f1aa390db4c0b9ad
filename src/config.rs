//! Resolver configuration
//!
//! Loaded from a JSON file. Every field has a default, so `{}` is a valid
//! configuration.
//!
//! ```json
//! {
//!   "case_folding": "simple",
//!   "log_queries": true,
//!   "max_ranges": 4096
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fold::{CaseFolder, FoldingMode};
use crate::observability::{log_event_with_fields, Event};
use crate::planner::DEFAULT_MAX_RANGES;

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        "FOLDSCAN_CONFIG_INVALID"
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code(), self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Resolver configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Case folding used by the compiler and the post-filter
    #[serde(default)]
    pub case_folding: FoldingMode,

    /// Emit structured log lines per query
    #[serde(default = "default_log_queries")]
    pub log_queries: bool,

    /// Maximum number of ranges one predicate may compile to
    #[serde(default = "default_max_ranges")]
    pub max_ranges: usize,
}

fn default_log_queries() -> bool {
    true
}

fn default_max_ranges() -> usize {
    DEFAULT_MAX_RANGES
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            case_folding: FoldingMode::default(),
            log_queries: default_log_queries(),
            max_ranges: default_max_ranges(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::invalid(format!("Failed to read config: {}", e)))?;

        let config = Self::from_json(&content)?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("case_folding", config.case_folding.as_str()),
                ("max_ranges", &config.max_ranges.to_string()),
                ("path", &path.display().to_string()),
            ],
        );

        Ok(config)
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: ResolverConfig = serde_json::from_str(content)
            .map_err(|e| ConfigError::invalid(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_ranges == 0 {
            return Err(ConfigError::invalid("max_ranges must be > 0"));
        }
        Ok(())
    }

    /// Returns the case folder selected by `case_folding`
    pub fn folder(&self) -> CaseFolder {
        CaseFolder::new(self.case_folding)
    }

    pub fn with_case_folding(mut self, mode: FoldingMode) -> Self {
        self.case_folding = mode;
        self
    }

    pub fn with_log_queries(mut self, enabled: bool) -> Self {
        self.log_queries = enabled;
        self
    }

    pub fn with_max_ranges(mut self, max_ranges: usize) -> Self {
        self.max_ranges = max_ranges;
        self
    }
}
