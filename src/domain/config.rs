use serde::{Deserialize, Serialize};

/// Name matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum similarity (0.0-1.0) a fuzzy hit needs to count as a match.
    pub min_fuzzy_score: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_fuzzy_score: 0.45,
        }
    }
}

/// History retention and display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of recent entries kept per identity domain.
    pub recent_capacity: usize,
    /// Maximum number of pinned entries. Unbounded when absent.
    pub pinned_capacity: Option<usize>,
    /// Maximum number of recent entries shown in the picker.
    /// Independent of `recent_capacity`.
    pub recent_display_cap: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            recent_capacity: 10,
            pinned_capacity: None,
            recent_display_cap: 3,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Enable file logging with rotation.
    pub file_logging: bool,
    /// Maximum number of log files to keep.
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: true,
            max_files: 7,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub matching: MatchingConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new AppConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }
}
