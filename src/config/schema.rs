/// Configuration schema and defaults for studylog.
///
/// Defines the TOML-serializable configuration structure with the
/// `[general]`, `[goal]`, `[analytics]` and `[logging]` sections.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use serde::{Deserialize, Serialize};

use crate::analytics::aggregator::{DAILY_WINDOW, Granularity};
use crate::analytics::goal::DailyTarget;
use crate::analytics::keywords::TOP_KEYWORDS;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level studylog configuration.
///
/// Maps directly to `~/.studylog/config.toml` and `.studylog.toml`. All
/// sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudylogConfig {
    pub general: GeneralConfig,
    pub goal: GoalConfig,
    pub analytics: AnalyticsConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [general]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the record store and log file. `~` is expanded.
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.studylog".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [goal]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    /// Sets per day used until a target is saved with `studylog target`.
    /// Zero and negative values fail to load.
    pub daily_target: DailyTarget,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            daily_target: DailyTarget::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// [analytics]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Granularity used by `studylog trends` when none is given.
    pub default_granularity: Granularity,
    /// Most recent points kept in daily mode. Must be at least 1.
    #[serde(deserialize_with = "positive_window")]
    pub daily_window: usize,
    /// Number of recurring note terms reported.
    pub top_keywords: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_granularity: Granularity::Daily,
            daily_window: DAILY_WINDOW,
            top_keywords: TOP_KEYWORDS,
        }
    }
}

fn positive_window<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let window = usize::deserialize(deserializer)?;
    if window == 0 {
        return Err(serde::de::Error::custom("daily_window must be at least 1"));
    }
    Ok(window)
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether diagnostic logging is written at all.
    pub enabled: bool,
    /// Log level filter: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    pub level: String,
    /// Log file name inside the data directory.
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            file: "studylog.log".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl StudylogConfig {
    /// Annotated default config file, written by `studylog config init`.
    pub fn default_toml() -> String {
        r#"# studylog configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (STUDYLOG_*)
#   2. Project config (.studylog.toml in current directory)
#   3. User global config (~/.studylog/config.toml)
#   4. Built-in defaults

[general]
data_dir = "~/.studylog"

[goal]
daily_target = 6                  # sets per day until `studylog target` saves one

[analytics]
default_granularity = "daily"     # daily | weekly | monthly
daily_window = 30                 # most recent points kept in daily mode
top_keywords = 5                  # recurring note terms reported

[logging]
enabled = true
level = "info"                    # error | warn | info | debug | trace
file = "studylog.log"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
