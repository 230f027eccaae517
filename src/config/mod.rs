/// Configuration system for studylog.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::StudylogConfig::default()`]
/// 2. **User global config** — `~/.studylog/config.toml`
/// 3. **Project local config** — `.studylog.toml` in the current working directory
/// 4. **Environment variables** — `STUDYLOG_*` overrides (highest precedence)
///
/// Later layers replace earlier ones. Missing sections in a TOML file fall
/// back to defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use studylog::config;
///
/// let cfg = config::load();
/// let dir = cfg.data_dir();
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::analytics::aggregator::Granularity;
use crate::analytics::goal::DailyTarget;

pub use schema::StudylogConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges defaults → global TOML → project TOML → env vars.
pub fn load() -> StudylogConfig {
    let mut config = StudylogConfig::default();

    if let Some(global) = load_toml_file(global_config_path()) {
        config = global;
    }

    if let Some(project) = load_toml_file(project_config_path()) {
        config = project;
    }

    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A malformed file is logged and ignored.
fn load_toml_file(path: Option<PathBuf>) -> Option<StudylogConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "ignoring malformed config file");
            None
        }
    }
}

impl StudylogConfig {
    /// Resolved data directory with `~` expanded.
    pub fn data_dir(&self) -> PathBuf {
        expand_home(&self.general.data_dir)
    }
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest.trim_start_matches(['/', '\\']));
    }
    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.studylog/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".studylog").join("config.toml"))
}

/// Path to the project local config: `.studylog.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".studylog.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `STUDYLOG_DATA_DIR` — data directory
/// - `STUDYLOG_DAILY_TARGET` — default daily target (positive integer)
/// - `STUDYLOG_GRANULARITY` — default trend granularity
/// - `STUDYLOG_LOG_LEVEL` — log level filter
fn apply_env_overrides(config: &mut StudylogConfig) {
    if let Ok(val) = std::env::var("STUDYLOG_DATA_DIR")
        && !val.is_empty()
    {
        config.general.data_dir = val;
    }
    if let Ok(val) = std::env::var("STUDYLOG_DAILY_TARGET")
        && let Ok(raw) = val.trim().parse::<i64>()
        && let Some(target) = DailyTarget::new(raw)
    {
        config.goal.daily_target = target;
    }
    if let Ok(val) = std::env::var("STUDYLOG_GRANULARITY")
        && let Ok(granularity) = val.parse::<Granularity>()
    {
        config.analytics.default_granularity = granularity;
    }
    if let Ok(val) = std::env::var("STUDYLOG_LOG_LEVEL")
        && !val.is_empty()
    {
        config.logging.level = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.studylog/config.toml`.
///
/// Returns an error if the file already exists unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.studylog/ directory")?;
    }

    fs::write(&path, StudylogConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key in the global config file.
///
/// Supports dotted keys like `goal.daily_target`. When no file exists yet,
/// the defaults are written out first.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&StudylogConfig::default())
            .context("failed to serialize default config")?
    };

    let updated = apply_setting(&content, key, value)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, updated).context("failed to write config file")?;

    Ok(())
}

/// Apply one dotted-key update to config text, returning the new text.
///
/// Fails if the result would no longer load as a [`StudylogConfig`].
fn apply_setting(content: &str, key: &str, value: &str) -> Result<String> {
    let mut root: toml::Value =
        toml::from_str(content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    let updated = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<StudylogConfig>(&updated)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;
    Ok(updated)
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("empty config key segment in '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn expand_home_replaces_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.studylog"), home.join(".studylog"));
        }
        assert_eq!(expand_home("/var/data"), PathBuf::from("/var/data"));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let mut root: toml::Value = toml::from_str("[goal]\ndaily_target = 6\n").unwrap();
        set_toml_value(&mut root, "goal.daily_target", "9").unwrap();
        assert_eq!(root["goal"]["daily_target"].as_integer(), Some(9));
    }

    #[test]
    fn set_toml_value_updates_string_and_bool() {
        let mut root: toml::Value = toml::from_str(
            "[analytics]\ndefault_granularity = \"daily\"\n[logging]\nenabled = true\n",
        )
        .unwrap();
        set_toml_value(&mut root, "analytics.default_granularity", "weekly").unwrap();
        set_toml_value(&mut root, "logging.enabled", "off").unwrap();

        assert_eq!(
            root["analytics"]["default_granularity"].as_str(),
            Some("weekly")
        );
        assert_eq!(root["logging"]["enabled"].as_bool(), Some(false));
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root: toml::Value = toml::from_str("[goal]\ndaily_target = 6\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "1").is_err());
        assert!(set_toml_value(&mut root, "goal.missing", "1").is_err());
        assert!(set_toml_value(&mut root, "goal.daily_target", "six").is_err());
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: StudylogConfig = toml::from_str(&toml_str).unwrap();
    }

    #[test]
    fn setting_rejects_values_that_would_not_load() {
        let defaults = StudylogConfig::default_toml();

        let err = apply_setting(&defaults, "goal.daily_target", "0").unwrap_err();
        assert!(err.to_string().contains("goal.daily_target"));
        assert!(apply_setting(&defaults, "goal.daily_target", "-5").is_err());
        assert!(apply_setting(&defaults, "analytics.daily_window", "0").is_err());

        let updated = apply_setting(&defaults, "goal.daily_target", "8").unwrap();
        let config: StudylogConfig = toml::from_str(&updated).unwrap();
        assert_eq!(config.goal.daily_target.get(), 8);
    }
}
