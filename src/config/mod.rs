use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::ReportError;

// ─── Platform helpers ─────────────────────────────────────────────────────────

/// Returns the user's home directory from `$HOME`, with a `.` fallback.
fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Returns the user-level config file path.
/// Respects `$XDG_CONFIG_HOME`; falls back to `~/.config`.
pub fn user_config_path() -> PathBuf {
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"));
    config_home.join("ipa-results/config.toml")
}

/// Default history log written by the test runner.
pub fn default_history_log() -> PathBuf {
    home_dir().join("ipa/results/.history")
}

// ─── Public config types ──────────────────────────────────────────────────────

/// Top-level configuration container.
#[derive(Debug, Clone, Default)]
pub struct ResultsConfig {
    pub output: OutputConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub no_color: bool, // default: false
    pub verbose: bool,  // default: false
}

#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub log: PathBuf, // default: ~/ipa/results/.history
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            log: default_history_log(),
        }
    }
}

/// CLI-provided values that override any config layer. Applied last.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub no_color: bool,
    pub verbose: bool,
    pub history_log: Option<PathBuf>,
}

// ─── Config loading ───────────────────────────────────────────────────────────

impl ResultsConfig {
    /// Load config with layered resolution:
    /// built-in defaults → user config → env vars
    ///
    /// CLI overrides are applied separately via `apply_overrides()`.
    pub fn load() -> Result<Self, ReportError> {
        let mut config = ResultsConfig::default();

        let user_path = user_config_path();
        if user_path.exists() {
            debug!(path = %user_path.display(), "loading user config");
            let toml_config = load_toml_file(&user_path)?;
            merge_toml(&mut config, toml_config);
        }

        apply_env(&mut config, |key| env::var(key).ok());

        Ok(config)
    }

    /// Apply CLI-flag overrides (highest priority, called after `load()`).
    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if overrides.no_color {
            self.output.no_color = true;
        }
        if overrides.verbose {
            self.output.verbose = true;
        }
        if let Some(log) = &overrides.history_log {
            self.history.log = log.clone();
        }
    }
}

// ─── TOML deserialization structs ─────────────────────────────────────────────
// All fields are optional so a partial file merges cleanly over the defaults.

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    #[serde(default)]
    output: TomlOutputConfig,
    #[serde(default)]
    history: TomlHistoryConfig,
}

#[derive(Debug, Deserialize, Default)]
struct TomlOutputConfig {
    no_color: Option<bool>,
    verbose: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlHistoryConfig {
    log: Option<String>,
}

// ─── TOML loading and merging ─────────────────────────────────────────────────

fn load_toml_file(path: &Path) -> Result<TomlConfig, ReportError> {
    let content = fs::read_to_string(path).map_err(|e| {
        ReportError::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;
    toml::from_str(&content).map_err(|e| {
        ReportError::Config(format!("Malformed config file {}: {}", path.display(), e))
    })
}

fn merge_toml(config: &mut ResultsConfig, toml: TomlConfig) {
    if let Some(v) = toml.output.no_color {
        config.output.no_color = v;
    }
    if let Some(v) = toml.output.verbose {
        config.output.verbose = v;
    }
    if let Some(v) = &toml.history.log {
        if !v.is_empty() {
            config.history.log = tilde_expand(v);
        }
    }
}

// ─── Environment variable overrides ──────────────────────────────────────────

fn apply_env<F>(config: &mut ResultsConfig, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    // https://no-color.org: presence alone disables color.
    if var("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        config.output.no_color = true;
    }
    if let Some(v) = var("IPA_RESULTS_NO_COLOR") {
        match parse_bool(&v) {
            Some(b) => config.output.no_color = b,
            None => warn!(value = %v, "ignoring IPA_RESULTS_NO_COLOR"),
        }
    }
    if let Some(v) = var("IPA_RESULTS_HISTORY") {
        if !v.is_empty() {
            config.history.log = tilde_expand(&v);
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

// ─── Helper functions ─────────────────────────────────────────────────────────

/// Expands a leading `~` to the user's home directory.
pub fn tilde_expand(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else if path == "~" {
        home_dir()
    } else {
        PathBuf::from(path)
    }
}

// ─── ipa-results init ─────────────────────────────────────────────────────────

/// Generate a commented default `config.toml`.
pub fn generate_default_config() -> String {
    r#"# ipa-results configuration file
# All fields are optional. Values shown are the built-in defaults.

[output]
# no_color = false          # Disable ANSI colors (NO_COLOR also works)
# verbose = false           # Show run info and per-test outcomes

[history]
# log = "~/ipa/results/.history"   # History log written by the test runner
"#
    .to_string()
}

/// Write the default config file to the user config path.
///
/// Errors if the file already exists and `force` is false.
pub fn write_default_config(force: bool) -> Result<PathBuf, ReportError> {
    let path = user_config_path();
    if path.exists() && !force {
        return Err(ReportError::Config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ReportError::Config(format!(
                "Cannot create config directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }
    fs::write(&path, generate_default_config()).map_err(|e| {
        ReportError::Config(format!(
            "Cannot write config file {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(path)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
