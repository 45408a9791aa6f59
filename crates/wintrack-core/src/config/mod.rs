mod loader;
mod rules;

use serde::{Deserialize, Serialize};

pub use loader::{config_dir, config_path, load, log_dir, parse, try_load};
pub use rules::{WindowRule, default_rules, first_match};

/// Top-level configuration for wintrack.
///
/// Loaded from `~/.config/wintrack/config.toml`. Missing sections
/// fall back to defaults thanks to `#[serde(default)]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub log: LogConfig,
    /// Event loop behaviour.
    pub manager: ManagerOptions,
    /// Extra exclusions on top of the built-in filter lists.
    pub filter: FilterConfig,
    /// Ordered user rules (`[[rule]]` tables). First match wins; the
    /// built-in shell rules are checked after them.
    #[serde(rename = "rule")]
    pub rules: Vec<WindowRule>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Whether to log to `~/.config/wintrack/logs/wintrack.log`
    /// instead of stderr. Defaults to `false`.
    pub enabled: bool,
    /// Minimum log level: "trace", "debug", "info", "warn", or "error".
    pub level: String,
}

/// Options controlling the manager's event loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerOptions {
    /// Fire `WINDOW_ADDED` for every window found by the initial scan.
    pub announce_initial: bool,
}

/// User-supplied additions to the built-in exclusion lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Window class names that are never managed (case-insensitive).
    pub ignored_classes: Vec<String>,
    /// Executable names that are never managed (case-insensitive).
    pub ignored_processes: Vec<String>,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".into(),
        }
    }
}

impl Config {
    /// Normalises values that would otherwise be rejected downstream.
    ///
    /// Unknown log levels fall back to "info" and empty list entries
    /// are dropped.
    pub fn validate(&mut self) {
        let level = self.log.level.trim().to_ascii_lowercase();
        self.log.level = if LOG_LEVELS.contains(&level.as_str()) {
            level
        } else {
            "info".into()
        };
        self.filter.ignored_classes.retain(|c| !c.trim().is_empty());
        self.filter.ignored_processes.retain(|p| !p.trim().is_empty());
        self.rules
            .retain(|r| r.match_class.is_some() || r.match_title.is_some());
    }
}
