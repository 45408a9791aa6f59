use std::io;
use std::path::PathBuf;

use super::Config;
use crate::{Error, WindowResult};

/// Returns the config directory: `~/.config/wintrack/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".config").join("wintrack"))
}

/// Returns the config file path: `~/.config/wintrack/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Returns the log directory: `~/.config/wintrack/logs/`.
pub fn log_dir() -> Option<PathBuf> {
    config_dir().map(|d| d.join("logs"))
}

/// Parses and validates a TOML configuration document.
pub fn parse(content: &str) -> WindowResult<Config> {
    let mut config: Config = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
    config.validate();
    Ok(config)
}

/// Tries to load and parse `config.toml`.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn try_load() -> WindowResult<Option<Config>> {
    let path = config_path().ok_or_else(|| Error::Config("could not determine config path".into()))?;
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::Config(format!("{}: {e}", path.display()))),
    };
    parse(&content)
        .map(Some)
        .map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
}

/// Loads the configuration from disk, falling back to defaults.
///
/// A missing file silently returns defaults; other errors are logged.
pub fn load() -> Config {
    match try_load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            tracing::warn!("{e}; using defaults");
            Config::default()
        }
    }
}
