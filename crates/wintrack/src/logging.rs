use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use wintrack_core::config::{self, LogConfig};

/// Crate targets whose level follows `[log] level`.
const OUR_CRATES: &[&str] = &["wintrack", "wintrack_core", "wintrack_windows"];

/// Builds a directive that sets `level` for our crates only.
fn level_spec(level: &str) -> String {
    OUR_CRATES
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. With `[log] enabled`
/// output goes to `~/.config/wintrack/logs/wintrack.log`, otherwise to
/// stderr.
pub fn init(log: &LogConfig) {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_spec(&log.level)))
    };

    if log.enabled {
        match open_log_file() {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter())
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
                return;
            }
            Err(e) => eprintln!("warning: file logging disabled: {e}"),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn open_log_file() -> std::io::Result<fs::File> {
    let dir = config::log_dir().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "no home directory")
    })?;
    fs::create_dir_all(&dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("wintrack.log"))
}
