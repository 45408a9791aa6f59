pub mod events;
pub mod list;
pub mod window;

use std::sync::Arc;

use wintrack_core::Platform;

/// Result type shared by every subcommand.
pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Returns the windowing backend for the current OS.
#[cfg(windows)]
pub fn platform() -> CommandResult<Arc<dyn Platform>> {
    wintrack_windows::dpi::enable_dpi_awareness();
    Ok(wintrack_windows::platform())
}

#[cfg(not(windows))]
pub fn platform() -> CommandResult<Arc<dyn Platform>> {
    Err(format!("unsupported platform: {} (wintrack requires Windows)", std::env::consts::OS).into())
}
