#![cfg(windows)]

/// Ctrl+C handling via `SetConsoleCtrlHandler`.
pub mod ctrl_c;

/// Per-monitor DPI awareness.
pub mod dpi;

/// Win32 window enumeration.
mod enumerate;

/// Raw WinEvent code translation.
mod event;

/// Visible frame bounds and invisible border compensation.
mod frame;

/// The `SetWinEventHook` subscription and its message pump.
mod hook;

/// `Platform` implementation over Win32.
pub mod platform;

/// Process image name lookup.
mod process;

use std::sync::Arc;

pub use platform::Win32;

/// Returns the Win32 platform as a shared trait object.
pub fn platform() -> Arc<dyn wintrack_core::Platform> {
    Arc::new(Win32)
}
