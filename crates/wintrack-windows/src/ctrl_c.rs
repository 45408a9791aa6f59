//! Ctrl+C handler using `SetConsoleCtrlHandler`.

use std::sync::OnceLock;

use windows::Win32::System::Console::{CTRL_BREAK_EVENT, CTRL_C_EVENT, SetConsoleCtrlHandler};
use windows::core::BOOL;
use wintrack_core::{Error, WindowResult};

type Callback = Box<dyn Fn() + Send + Sync>;

/// Written once by `set_handler`, read by the console callback.
static CALLBACK: OnceLock<Callback> = OnceLock::new();

/// Registers `callback` to run on Ctrl+C or Ctrl+Break.
///
/// The console callback runs on a thread spawned by the OS, so
/// `callback` must only do thread-safe work such as
/// [`StopHandle::stop`](wintrack_core::StopHandle::stop).
/// Only the first registration takes effect.
pub fn set_handler(callback: impl Fn() + Send + Sync + 'static) -> WindowResult<()> {
    if CALLBACK.set(Box::new(callback)).is_err() {
        return Err(Error::HookInstallFailed(
            "Ctrl+C handler already registered".into(),
        ));
    }
    // SAFETY: `handler` is a plain extern function that only reads CALLBACK.
    unsafe { SetConsoleCtrlHandler(Some(handler), true) }
        .map_err(|e| Error::HookInstallFailed(format!("SetConsoleCtrlHandler: {e}")))
}

unsafe extern "system" fn handler(ctrl_type: u32) -> BOOL {
    if (ctrl_type == CTRL_C_EVENT || ctrl_type == CTRL_BREAK_EVENT)
        && let Some(callback) = CALLBACK.get()
    {
        callback();
        return BOOL(1);
    }
    BOOL(0)
}
