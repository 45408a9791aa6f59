use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};

/// Declares this process as per-monitor DPI aware (V2).
///
/// Window rectangles are then reported in raw physical pixels on every
/// monitor instead of being scaled to the primary monitor's DPI.
/// Call once at startup, before any window query.
pub fn enable_dpi_awareness() {
    // SAFETY: SetProcessDpiAwarenessContext has no preconditions. It fails
    // harmlessly if awareness was already set (e.g. via manifest).
    if let Err(e) = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) } {
        tracing::debug!("DPI awareness not changed: {e}");
    }
}
