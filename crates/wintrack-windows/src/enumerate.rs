use windows::Win32::Foundation::{HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::EnumWindows;
use windows::core::BOOL;
use wintrack_core::WindowHandle;

/// Lists every top-level window handle, in z-order.
///
/// No filtering happens here; deciding what is manageable is the
/// filter's job.
pub fn top_level_windows() -> windows::core::Result<Vec<WindowHandle>> {
    let mut handles: Vec<WindowHandle> = Vec::new();

    // SAFETY: EnumWindows runs synchronously and invokes the callback
    // for each top-level window. The Vec pointer passed as LPARAM
    // outlives the call.
    unsafe {
        EnumWindows(
            Some(enum_window_callback),
            LPARAM(&mut handles as *mut _ as isize),
        )?;
    }

    Ok(handles)
}

/// Callback invoked by `EnumWindows` for each top-level window.
///
/// Win32 cannot call Rust closures, so the output Vec travels through
/// the `LPARAM` user-data pointer.
unsafe extern "system" fn enum_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the Vec pointer passed by top_level_windows().
    let handles = unsafe { &mut *(lparam.0 as *mut Vec<WindowHandle>) };
    handles.push(WindowHandle(hwnd.0 as usize));
    BOOL(1) // TRUE: continue enumerating
}
