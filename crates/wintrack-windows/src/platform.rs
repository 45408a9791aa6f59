use std::iter;
use std::mem;

use windows::Win32::Foundation::{E_ACCESSDENIED, HWND, LPARAM, WPARAM};
use windows::Win32::Graphics::Dwm::{DWMWA_CLOAKED, DwmGetWindowAttribute};
use windows::Win32::UI::WindowsAndMessaging::{
    FindWindowExW, GA_PARENT, GW_OWNER, GWL_EXSTYLE, GWL_STYLE, GetAncestor, GetDesktopWindow,
    GetForegroundWindow, GetWindow, GetWindowLongPtrW, GetWindowTextLengthW, GetWindowTextW,
    GetWindowThreadProcessId, IsIconic, IsWindow, IsWindowVisible, IsZoomed, PostMessageW,
    RealGetWindowClassW, SET_WINDOW_POS_FLAGS, SHOW_WINDOW_CMD, SW_MAXIMIZE, SW_MINIMIZE,
    SW_RESTORE, SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOCOPYBITS, SWP_NOSENDCHANGING,
    SWP_NOZORDER, SetForegroundWindow, SetWindowPos, ShowWindow, WM_CLOSE, WS_CHILD,
    WS_EX_APPWINDOW, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW,
};
use windows::core::PCWSTR;
use wintrack_core::{
    Error, NotificationHook, Platform, Rect, ShowCommand, ShowState, StyleFlags, WindowHandle,
    WindowResult,
};

use crate::enumerate;
use crate::frame::Frame;
use crate::hook::WinEventHook;
use crate::process::{self, ImageNameError};

/// The Win32 windowing subsystem.
///
/// Stateless: every call goes straight to the OS. A handle that no
/// longer passes `IsWindow` yields [`Error::NotFound`], checked both
/// before and after each query so a window closing mid-read never
/// produces stale or empty data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32;

fn hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.raw() as *mut _)
}

fn is_window(handle: WindowHandle) -> bool {
    // SAFETY: IsWindow accepts any value and only reports validity.
    unsafe { IsWindow(Some(hwnd(handle))).as_bool() }
}

fn not_found(handle: WindowHandle) -> Error {
    Error::NotFound { handle }
}

/// Maps a failed OS call to `NotFound` if the window is gone, else `Os`.
fn os_error(handle: WindowHandle, e: windows::core::Error) -> Error {
    if !is_window(handle) {
        return not_found(handle);
    }
    Error::Os {
        handle,
        message: e.to_string(),
    }
}

/// Runs an infallible query, failing with `NotFound` if the handle is
/// invalid before or after it.
fn read<T>(handle: WindowHandle, query: impl FnOnce(HWND) -> T) -> WindowResult<T> {
    if !is_window(handle) {
        return Err(not_found(handle));
    }
    let value = query(hwnd(handle));
    if !is_window(handle) {
        return Err(not_found(handle));
    }
    Ok(value)
}

/// Like [`read`] for queries that report their own errors.
fn try_read<T>(
    handle: WindowHandle,
    query: impl FnOnce(HWND) -> windows::core::Result<T>,
) -> WindowResult<T> {
    read(handle, query)?.map_err(|e| os_error(handle, e))
}

/// Maps a failed action to `PermissionDenied` when the OS refused it.
fn refused(handle: WindowHandle, action: &'static str) -> impl FnOnce(windows::core::Error) -> Error {
    move |e| {
        if e.code() == E_ACCESSDENIED {
            Error::PermissionDenied { handle, action }
        } else {
            os_error(handle, e)
        }
    }
}

fn optional(value: HWND) -> Option<WindowHandle> {
    (!value.is_invalid()).then(|| WindowHandle(value.0 as usize))
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(iter::once(0)).collect()
}

/// Whether the window needs `SWP_FRAMECHANGED` to repaint after a
/// programmatic resize.
///
/// GPU-composited apps (Chromium, Electron, Firefox) only refresh their
/// surface when `WM_NCCALCSIZE` fires.
fn needs_frame_changed(class: &str) -> bool {
    class == "Chrome_WidgetWin_1" || class == "MozillaWindowClass"
}

impl Platform for Win32 {
    fn enumerate(&self) -> WindowResult<Vec<WindowHandle>> {
        enumerate::top_level_windows().map_err(|e| Error::Os {
            handle: WindowHandle(0),
            message: format!("EnumWindows: {e}"),
        })
    }

    fn exists(&self, handle: WindowHandle) -> bool {
        is_window(handle)
    }

    fn title(&self, handle: WindowHandle) -> WindowResult<String> {
        // SAFETY: both calls only read window text into our buffer.
        read(handle, |hwnd| unsafe {
            let length = GetWindowTextLengthW(hwnd);
            if length <= 0 {
                return String::new();
            }
            // +1 for the null terminator that Windows requires
            let mut buffer = vec![0u16; length as usize + 1];
            let copied = GetWindowTextW(hwnd, &mut buffer);
            String::from_utf16_lossy(&buffer[..copied.max(0) as usize])
        })
    }

    fn class_name(&self, handle: WindowHandle) -> WindowResult<String> {
        // SAFETY: 256 is the maximum class name length in Win32.
        read(handle, |hwnd| unsafe {
            let mut buffer = [0u16; 256];
            let length = RealGetWindowClassW(hwnd, &mut buffer);
            String::from_utf16_lossy(&buffer[..length as usize])
        })
    }

    fn process_id(&self, handle: WindowHandle) -> WindowResult<u32> {
        let mut pid = 0u32;
        // SAFETY: GetWindowThreadProcessId writes the pid into `pid`.
        read(handle, |hwnd| unsafe {
            GetWindowThreadProcessId(hwnd, Some(&mut pid));
        })?;
        if pid == 0 {
            return Err(not_found(handle));
        }
        Ok(pid)
    }

    fn process_name(&self, handle: WindowHandle) -> WindowResult<String> {
        let pid = self.process_id(handle)?;
        match process::image_name(pid) {
            Ok(name) => Ok(name),
            Err(ImageNameError::AccessDenied) => Err(Error::PermissionDenied {
                handle,
                action: "query process of",
            }),
            Err(ImageNameError::Query(e)) => Err(os_error(handle, e)),
        }
    }

    fn rect(&self, handle: WindowHandle) -> WindowResult<Rect> {
        Ok(try_read(handle, Frame::read)?.visible())
    }

    fn is_visible(&self, handle: WindowHandle) -> WindowResult<bool> {
        // SAFETY: IsWindowVisible is a simple query.
        read(handle, |hwnd| unsafe { IsWindowVisible(hwnd).as_bool() })
    }

    fn is_cloaked(&self, handle: WindowHandle) -> WindowResult<bool> {
        let mut cloaked = 0u32;
        // SAFETY: DWMWA_CLOAKED writes a u32 into `cloaked`.
        let result = read(handle, |hwnd| unsafe {
            DwmGetWindowAttribute(
                hwnd,
                DWMWA_CLOAKED,
                &mut cloaked as *mut u32 as *mut _,
                mem::size_of::<u32>() as u32,
            )
        })?;
        // DWM unavailable: nothing can be cloaked.
        Ok(result.is_ok() && cloaked != 0)
    }

    fn styles(&self, handle: WindowHandle) -> WindowResult<StyleFlags> {
        // SAFETY: GetWindowLongPtrW only reads window styles.
        let (style, ex_style) = read(handle, |hwnd| unsafe {
            (
                GetWindowLongPtrW(hwnd, GWL_STYLE) as u32,
                GetWindowLongPtrW(hwnd, GWL_EXSTYLE) as u32,
            )
        })?;
        let has = |bits: u32, flag: u32| bits & flag == flag;
        Ok(StyleFlags {
            child: has(style, WS_CHILD.0),
            tool_window: has(ex_style, WS_EX_TOOLWINDOW.0),
            app_window: has(ex_style, WS_EX_APPWINDOW.0),
            no_activate: has(ex_style, WS_EX_NOACTIVATE.0),
        })
    }

    fn show_state(&self, handle: WindowHandle) -> WindowResult<ShowState> {
        // SAFETY: IsIconic and IsZoomed are simple queries.
        read(handle, |hwnd| unsafe {
            if IsIconic(hwnd).as_bool() {
                ShowState::Minimized
            } else if IsZoomed(hwnd).as_bool() {
                ShowState::Maximized
            } else {
                ShowState::Normal
            }
        })
    }

    fn parent(&self, handle: WindowHandle) -> WindowResult<Option<WindowHandle>> {
        // SAFETY: GetAncestor and GetDesktopWindow are simple queries.
        // Top-level windows report the desktop as their parent.
        read(handle, |hwnd| unsafe {
            let parent = GetAncestor(hwnd, GA_PARENT);
            if parent == GetDesktopWindow() {
                None
            } else {
                optional(parent)
            }
        })
    }

    fn owner(&self, handle: WindowHandle) -> WindowResult<Option<WindowHandle>> {
        // SAFETY: GetWindow(GW_OWNER) is a simple query; an error means no owner.
        read(handle, |hwnd| unsafe {
            GetWindow(hwnd, GW_OWNER).ok().and_then(optional)
        })
    }

    fn has_child_with_class(&self, handle: WindowHandle, class: &str) -> WindowResult<bool> {
        let class = wide(class);
        // SAFETY: `class` is a null-terminated UTF-16 string that
        // outlives the call.
        read(handle, |hwnd| unsafe {
            FindWindowExW(Some(hwnd), None, PCWSTR(class.as_ptr()), PCWSTR::null()).is_ok()
        })
    }

    fn foreground(&self) -> Option<WindowHandle> {
        // SAFETY: GetForegroundWindow has no preconditions.
        optional(unsafe { GetForegroundWindow() })
    }

    fn set_foreground(&self, handle: WindowHandle) -> WindowResult<()> {
        // SAFETY: SetForegroundWindow is safe to call with any HWND.
        let granted = read(handle, |hwnd| unsafe { SetForegroundWindow(hwnd).as_bool() })?;
        if !granted {
            return Err(Error::PermissionDenied {
                handle,
                action: "focus",
            });
        }
        Ok(())
    }

    fn show(&self, handle: WindowHandle, command: ShowCommand) -> WindowResult<()> {
        let cmd: SHOW_WINDOW_CMD = match command {
            ShowCommand::Minimize => SW_MINIMIZE,
            ShowCommand::Maximize => SW_MAXIMIZE,
            ShowCommand::Restore => SW_RESTORE,
        };
        // SAFETY: ShowWindow's return value is the previous visibility,
        // not an error indicator.
        read(handle, |hwnd| unsafe {
            let _ = ShowWindow(hwnd, cmd);
        })
    }

    fn close(&self, handle: WindowHandle) -> WindowResult<()> {
        // SAFETY: WM_CLOSE lets the window handle its own shutdown.
        read(handle, |hwnd| unsafe {
            PostMessageW(Some(hwnd), WM_CLOSE, WPARAM(0), LPARAM(0))
        })?
        .map_err(refused(handle, "close"))
    }

    fn set_rect(&self, handle: WindowHandle, rect: &Rect) -> WindowResult<()> {
        let class = self.class_name(handle)?;
        let outer = try_read(handle, Frame::read)?.outer_for(rect);

        // SWP_NOSENDCHANGING keeps the window from rewriting the requested
        // size; SWP_NOCOPYBITS discards stale client contents.
        let mut flags: SET_WINDOW_POS_FLAGS =
            SWP_NOZORDER | SWP_NOACTIVATE | SWP_NOSENDCHANGING | SWP_NOCOPYBITS;
        if needs_frame_changed(&class) {
            flags |= SWP_FRAMECHANGED;
        }

        tracing::debug!("set_rect {handle}: visible {rect}, outer {outer}");

        // SAFETY: SetWindowPos with a validated HWND.
        read(handle, |hwnd| unsafe {
            SetWindowPos(hwnd, None, outer.x, outer.y, outer.width, outer.height, flags)
        })?
        .map_err(refused(handle, "move"))
    }

    fn install_hook(&self) -> WindowResult<Box<dyn NotificationHook>> {
        Ok(Box::new(WinEventHook::install()?))
    }
}
