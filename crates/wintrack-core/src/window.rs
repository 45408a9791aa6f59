use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::platform::Platform;
use crate::{Error, Rect, WindowResult};

/// An opaque, OS-assigned window identifier.
///
/// Equality is by value. On Windows this is the numeric value of the
/// `HWND`; other backends may use any pointer-sized id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WindowHandle(pub usize);

impl WindowHandle {
    /// Returns the raw handle value.
    pub fn raw(self) -> usize {
        self.0
    }

    /// Parses a handle from decimal or `0x`-prefixed hex.
    pub fn parse(s: &str) -> Option<Self> {
        let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => usize::from_str_radix(hex, 16).ok()?,
            None => s.parse().ok()?,
        };
        Some(Self(value))
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Style bits relevant to deciding whether a window is manageable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleFlags {
    /// `WS_CHILD`: the window is embedded in another window.
    pub child: bool,
    /// `WS_EX_TOOLWINDOW`: floating palette, hidden from Alt+Tab.
    pub tool_window: bool,
    /// `WS_EX_APPWINDOW`: forces a taskbar entry even for tool windows.
    pub app_window: bool,
    /// `WS_EX_NOACTIVATE`: the window can never become the foreground window.
    pub no_activate: bool,
}

impl StyleFlags {
    /// Whether the OS lets this window become the active window.
    pub fn can_activate(&self) -> bool {
        !self.no_activate
    }
}

/// The show state reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowState {
    Normal,
    Minimized,
    Maximized,
}

/// A show command issued to the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowCommand {
    Minimize,
    Maximize,
    Restore,
}

/// The observable state of a window, combining visibility and show state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    /// Invisible or cloaked.
    Hidden,
    Minimized,
    Maximized,
    Normal,
}

impl fmt::Display for WindowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hidden => "hidden",
            Self::Minimized => "minimized",
            Self::Maximized => "maximized",
            Self::Normal => "normal",
        };
        f.write_str(s)
    }
}

/// A one-shot read of every property of a window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    pub title: String,
    pub class_name: String,
    pub pid: u32,
    pub process_name: String,
    pub rect: Rect,
    pub state: WindowState,
}

/// A live accessor over an OS window handle.
///
/// Holds only the handle and the platform used to query it. Every
/// property read goes to the OS and every action is issued directly;
/// nothing is cached, so a destroyed window surfaces as
/// [`Error::NotFound`] instead of stale data.
#[derive(Clone)]
pub struct Window {
    handle: WindowHandle,
    platform: Arc<dyn Platform>,
}

impl Window {
    /// Creates a new `Window` for `handle` on the given platform.
    pub fn new(handle: WindowHandle, platform: Arc<dyn Platform>) -> Self {
        Self { handle, platform }
    }

    /// Returns the identity handle.
    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// Returns whether the OS window still exists.
    pub fn exists(&self) -> bool {
        self.platform.exists(self.handle)
    }

    pub fn title(&self) -> WindowResult<String> {
        self.platform.title(self.handle)
    }

    pub fn class_name(&self) -> WindowResult<String> {
        self.platform.class_name(self.handle)
    }

    pub fn process_id(&self) -> WindowResult<u32> {
        self.platform.process_id(self.handle)
    }

    /// Returns the executable name of the owning process (e.g. `notepad.exe`).
    pub fn process_name(&self) -> WindowResult<String> {
        self.platform.process_name(self.handle)
    }

    pub fn rect(&self) -> WindowResult<Rect> {
        self.platform.rect(self.handle)
    }

    pub fn is_visible(&self) -> WindowResult<bool> {
        self.platform.is_visible(self.handle)
    }

    /// Returns whether the compositor hides this window despite it being "visible".
    pub fn is_cloaked(&self) -> WindowResult<bool> {
        self.platform.is_cloaked(self.handle)
    }

    pub fn styles(&self) -> WindowResult<StyleFlags> {
        self.platform.styles(self.handle)
    }

    pub fn show_state(&self) -> WindowResult<ShowState> {
        self.platform.show_state(self.handle)
    }

    pub fn is_minimized(&self) -> WindowResult<bool> {
        Ok(self.show_state()? == ShowState::Minimized)
    }

    pub fn is_maximized(&self) -> WindowResult<bool> {
        Ok(self.show_state()? == ShowState::Maximized)
    }

    /// Returns the parent window, if this is not a top-level window.
    pub fn parent(&self) -> WindowResult<Option<WindowHandle>> {
        self.platform.parent(self.handle)
    }

    /// Returns the owning top-level window (dialogs, property sheets).
    pub fn owner(&self) -> WindowResult<Option<WindowHandle>> {
        self.platform.owner(self.handle)
    }

    /// Returns whether the window hosts a direct child of the given class.
    pub fn has_child_with_class(&self, class: &str) -> WindowResult<bool> {
        self.platform.has_child_with_class(self.handle, class)
    }

    /// Derives the observable state from visibility, cloaking, and show state.
    pub fn state(&self) -> WindowResult<WindowState> {
        if !self.is_visible()? || self.is_cloaked()? {
            return Ok(WindowState::Hidden);
        }
        Ok(match self.show_state()? {
            ShowState::Minimized => WindowState::Minimized,
            ShowState::Maximized => WindowState::Maximized,
            ShowState::Normal => WindowState::Normal,
        })
    }

    /// Returns whether this window is the current foreground window.
    pub fn is_focused(&self) -> WindowResult<bool> {
        if !self.exists() {
            return Err(Error::NotFound {
                handle: self.handle,
            });
        }
        Ok(self.platform.foreground() == Some(self.handle))
    }

    /// Brings the window to the foreground, restoring it first if minimized.
    pub fn focus(&self) -> WindowResult<()> {
        if self.is_minimized()? {
            self.platform.show(self.handle, ShowCommand::Restore)?;
        }
        self.platform.set_foreground(self.handle)
    }

    pub fn minimize(&self) -> WindowResult<()> {
        self.platform.show(self.handle, ShowCommand::Minimize)
    }

    pub fn maximize(&self) -> WindowResult<()> {
        self.platform.show(self.handle, ShowCommand::Maximize)
    }

    pub fn restore(&self) -> WindowResult<()> {
        self.platform.show(self.handle, ShowCommand::Restore)
    }

    /// Requests a graceful close. The application may still refuse.
    pub fn close(&self) -> WindowResult<()> {
        self.platform.close(self.handle)
    }

    /// Moves and resizes the window to `rect`.
    pub fn move_resize(&self, rect: &Rect) -> WindowResult<()> {
        self.platform.set_rect(self.handle, rect)
    }

    /// Reads every property once.
    pub fn snapshot(&self) -> WindowResult<WindowInfo> {
        Ok(WindowInfo {
            handle: self.handle,
            title: self.title()?,
            class_name: self.class_name()?,
            pid: self.process_id()?,
            process_name: match self.process_name() {
                Err(Error::PermissionDenied { .. }) => String::new(),
                other => other?,
            },
            rect: self.rect()?,
            state: self.state()?,
        })
    }
}

impl PartialEq for Window {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Window {}

impl std::hash::Hash for Window {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window").field("handle", &self.handle).finish()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.title() {
            Ok(title) => write!(f, "[{}] {title:?}", self.handle),
            Err(_) => write!(f, "[{}] <destroyed>", self.handle),
        }
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
