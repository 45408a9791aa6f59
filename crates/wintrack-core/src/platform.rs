//! The OS windowing capabilities the core depends on.
//!
//! Each platform crate (e.g. `wintrack-windows`) provides one
//! implementation of [`Platform`]. Everything above this trait is
//! platform-agnostic and can be driven by an in-memory fake in tests.

use std::fmt;
use std::sync::Arc;

use crate::window::{ShowCommand, ShowState, StyleFlags, WindowHandle};
use crate::{Rect, WindowResult};

/// A raw window life-cycle notification kind, as delivered by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// The window became visible.
    Shown,
    /// The window became invisible.
    Hidden,
    /// The window was destroyed.
    Destroyed,
    /// The foreground window changed.
    Foreground,
    /// Keyboard focus moved to the window.
    Focus,
    /// Minimize started or ended.
    StateChanged,
    /// The window moved or was resized.
    LocationChanged,
    /// The window title changed.
    NameChanged,
}

impl NotificationKind {
    /// Notifications after which the handle must leave the tracked set.
    pub fn is_removal(self) -> bool {
        matches!(self, Self::Hidden | Self::Destroyed)
    }

    /// Notifications that indicate a focus transition.
    pub fn is_focus(self) -> bool {
        matches!(self, Self::Foreground | Self::Focus)
    }
}

/// A `(kind, handle)` tuple in OS delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub handle: WindowHandle,
}

impl Notification {
    pub fn new(kind: NotificationKind, handle: WindowHandle) -> Self {
        Self { kind, handle }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.kind, self.handle)
    }
}

/// Interrupts a blocked [`NotificationHook::pump`] from any thread.
pub trait Waker: Send + Sync {
    fn wake(&self);
}

/// An installed OS notification subscription.
///
/// Dropping the hook uninstalls the subscription.
pub trait NotificationHook {
    /// Blocks the calling thread, forwarding each notification to `sink`
    /// in OS delivery order, until the waker fires.
    ///
    /// `sink` is never invoked re-entrantly.
    fn pump(&mut self, sink: &mut dyn FnMut(Notification));

    /// Returns the wake primitive for this hook's blocking wait.
    fn waker(&self) -> Arc<dyn Waker>;
}

/// Synchronous access to the OS windowing subsystem.
///
/// Every per-handle method fails with
/// [`Error::NotFound`](crate::Error::NotFound) once the handle no longer
/// resolves. Implementations must not cache.
pub trait Platform: Send + Sync {
    /// Lists every top-level window, in OS z-order.
    fn enumerate(&self) -> WindowResult<Vec<WindowHandle>>;

    /// Returns whether the handle still resolves.
    fn exists(&self, handle: WindowHandle) -> bool;

    fn title(&self, handle: WindowHandle) -> WindowResult<String>;

    fn class_name(&self, handle: WindowHandle) -> WindowResult<String>;

    fn process_id(&self, handle: WindowHandle) -> WindowResult<u32>;

    /// Returns the executable file name of the owning process.
    ///
    /// Fails with `PermissionDenied` when the process cannot be opened.
    fn process_name(&self, handle: WindowHandle) -> WindowResult<String>;

    fn rect(&self, handle: WindowHandle) -> WindowResult<Rect>;

    fn is_visible(&self, handle: WindowHandle) -> WindowResult<bool>;

    fn is_cloaked(&self, handle: WindowHandle) -> WindowResult<bool>;

    fn styles(&self, handle: WindowHandle) -> WindowResult<StyleFlags>;

    fn show_state(&self, handle: WindowHandle) -> WindowResult<ShowState>;

    fn parent(&self, handle: WindowHandle) -> WindowResult<Option<WindowHandle>>;

    fn owner(&self, handle: WindowHandle) -> WindowResult<Option<WindowHandle>>;

    /// Returns whether the window has a direct child of the given class.
    fn has_child_with_class(&self, handle: WindowHandle, class: &str) -> WindowResult<bool>;

    /// Returns the current foreground window, if any.
    fn foreground(&self) -> Option<WindowHandle>;

    fn set_foreground(&self, handle: WindowHandle) -> WindowResult<()>;

    fn show(&self, handle: WindowHandle, command: ShowCommand) -> WindowResult<()>;

    fn close(&self, handle: WindowHandle) -> WindowResult<()>;

    fn set_rect(&self, handle: WindowHandle, rect: &Rect) -> WindowResult<()>;

    /// Installs the life-cycle notification subscription on the calling thread.
    ///
    /// Fails with `HookInstallFailed`; on failure nothing stays installed.
    fn install_hook(&self) -> WindowResult<Box<dyn NotificationHook>>;
}
