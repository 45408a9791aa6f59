use std::fmt;

use crate::window::WindowHandle;

/// A tracked window and the only state cached about it.
///
/// `title` and `minimized` are kept solely to detect deltas between
/// notifications; they are never served as current values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedWindow {
    handle: WindowHandle,
    pub(crate) title: String,
    pub(crate) minimized: bool,
}

impl TrackedWindow {
    pub fn new(handle: WindowHandle, title: String, minimized: bool) -> Self {
        Self {
            handle,
            title,
            minimized,
        }
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// The title as of the last notification that touched this window.
    pub fn last_title(&self) -> &str {
        &self.title
    }

    /// The minimized state as of the last state-change notification.
    pub fn was_minimized(&self) -> bool {
        self.minimized
    }
}

impl fmt::Display for TrackedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:?}", self.handle, self.title)
    }
}

/// The set of tracked windows plus the current focus holder.
///
/// Each handle appears at most once. Windows keep insertion order.
#[derive(Debug, Default)]
pub struct Tracker {
    windows: Vec<TrackedWindow>,
    focused: Option<WindowHandle>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a window.
    ///
    /// Returns `false` if the handle is already tracked.
    pub fn add(&mut self, window: TrackedWindow) -> bool {
        if self.contains(window.handle) {
            return false;
        }
        self.windows.push(window);
        true
    }

    /// Removes a window, clearing the focus holder if it was focused.
    pub fn remove(&mut self, handle: WindowHandle) -> Option<TrackedWindow> {
        let pos = self.windows.iter().position(|w| w.handle == handle)?;
        if self.focused == Some(handle) {
            self.focused = None;
        }
        Some(self.windows.remove(pos))
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.windows.iter().any(|w| w.handle == handle)
    }

    pub fn get(&self, handle: WindowHandle) -> Option<&TrackedWindow> {
        self.windows.iter().find(|w| w.handle == handle)
    }

    pub(crate) fn get_mut(&mut self, handle: WindowHandle) -> Option<&mut TrackedWindow> {
        self.windows.iter_mut().find(|w| w.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackedWindow> {
        self.windows.iter()
    }

    pub fn handles(&self) -> Vec<WindowHandle> {
        self.windows.iter().map(|w| w.handle).collect()
    }

    pub fn focused(&self) -> Option<WindowHandle> {
        self.focused
    }

    /// Records `handle` as the focus holder.
    ///
    /// Returns `true` if the holder changed. Untracked handles are ignored.
    pub fn set_focus(&mut self, handle: WindowHandle) -> bool {
        if self.focused == Some(handle) || !self.contains(handle) {
            return false;
        }
        self.focused = Some(handle);
        true
    }

    pub fn clear(&mut self) {
        self.windows.clear();
        self.focused = None;
    }
}
