use std::fmt;

use serde::Serialize;

use crate::window::Window;

/// A higher-level window event republished to subscribers.
///
/// Platform notifications are classified into this fixed vocabulary
/// by the [`Manager`](crate::Manager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A window became manageable and is now tracked.
    WindowAdded,
    /// A tracked window was destroyed, hidden, or stopped being manageable.
    WindowRemoved,
    /// A different tracked window received focus.
    FocusChanged,
    /// A tracked window was minimized.
    WindowMinimized,
    /// A tracked window left the minimized state.
    WindowRestored,
    /// A tracked window was moved or resized. Re-query the rect.
    WindowMoved,
    /// A tracked window's title changed.
    TitleChanged,
}

impl EventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::WindowAdded,
        Self::WindowRemoved,
        Self::FocusChanged,
        Self::WindowMinimized,
        Self::WindowRestored,
        Self::WindowMoved,
        Self::TitleChanged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WindowAdded => "window_added",
            Self::WindowRemoved => "window_removed",
            Self::FocusChanged => "focus_changed",
            Self::WindowMinimized => "window_minimized",
            Self::WindowRestored => "window_restored",
            Self::WindowMoved => "window_moved",
            Self::TitleChanged => "title_changed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a subscription listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// A single event kind.
    Kind(EventKind),
    /// Every event kind. Wildcard subscribers run after specific ones.
    All,
}

impl From<EventKind> for Topic {
    fn from(kind: EventKind) -> Self {
        Self::Kind(kind)
    }
}

/// An event delivered to subscribers.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    /// The affected window. Reads are live and may fail with `NotFound`,
    /// e.g. for `WindowRemoved` after a destroy.
    pub window: Window,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.window.handle())
    }
}
