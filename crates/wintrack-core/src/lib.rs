pub mod config;
pub mod enumerate;
pub mod error;
pub mod event;
pub mod filter;
pub mod manager;
pub mod platform;
pub mod rect;
pub mod subscribers;
pub mod tracker;
pub mod window;

#[cfg(test)]
mod fake;

pub use config::{Config, ManagerOptions};
pub use error::{Error, WindowResult};
pub use event::{Event, EventKind, Topic};
pub use filter::{Filter, Verdict};
pub use manager::{Context, Manager, ManagerState, StopHandle};
pub use platform::{Notification, NotificationHook, NotificationKind, Platform, Waker};
pub use rect::Rect;
pub use subscribers::{CallbackResult, SubscriptionId};
pub use tracker::TrackedWindow;
pub use window::{ShowCommand, ShowState, StyleFlags, Window, WindowHandle, WindowInfo, WindowState};
