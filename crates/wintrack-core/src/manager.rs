//! The event core: seeds, tracks, diffs and republishes window state.

mod event_handler;
mod lifecycle;

use std::fmt::Write as _;
use std::sync::Arc;

pub use lifecycle::{ManagerState, StopHandle};

use crate::config::ManagerOptions;
use crate::enumerate;
use crate::event::{Event, Topic};
use crate::filter::Filter;
use crate::platform::Platform;
use crate::subscribers::{CallbackResult, Subscribers, SubscriptionId};
use crate::tracker::{TrackedWindow, Tracker};
use crate::window::{Window, WindowHandle};
use crate::WindowResult;

/// Owns the tracked set and the subscriber table, and runs the blocking
/// notification loop on the thread that calls [`Manager::start`].
///
/// All classification and dispatch happen serially on that thread. The
/// only cross-thread operation is stopping, through a [`StopHandle`].
pub struct Manager {
    platform: Arc<dyn Platform>,
    filter: Filter,
    options: ManagerOptions,
    tracker: Tracker,
    subscribers: Subscribers,
    lifecycle: StopHandle,
}

impl Manager {
    pub fn new(platform: Arc<dyn Platform>, filter: Filter) -> Self {
        Self::with_options(platform, filter, ManagerOptions::default())
    }

    pub fn with_options(
        platform: Arc<dyn Platform>,
        filter: Filter,
        options: ManagerOptions,
    ) -> Self {
        Self {
            platform,
            filter,
            options,
            tracker: Tracker::new(),
            subscribers: Subscribers::default(),
            lifecycle: StopHandle::new(),
        }
    }

    /// Registers a callback for one event kind or for [`Topic::All`].
    ///
    /// Callbacks for the same topic run in registration order. Wildcard
    /// callbacks run after every kind-specific one.
    pub fn subscribe<F>(&mut self, topic: impl Into<Topic>, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event, &Context<'_>) -> CallbackResult + 'static,
    {
        self.subscribers.add(topic.into(), Box::new(callback))
    }

    /// Returns `false` if the subscription was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Seeds the tracked set, installs the OS subscription and blocks the
    /// calling thread until [`stop`](Self::stop) is requested.
    ///
    /// Fails with `InvalidState` unless stopped, and with
    /// `HookInstallFailed` if the subscription cannot be installed; in
    /// both cases the manager is left `stopped`.
    pub fn start(&mut self) -> WindowResult<()> {
        self.lifecycle.begin_start()?;
        tracing::info!("starting window manager");

        self.seed();

        let mut hook = match self.platform.install_hook() {
            Ok(hook) => hook,
            Err(e) => {
                tracing::error!("failed to install notification hook: {e}");
                self.tracker.clear();
                self.lifecycle.finish();
                return Err(e);
            }
        };
        tracing::info!("notification hook installed");

        if self.lifecycle.enter_running(hook.waker()) {
            tracing::info!("tracking {} windows", self.tracker.len());
            hook.pump(&mut |notification| self.on_notification(notification));
        }

        drop(hook);
        self.lifecycle.finish();
        tracing::info!("window manager stopped");
        Ok(())
    }

    /// Requests the loop to exit. No-op unless starting or running.
    pub fn stop(&self) {
        self.lifecycle.stop();
    }

    /// Returns a handle that can stop this manager from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.lifecycle.clone()
    }

    pub fn state(&self) -> ManagerState {
        self.lifecycle.state()
    }

    /// Stateless enumeration: the currently manageable windows, sorted
    /// by title. Installs nothing and does not touch the tracked set.
    pub fn list_windows(&self) -> WindowResult<Vec<Window>> {
        enumerate::list_windows(&self.platform, &self.filter)
    }

    /// The tracked windows, in insertion order.
    pub fn windows(&self) -> impl Iterator<Item = &TrackedWindow> {
        self.tracker.iter()
    }

    pub fn get(&self, handle: WindowHandle) -> Option<&TrackedWindow> {
        self.tracker.get(handle)
    }

    pub fn focused(&self) -> Option<WindowHandle> {
        self.tracker.focused()
    }

    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Returns a live [`Window`] for any handle.
    pub fn window(&self, handle: WindowHandle) -> Window {
        Window::new(handle, self.platform.clone())
    }

    /// A human-readable summary of the tracked set.
    pub fn dump_state(&self) -> String {
        let mut out = format!(
            "state: {}, tracked: {}, focused: {}\n",
            self.state(),
            self.tracker.len(),
            self.tracker
                .focused()
                .map_or_else(|| "none".to_string(), |h| h.to_string()),
        );
        for tracked in self.tracker.iter() {
            let marker = if self.tracker.focused() == Some(tracked.handle()) {
                '*'
            } else {
                ' '
            };
            let minimized = if tracked.was_minimized() {
                " (minimized)"
            } else {
                ""
            };
            let _ = writeln!(out, "{marker} {tracked}{minimized}");
        }
        out
    }

    /// Baseline enumeration. Fires `WINDOW_ADDED` only when
    /// `announce_initial` is set.
    fn seed(&mut self) {
        self.tracker.clear();
        let windows = match self.list_windows() {
            Ok(windows) => windows,
            Err(e) => {
                tracing::warn!("initial enumeration failed: {e}");
                Vec::new()
            }
        };
        for window in windows {
            if self.lifecycle.is_stop_requested() {
                tracing::debug!("stop requested while seeding");
                break;
            }
            if self.options.announce_initial {
                self.track(&window);
            } else if let Some(tracked) = snapshot(&window) {
                self.tracker.add(tracked);
            }
        }
        if let Some(foreground) = self.platform.foreground() {
            self.tracker.set_focus(foreground);
        }
        tracing::debug!("seeded {} windows", self.tracker.len());
    }
}

/// Reads the fields cached for delta detection.
fn snapshot(window: &Window) -> Option<TrackedWindow> {
    let title = window.title().ok()?;
    let minimized = window.is_minimized().ok()?;
    Some(TrackedWindow::new(window.handle(), title, minimized))
}

/// The manager as seen from inside a subscriber callback.
///
/// Read-only access to the tracked set, plus [`stop`](Self::stop).
pub struct Context<'a> {
    platform: &'a Arc<dyn Platform>,
    tracker: &'a Tracker,
    lifecycle: &'a StopHandle,
}

impl Context<'_> {
    pub fn windows(&self) -> Vec<Window> {
        self.tracker
            .iter()
            .map(|t| self.window(t.handle()))
            .collect()
    }

    pub fn get(&self, handle: WindowHandle) -> Option<&TrackedWindow> {
        self.tracker.get(handle)
    }

    pub fn is_tracked(&self, handle: WindowHandle) -> bool {
        self.tracker.contains(handle)
    }

    pub fn focused(&self) -> Option<Window> {
        self.tracker.focused().map(|h| self.window(h))
    }

    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    pub fn window(&self, handle: WindowHandle) -> Window {
        Window::new(handle, self.platform.clone())
    }

    /// Stops the loop once the current dispatch returns.
    pub fn stop(&self) {
        self.lifecycle.stop();
    }
}

#[cfg(test)]
mod tests;
