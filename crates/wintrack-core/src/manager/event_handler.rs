use crate::event::{Event, EventKind};
use crate::filter::Verdict;
use crate::platform::{Notification, NotificationKind};
use crate::window::Window;
use crate::WindowResult;

use super::{Context, Manager, ManagerState, snapshot};

impl Manager {
    /// Classifies one raw notification, updates the tracked set and
    /// dispatches the resulting events.
    ///
    /// Total: query failures become an implicit removal.
    pub(super) fn on_notification(&mut self, notification: Notification) {
        if self.lifecycle.state() != ManagerState::Running {
            tracing::trace!("dropping {notification}: not running");
            return;
        }
        tracing::debug!("notification: {notification}");

        let handle = notification.handle;
        let window = self.window(handle);

        if notification.kind.is_removal() {
            if self.tracker.contains(handle) {
                self.untrack(&window);
            }
            return;
        }

        let added = match self.filter.evaluate(&window) {
            Verdict::Manageable if self.tracker.contains(handle) => false,
            Verdict::Manageable => {
                if !self.track(&window) {
                    return;
                }
                true
            }
            Verdict::Rejected(rejection) => {
                if self.tracker.contains(handle) {
                    tracing::debug!("{handle} no longer manageable: {rejection}");
                    self.untrack(&window);
                }
                return;
            }
        };

        let result = match notification.kind {
            NotificationKind::Foreground | NotificationKind::Focus => {
                self.on_focus(&window);
                Ok(())
            }
            NotificationKind::StateChanged => self.on_state_change(&window, added),
            NotificationKind::LocationChanged => {
                self.emit(EventKind::WindowMoved, &window);
                Ok(())
            }
            NotificationKind::NameChanged => self.on_title_change(&window),
            NotificationKind::Shown
            | NotificationKind::Hidden
            | NotificationKind::Destroyed => Ok(()),
        };

        if let Err(e) = result {
            tracing::warn!("{handle} vanished while handling {notification}: {e}");
            self.untrack(&window);
        }
    }

    /// Adds the window and fires `WINDOW_ADDED`.
    ///
    /// Returns `false` if it was already tracked or vanished meanwhile.
    pub(super) fn track(&mut self, window: &Window) -> bool {
        let Some(tracked) = snapshot(window) else {
            tracing::warn!("{} vanished before it could be tracked", window.handle());
            return false;
        };
        let title = tracked.last_title().to_string();
        if !self.tracker.add(tracked) {
            return false;
        }
        tracing::info!("managing [{}] {title:?}", window.handle());
        self.emit(EventKind::WindowAdded, window);
        true
    }

    /// Removes the window and fires `WINDOW_REMOVED` if it was tracked.
    pub(super) fn untrack(&mut self, window: &Window) {
        if let Some(tracked) = self.tracker.remove(window.handle()) {
            tracing::info!("unmanaging {tracked}");
            self.emit(EventKind::WindowRemoved, window);
        }
    }

    fn on_focus(&mut self, window: &Window) {
        if self.tracker.set_focus(window.handle()) {
            self.emit(EventKind::FocusChanged, window);
        } else {
            tracing::trace!("focus unchanged: {}", window.handle());
        }
    }

    /// A window first seen through a state change that is not minimized
    /// has just been restored, so it fires `WINDOW_RESTORED` after
    /// `WINDOW_ADDED`.
    fn on_state_change(&mut self, window: &Window, added: bool) -> WindowResult<()> {
        let minimized = window.is_minimized()?;
        let Some(tracked) = self.tracker.get_mut(window.handle()) else {
            return Ok(());
        };
        let restored_on_add = added && !minimized;
        if tracked.minimized == minimized && !restored_on_add {
            return Ok(());
        }
        tracked.minimized = minimized;
        let kind = if minimized {
            EventKind::WindowMinimized
        } else {
            EventKind::WindowRestored
        };
        self.emit(kind, window);
        Ok(())
    }

    fn on_title_change(&mut self, window: &Window) -> WindowResult<()> {
        let title = window.title()?;
        let Some(tracked) = self.tracker.get_mut(window.handle()) else {
            return Ok(());
        };
        if tracked.title == title {
            tracing::trace!("title unchanged: {}", window.handle());
            return Ok(());
        }
        tracked.title = title;
        self.emit(EventKind::TitleChanged, window);
        Ok(())
    }

    fn emit(&mut self, kind: EventKind, window: &Window) {
        if self.lifecycle.is_stop_requested() {
            tracing::trace!("suppressing {kind} for {}: stop requested", window.handle());
            return;
        }
        let event = Event {
            kind,
            window: window.clone(),
        };
        let ctx = Context {
            platform: &self.platform,
            tracker: &self.tracker,
            lifecycle: &self.lifecycle,
        };
        self.subscribers.dispatch(&event, &ctx);
    }
}
