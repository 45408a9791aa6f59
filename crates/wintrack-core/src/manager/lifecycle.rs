//! Manager lifecycle state and the cross-thread stop signal.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::platform::Waker;
use crate::{Error, WindowResult};

/// Lifecycle states of a [`Manager`](crate::Manager).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl ManagerState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Shared {
    state: ManagerState,
    waker: Option<Arc<dyn Waker>>,
    stop_requested: bool,
}

/// Stops a running manager from any thread.
///
/// Cheap to clone. Stopping wakes the loop's blocking wait through the
/// platform's wake primitive; the loop thread then uninstalls the
/// subscription and returns from `start()`.
#[derive(Clone)]
pub struct StopHandle {
    shared: Arc<Mutex<Shared>>,
}

impl StopHandle {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state: ManagerState::Stopped,
                waker: None,
                stop_requested: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Requests the loop to exit. No-op unless starting or running.
    pub fn stop(&self) {
        let mut shared = self.lock();
        match shared.state {
            ManagerState::Running => {
                shared.state = ManagerState::Stopping;
                if let Some(waker) = &shared.waker {
                    waker.wake();
                }
                tracing::info!("stop requested");
            }
            ManagerState::Starting => shared.stop_requested = true,
            ManagerState::Stopping | ManagerState::Stopped => {}
        }
    }

    pub fn state(&self) -> ManagerState {
        self.lock().state
    }

    /// Whether a stop has been requested for the current run, including
    /// one deferred while starting.
    pub fn is_stop_requested(&self) -> bool {
        let shared = self.lock();
        shared.stop_requested || shared.state == ManagerState::Stopping
    }

    /// `stopped` -> `starting`.
    pub(crate) fn begin_start(&self) -> WindowResult<()> {
        let mut shared = self.lock();
        if shared.state != ManagerState::Stopped {
            return Err(Error::InvalidState {
                operation: "start",
                state: shared.state.as_str(),
            });
        }
        shared.state = ManagerState::Starting;
        shared.stop_requested = false;
        Ok(())
    }

    /// `starting` -> `running`, arming the waker.
    ///
    /// Returns `false` (and moves to `stopping`) if a stop arrived
    /// while starting.
    pub(crate) fn enter_running(&self, waker: Arc<dyn Waker>) -> bool {
        let mut shared = self.lock();
        if shared.stop_requested {
            shared.state = ManagerState::Stopping;
            return false;
        }
        shared.state = ManagerState::Running;
        shared.waker = Some(waker);
        true
    }

    /// Any state -> `stopped`.
    pub(crate) fn finish(&self) {
        let mut shared = self.lock();
        shared.state = ManagerState::Stopped;
        shared.waker = None;
        shared.stop_requested = false;
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle")
            .field("state", &self.state())
            .finish()
    }
}
