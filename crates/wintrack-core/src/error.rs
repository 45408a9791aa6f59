use thiserror::Error;

use crate::window::WindowHandle;

/// Result alias used by every window query and action.
pub type WindowResult<T> = Result<T, Error>;

/// Errors raised by window accessors, actions, and the manager lifecycle.
#[derive(Debug, Error)]
pub enum Error {
    /// The handle no longer resolves to a live OS window.
    #[error("window {handle} no longer exists")]
    NotFound { handle: WindowHandle },

    /// The OS refused the requested action.
    #[error("permission denied: cannot {action} window {handle}")]
    PermissionDenied {
        handle: WindowHandle,
        action: &'static str,
    },

    /// The OS notification subscription could not be installed.
    #[error("failed to install window event hook: {0}")]
    HookInstallFailed(String),

    /// A lifecycle call was made in the wrong manager state.
    #[error("cannot {operation} while the manager is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// Any other OS failure for a live window.
    #[error("OS call failed for window {handle}: {message}")]
    Os {
        handle: WindowHandle,
        message: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` if the error means the window is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
