//! The rules that decide which windows are manageable.
//!
//! A window is manageable iff no exclusion matches and every inclusion
//! requirement holds. Exclusions are checked first, in the fixed order
//! of [`EXCLUSION_ORDER`]; the first match rejects the window.
//!
//! Evaluation is pure and re-queries the OS every time. Nothing is
//! cached, because add/remove transitions are detected by re-running
//! the filter after each notification.

use std::fmt;

use crate::config::{self, Config, WindowRule};
use crate::window::Window;
use crate::{Error, WindowResult};

/// Taskbar windows on the primary and secondary monitors.
const TASKBAR_CLASSES: &[&str] = &["Shell_TrayWnd", "Shell_SecondaryTrayWnd"];

/// Desktop, wallpaper, and the desktop window itself.
const DESKTOP_CLASSES: &[&str] = &["Progman", "WorkerW", "#32769"];

/// Notification area and its overflow flyouts.
const SYSTEM_TRAY_CLASSES: &[&str] = &[
    "NotifyIconOverflowWindow",
    "TopLevelWindowForOverflowXamlIsland",
    "Shell_InputSwitchTopLevelWindow",
];

/// Shell overlays, hosts, and elevated shell tools.
const OVERLAY_CLASSES: &[&str] = &[
    "Windows.UI.Core.CoreWindow",
    "MultitaskingViewFrame",
    "TaskListThumbnailWnd",
    "ForegroundStaging",
    "XamlExplorerHostIslandWindow",
    "EdgeUiInputTopWndClass",
    "EdgeUiInputWndClass",
    "NativeHWNDHost",
    "DV2ControlHost",
    "TaskManagerWindow",
];

/// UWP frame class. Only a real app when it hosts a `CoreWindow`.
const UWP_FRAME_CLASS: &str = "ApplicationFrameWindow";
const UWP_CONTENT_CLASS: &str = "Windows.UI.Core.CoreWindow";

/// Tooltips, input method editors, popup menus, and generic dialogs.
const TRANSIENT_CLASSES: &[&str] = &[
    "tooltips_class32",
    "IME",
    "MSCTFIME UI",
    "#32768",
    "#32770",
];

/// Shell processes whose windows are never managed.
const SYSTEM_PROCESSES: &[&str] = &[
    "SearchUI.exe",
    "SearchHost.exe",
    "ShellExperienceHost.exe",
    "StartMenuExperienceHost.exe",
    "TextInputHost.exe",
    "LockApp.exe",
    "ScreenClippingHost.exe",
    "GameBar.exe",
    "GameBarFTServer.exe",
];

/// A rule that rejects a window when it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    Taskbar,
    Desktop,
    SystemTray,
    /// UWP frames without content and shell overlays.
    EmptyFrame,
    /// Tooltips, IME windows, popup menus, and unowned dialogs.
    Transient,
    /// `WS_EX_TOOLWINDOW` without `WS_EX_APPWINDOW`.
    ToolWindow,
    /// Owned by another top-level window (dialogs, property sheets).
    Owned,
    /// Hidden by the compositor although reported visible.
    Cloaked,
    SystemProcess,
    /// A user-configured class or process, or a `manage = false` rule.
    Configured,
}

/// Exclusions in priority order.
pub const EXCLUSION_ORDER: [Exclusion; 10] = [
    Exclusion::Taskbar,
    Exclusion::Desktop,
    Exclusion::SystemTray,
    Exclusion::EmptyFrame,
    Exclusion::Transient,
    Exclusion::ToolWindow,
    Exclusion::Owned,
    Exclusion::Cloaked,
    Exclusion::SystemProcess,
    Exclusion::Configured,
];

/// A property every manageable window must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Visible,
    Titled,
    NonZeroSize,
    TopLevel,
    Activatable,
}

/// Why a window is not manageable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Excluded(Exclusion),
    Missing(Requirement),
    /// The handle vanished while it was being evaluated.
    Gone,
    /// A query failed for a window that still exists.
    Unreadable,
}

/// The outcome of evaluating a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Manageable,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_manageable(self) -> bool {
        self == Self::Manageable
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excluded(e) => write!(f, "excluded: {e:?}"),
            Self::Missing(r) => write!(f, "missing: {r:?}"),
            Self::Gone => f.write_str("window gone"),
            Self::Unreadable => f.write_str("query failed"),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manageable => f.write_str("manageable"),
            Self::Rejected(r) => r.fmt(f),
        }
    }
}

/// The ordered rule set that classifies windows.
#[derive(Debug, Clone)]
pub struct Filter {
    ignored_classes: Vec<String>,
    ignored_processes: Vec<String>,
    rules: Vec<WindowRule>,
    /// Checked after `rules`, so a user rule can override them.
    shell_rules: Vec<WindowRule>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            ignored_classes: Vec::new(),
            ignored_processes: Vec::new(),
            rules: Vec::new(),
            shell_rules: config::default_rules(),
        }
    }
}

/// Class and title read once per evaluation.
struct Facts {
    class: String,
    title: String,
}

impl Filter {
    /// Creates a filter with the built-in lists and the given user rules.
    pub fn new(rules: Vec<WindowRule>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Builds a filter from the user configuration. The built-in lists
    /// and shell rules always apply.
    pub fn from_config(config: &Config) -> Self {
        Self {
            ignored_classes: config.filter.ignored_classes.clone(),
            ignored_processes: config.filter.ignored_processes.clone(),
            rules: config.rules.clone(),
            ..Self::default()
        }
    }

    /// Returns whether the window should be tracked.
    pub fn is_manageable(&self, window: &Window) -> bool {
        self.evaluate(window).is_manageable()
    }

    /// Classifies the window, naming the first rule that rejects it.
    pub fn evaluate(&self, window: &Window) -> Verdict {
        let verdict = match self.check(window) {
            Ok(verdict) => verdict,
            Err(Error::NotFound { .. }) => Verdict::Rejected(Rejection::Gone),
            Err(e) => {
                tracing::debug!("filter query failed for {}: {e}", window.handle());
                Verdict::Rejected(Rejection::Unreadable)
            }
        };
        if let Verdict::Rejected(rejection) = verdict {
            tracing::trace!("filtered {}: {rejection}", window.handle());
        }
        verdict
    }

    fn check(&self, window: &Window) -> WindowResult<Verdict> {
        let facts = Facts {
            class: window.class_name()?,
            title: window.title()?,
        };
        for exclusion in EXCLUSION_ORDER {
            if self.excludes(exclusion, window, &facts)? {
                return Ok(Verdict::Rejected(Rejection::Excluded(exclusion)));
            }
        }
        if let Some(missing) = missing_requirement(window, &facts)? {
            return Ok(Verdict::Rejected(Rejection::Missing(missing)));
        }
        Ok(Verdict::Manageable)
    }

    fn excludes(&self, exclusion: Exclusion, window: &Window, facts: &Facts) -> WindowResult<bool> {
        let class = facts.class.as_str();
        Ok(match exclusion {
            Exclusion::Taskbar => in_list(class, TASKBAR_CLASSES),
            Exclusion::Desktop => in_list(class, DESKTOP_CLASSES),
            Exclusion::SystemTray => in_list(class, SYSTEM_TRAY_CLASSES),
            Exclusion::EmptyFrame => {
                in_list(class, OVERLAY_CLASSES)
                    || (class.eq_ignore_ascii_case(UWP_FRAME_CLASS)
                        && !window.has_child_with_class(UWP_CONTENT_CLASS)?)
            }
            Exclusion::Transient => in_list(class, TRANSIENT_CLASSES),
            Exclusion::ToolWindow => {
                let styles = window.styles()?;
                styles.tool_window && !styles.app_window
            }
            Exclusion::Owned => window.owner()?.is_some(),
            Exclusion::Cloaked => window.is_cloaked()?,
            Exclusion::SystemProcess => match process_name(window)? {
                Some(name) => in_list(&name, SYSTEM_PROCESSES),
                None => false,
            },
            Exclusion::Configured => self.configured_exclusion(window, facts)?,
        })
    }

    fn configured_exclusion(&self, window: &Window, facts: &Facts) -> WindowResult<bool> {
        if self
            .ignored_classes
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&facts.class))
        {
            return Ok(true);
        }
        if !self.ignored_processes.is_empty()
            && let Some(name) = process_name(window)?
            && self
                .ignored_processes
                .iter()
                .any(|p| p.eq_ignore_ascii_case(&name))
        {
            return Ok(true);
        }
        let verdict = config::first_match(&facts.class, &facts.title, &self.rules)
            .or_else(|| config::first_match(&facts.class, &facts.title, &self.shell_rules));
        Ok(verdict == Some(false))
    }
}

/// Returns the first inclusion requirement the window fails, if any.
fn missing_requirement(window: &Window, facts: &Facts) -> WindowResult<Option<Requirement>> {
    if !window.is_visible()? {
        return Ok(Some(Requirement::Visible));
    }
    if facts.title.trim().is_empty() {
        return Ok(Some(Requirement::Titled));
    }
    if window.rect()?.is_empty() {
        return Ok(Some(Requirement::NonZeroSize));
    }
    let styles = window.styles()?;
    if styles.child || window.parent()?.is_some() {
        return Ok(Some(Requirement::TopLevel));
    }
    if !styles.can_activate() {
        return Ok(Some(Requirement::Activatable));
    }
    Ok(None)
}

/// Resolves the process name, treating an access-denied process as unknown.
fn process_name(window: &Window) -> WindowResult<Option<String>> {
    match window.process_name() {
        Ok(name) => Ok(Some(name)),
        Err(Error::PermissionDenied { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

fn in_list(value: &str, list: &[&str]) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(value))
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
