use std::sync::Arc;

use crate::filter::{Filter, Verdict};
use crate::platform::Platform;
use crate::window::Window;
use crate::WindowResult;

/// Enumerates the currently manageable top-level windows.
///
/// The result is sorted by title (case-insensitive) so repeated calls
/// list windows in a stable order.
pub fn list_windows(platform: &Arc<dyn Platform>, filter: &Filter) -> WindowResult<Vec<Window>> {
    let mut windows: Vec<(String, Window)> = platform
        .enumerate()?
        .into_iter()
        .map(|handle| Window::new(handle, platform.clone()))
        .filter(|window| filter.is_manageable(window))
        .filter_map(|window| Some((window.title().ok()?.to_lowercase(), window)))
        .collect();
    windows.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(windows.into_iter().map(|(_, window)| window).collect())
}

/// Enumerates every top-level window with its filter verdict, in z-order.
pub fn evaluate_all(
    platform: &Arc<dyn Platform>,
    filter: &Filter,
) -> WindowResult<Vec<(Window, Verdict)>> {
    Ok(platform
        .enumerate()?
        .into_iter()
        .map(|handle| {
            let window = Window::new(handle, platform.clone());
            let verdict = filter.evaluate(&window);
            (window, verdict)
        })
        .collect())
}
