//! The OS notification subscription.
//!
//! `SetWinEventHook` with `WINEVENT_OUTOFCONTEXT` delivers callbacks on
//! the installing thread while it pumps messages. The callback is a
//! plain `extern "system"` function, so it reaches the manager through
//! a thread-local trampoline that is only armed while [`WinEventHook::pump`]
//! runs.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::mem;
use std::sync::Arc;

use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Accessibility::{HWINEVENTHOOK, SetWinEventHook, UnhookWinEvent};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, MSG, PM_NOREMOVE, PeekMessageW, PostThreadMessageW,
    TranslateMessage, WINEVENT_OUTOFCONTEXT, WINEVENT_SKIPOWNPROCESS, WM_QUIT, WM_USER,
};
use wintrack_core::{Error, Notification, NotificationHook, WindowResult};

use crate::event;

type Sink = *mut (dyn FnMut(Notification) + 'static);

thread_local! {
    /// The pump's sink. `Some` only while `pump` runs on this thread.
    static SINK: Cell<Option<Sink>> = const { Cell::new(None) };
    /// Notifications waiting for the sink.
    static PENDING: RefCell<VecDeque<Notification>> = const { RefCell::new(VecDeque::new()) };
    /// Set while the sink runs; callbacks raised meanwhile are queued.
    static DELIVERING: Cell<bool> = const { Cell::new(false) };
}

/// An installed WinEvent hook, bound to the thread that installed it.
pub struct WinEventHook {
    hook: HWINEVENTHOOK,
    waker: Arc<ThreadWaker>,
}

impl WinEventHook {
    /// Installs the hook on the calling thread.
    pub fn install() -> WindowResult<Self> {
        // SAFETY: GetCurrentThreadId has no preconditions. PeekMessageW
        // forces the thread message queue to exist so a wake posted
        // before the pump starts is not lost.
        let thread_id = unsafe {
            let mut msg = MSG::default();
            let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
            GetCurrentThreadId()
        };

        // SAFETY: win_event_proc matches WINEVENTPROC. WINEVENT_OUTOFCONTEXT
        // runs it on this thread; WINEVENT_SKIPOWNPROCESS ignores our own
        // windows.
        let hook = unsafe {
            SetWinEventHook(
                event::EVENT_MIN,
                event::EVENT_MAX,
                None,
                Some(win_event_proc),
                0,
                0,
                WINEVENT_OUTOFCONTEXT | WINEVENT_SKIPOWNPROCESS,
            )
        };
        if hook.is_invalid() {
            return Err(Error::HookInstallFailed(
                "SetWinEventHook returned a null hook".into(),
            ));
        }

        tracing::debug!("WinEvent hook installed on thread {thread_id}");
        Ok(Self {
            hook,
            waker: Arc::new(ThreadWaker { thread_id }),
        })
    }
}

impl NotificationHook for WinEventHook {
    fn pump(&mut self, sink: &mut dyn FnMut(Notification)) {
        let sink: *mut (dyn FnMut(Notification) + '_) = sink;
        // SAFETY: the pointer is only dereferenced while this call is on
        // the stack; SinkGuard clears it before `sink` goes out of scope.
        let sink: Sink = unsafe { mem::transmute(sink) };
        SINK.set(Some(sink));
        let _guard = SinkGuard;

        let mut msg = MSG::default();
        // SAFETY: standard message loop on the thread that owns the hook.
        // GetMessageW returns FALSE on WM_QUIT, posted by the waker.
        while unsafe { GetMessageW(&mut msg, None, 0, 0).as_bool() } {
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    fn waker(&self) -> Arc<dyn wintrack_core::Waker> {
        self.waker.clone()
    }
}

impl Drop for WinEventHook {
    fn drop(&mut self) {
        // SAFETY: the hook was returned by SetWinEventHook and is
        // unhooked exactly once.
        unsafe {
            let _ = UnhookWinEvent(self.hook);
        }
        tracing::debug!("WinEvent hook removed");
    }
}

/// Disarms the trampoline when the pump returns.
struct SinkGuard;

impl Drop for SinkGuard {
    fn drop(&mut self) {
        SINK.set(None);
        PENDING.with_borrow_mut(VecDeque::clear);
    }
}

/// Wakes the pump by posting `WM_QUIT` to its thread.
struct ThreadWaker {
    thread_id: u32,
}

impl wintrack_core::Waker for ThreadWaker {
    fn wake(&self) {
        // SAFETY: PostThreadMessageW only enqueues a message.
        if let Err(e) =
            unsafe { PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
        {
            tracing::error!("failed to wake event loop: {e}");
        }
    }
}

/// The WinEvent callback.
unsafe extern "system" fn win_event_proc(
    _hook: HWINEVENTHOOK,
    event: u32,
    hwnd: HWND,
    id_object: i32,
    id_child: i32,
    _event_thread: u32,
    _event_time: u32,
) {
    if let Some(notification) = event::translate(event, hwnd, id_object, id_child) {
        deliver(notification);
    }
}

/// Forwards a notification to the armed sink, in arrival order.
///
/// A callback raised while the sink is running (e.g. a subscriber that
/// pumps messages) is queued and delivered after the current one.
fn deliver(notification: Notification) {
    PENDING.with_borrow_mut(|pending| pending.push_back(notification));
    if DELIVERING.get() {
        return;
    }
    let Some(sink) = SINK.get() else {
        PENDING.with_borrow_mut(VecDeque::clear);
        return;
    };

    DELIVERING.set(true);
    while let Some(next) = PENDING.with_borrow_mut(VecDeque::pop_front) {
        // SAFETY: SINK is armed only while `pump` holds the sink borrow.
        unsafe { (*sink)(next) };
    }
    DELIVERING.set(false);
}
