//! In-memory platform used by the unit tests.
//!
//! The fake hook replays a script of OS mutations and notifications on
//! the loop thread, so a whole `start()` run is deterministic.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::platform::{Notification, NotificationHook, NotificationKind, Platform, Waker};
use crate::window::{ShowCommand, ShowState, StyleFlags, WindowHandle};
use crate::{Error, Rect, WindowResult};

/// A scripted OS window.
#[derive(Debug, Clone)]
pub(crate) struct FakeWindow {
    pub title: String,
    pub class: String,
    pub pid: u32,
    pub process: String,
    pub process_denied: bool,
    pub rect: Rect,
    pub visible: bool,
    pub cloaked: bool,
    pub styles: StyleFlags,
    pub show_state: ShowState,
    pub parent: Option<WindowHandle>,
    pub owner: Option<WindowHandle>,
    pub child_classes: Vec<String>,
}

impl FakeWindow {
    /// A regular application window that passes every filter check.
    pub fn app(title: &str) -> Self {
        Self {
            title: title.into(),
            class: "Notepad".into(),
            pid: 4242,
            process: "notepad.exe".into(),
            process_denied: false,
            rect: Rect::new(0, 0, 800, 600),
            visible: true,
            cloaked: false,
            styles: StyleFlags::default(),
            show_state: ShowState::Normal,
            parent: None,
            owner: None,
            child_classes: Vec::new(),
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = class.into();
        self
    }

    pub fn process(mut self, process: &str) -> Self {
        self.process = process.into();
        self
    }
}

/// Mutable OS state behind the fake.
#[derive(Default)]
pub(crate) struct FakeOs {
    /// Windows in z-order.
    pub windows: Vec<(WindowHandle, FakeWindow)>,
    pub foreground: Option<WindowHandle>,
    pub deny_foreground: bool,
    pub fail_hook: bool,
    pub hooks_installed: usize,
    pub commands: Vec<(WindowHandle, &'static str)>,
}

impl FakeOs {
    pub fn window(&self, handle: WindowHandle) -> WindowResult<&FakeWindow> {
        self.windows
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, w)| w)
            .ok_or(Error::NotFound { handle })
    }

    pub fn window_mut(&mut self, handle: WindowHandle) -> WindowResult<&mut FakeWindow> {
        self.windows
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .map(|(_, w)| w)
            .ok_or(Error::NotFound { handle })
    }

    pub fn destroy(&mut self, handle: WindowHandle) {
        self.windows.retain(|(h, _)| *h != handle);
        if self.foreground == Some(handle) {
            self.foreground = None;
        }
    }
}

/// One step replayed by the fake hook on the loop thread.
pub(crate) enum Step {
    Mutate(Box<dyn FnOnce(&mut FakeOs) + Send>),
    Notify(Notification),
    Wake,
}

/// An in-memory [`Platform`].
pub(crate) struct FakePlatform {
    os: Arc<Mutex<FakeOs>>,
    steps: Sender<Step>,
    inbox: Arc<Mutex<Option<Receiver<Step>>>>,
}

impl FakePlatform {
    pub fn new() -> Arc<Self> {
        let (steps, inbox) = mpsc::channel();
        Arc::new(Self {
            os: Arc::new(Mutex::new(FakeOs::default())),
            steps,
            inbox: Arc::new(Mutex::new(Some(inbox))),
        })
    }

    /// Creates a window immediately, outside any script.
    pub fn add(&self, handle: usize, window: FakeWindow) -> WindowHandle {
        let handle = WindowHandle(handle);
        self.os.lock().unwrap().windows.push((handle, window));
        handle
    }

    /// Applies a mutation immediately, outside any script.
    pub fn with<R>(&self, f: impl FnOnce(&mut FakeOs) -> R) -> R {
        f(&mut self.os.lock().unwrap())
    }

    /// Queues an OS mutation to run on the loop thread.
    pub fn then(&self, f: impl FnOnce(&mut FakeOs) + Send + 'static) {
        let _ = self.steps.send(Step::Mutate(Box::new(f)));
    }

    /// Queues a notification.
    pub fn notify(&self, kind: NotificationKind, handle: WindowHandle) {
        let _ = self
            .steps
            .send(Step::Notify(Notification::new(kind, handle)));
    }

    /// Queues a wake-up that ends the current pump.
    pub fn end(&self) {
        let _ = self.steps.send(Step::Wake);
    }

    pub fn commands(&self) -> Vec<(WindowHandle, &'static str)> {
        self.os.lock().unwrap().commands.clone()
    }

    pub fn hooks_installed(&self) -> usize {
        self.os.lock().unwrap().hooks_installed
    }

    fn read<T>(
        &self,
        handle: WindowHandle,
        f: impl FnOnce(&FakeWindow) -> T,
    ) -> WindowResult<T> {
        let os = self.os.lock().unwrap();
        os.window(handle).map(f)
    }

    fn command(&self, handle: WindowHandle, name: &'static str) -> WindowResult<()> {
        let mut os = self.os.lock().unwrap();
        os.window(handle)?;
        os.commands.push((handle, name));
        Ok(())
    }
}

impl Platform for FakePlatform {
    fn enumerate(&self) -> WindowResult<Vec<WindowHandle>> {
        Ok(self.os.lock().unwrap().windows.iter().map(|(h, _)| *h).collect())
    }

    fn exists(&self, handle: WindowHandle) -> bool {
        self.os.lock().unwrap().window(handle).is_ok()
    }

    fn title(&self, handle: WindowHandle) -> WindowResult<String> {
        self.read(handle, |w| w.title.clone())
    }

    fn class_name(&self, handle: WindowHandle) -> WindowResult<String> {
        self.read(handle, |w| w.class.clone())
    }

    fn process_id(&self, handle: WindowHandle) -> WindowResult<u32> {
        self.read(handle, |w| w.pid)
    }

    fn process_name(&self, handle: WindowHandle) -> WindowResult<String> {
        let (denied, name) = self.read(handle, |w| (w.process_denied, w.process.clone()))?;
        if denied {
            return Err(Error::PermissionDenied {
                handle,
                action: "query process of",
            });
        }
        Ok(name)
    }

    fn rect(&self, handle: WindowHandle) -> WindowResult<Rect> {
        self.read(handle, |w| w.rect)
    }

    fn is_visible(&self, handle: WindowHandle) -> WindowResult<bool> {
        self.read(handle, |w| w.visible)
    }

    fn is_cloaked(&self, handle: WindowHandle) -> WindowResult<bool> {
        self.read(handle, |w| w.cloaked)
    }

    fn styles(&self, handle: WindowHandle) -> WindowResult<StyleFlags> {
        self.read(handle, |w| w.styles)
    }

    fn show_state(&self, handle: WindowHandle) -> WindowResult<ShowState> {
        self.read(handle, |w| w.show_state)
    }

    fn parent(&self, handle: WindowHandle) -> WindowResult<Option<WindowHandle>> {
        self.read(handle, |w| w.parent)
    }

    fn owner(&self, handle: WindowHandle) -> WindowResult<Option<WindowHandle>> {
        self.read(handle, |w| w.owner)
    }

    fn has_child_with_class(&self, handle: WindowHandle, class: &str) -> WindowResult<bool> {
        self.read(handle, |w| w.child_classes.iter().any(|c| c == class))
    }

    fn foreground(&self) -> Option<WindowHandle> {
        self.os.lock().unwrap().foreground
    }

    fn set_foreground(&self, handle: WindowHandle) -> WindowResult<()> {
        let mut os = self.os.lock().unwrap();
        os.window(handle)?;
        if os.deny_foreground {
            return Err(Error::PermissionDenied {
                handle,
                action: "focus",
            });
        }
        os.foreground = Some(handle);
        os.commands.push((handle, "focus"));
        Ok(())
    }

    fn show(&self, handle: WindowHandle, command: ShowCommand) -> WindowResult<()> {
        let (state, name) = match command {
            ShowCommand::Minimize => (ShowState::Minimized, "minimize"),
            ShowCommand::Maximize => (ShowState::Maximized, "maximize"),
            ShowCommand::Restore => (ShowState::Normal, "restore"),
        };
        self.command(handle, name)?;
        self.os.lock().unwrap().window_mut(handle)?.show_state = state;
        Ok(())
    }

    fn close(&self, handle: WindowHandle) -> WindowResult<()> {
        self.command(handle, "close")
    }

    fn set_rect(&self, handle: WindowHandle, rect: &Rect) -> WindowResult<()> {
        self.command(handle, "move_resize")?;
        self.os.lock().unwrap().window_mut(handle)?.rect = *rect;
        Ok(())
    }

    fn install_hook(&self) -> WindowResult<Box<dyn NotificationHook>> {
        let mut os = self.os.lock().unwrap();
        if os.fail_hook {
            return Err(Error::HookInstallFailed("scripted failure".into()));
        }
        let inbox = self
            .inbox
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| Error::HookInstallFailed("hook already installed".into()))?;
        os.hooks_installed += 1;
        Ok(Box::new(FakeHook {
            os: self.os.clone(),
            inbox: Some(inbox),
            slot: self.inbox.clone(),
            waker: Arc::new(FakeWaker(Mutex::new(self.steps.clone()))),
        }))
    }
}

struct FakeWaker(Mutex<Sender<Step>>);

impl Waker for FakeWaker {
    fn wake(&self) {
        let _ = self.0.lock().unwrap().send(Step::Wake);
    }
}

struct FakeHook {
    os: Arc<Mutex<FakeOs>>,
    inbox: Option<Receiver<Step>>,
    slot: Arc<Mutex<Option<Receiver<Step>>>>,
    waker: Arc<FakeWaker>,
}

impl NotificationHook for FakeHook {
    fn pump(&mut self, sink: &mut dyn FnMut(Notification)) {
        let Some(inbox) = self.inbox.as_ref() else {
            return;
        };
        while let Ok(step) = inbox.recv() {
            match step {
                Step::Mutate(f) => f(&mut self.os.lock().unwrap()),
                Step::Notify(n) => sink(n),
                Step::Wake => return,
            }
        }
    }

    fn waker(&self) -> Arc<dyn Waker> {
        self.waker.clone()
    }
}

impl Drop for FakeHook {
    fn drop(&mut self) {
        self.os.lock().unwrap().hooks_installed -= 1;
        *self.slot.lock().unwrap() = self.inbox.take();
    }
}
