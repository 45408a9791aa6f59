use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::*;
use crate::Error;
use crate::event::EventKind;
use crate::fake::{FakePlatform, FakeWindow};
use crate::platform::NotificationKind;
use crate::window::ShowState;

type Log = Rc<RefCell<Vec<(EventKind, WindowHandle)>>>;

fn manager(fake: &Arc<FakePlatform>) -> Manager {
    Manager::new(fake.clone(), Filter::default())
}

/// Records every event through a wildcard subscriber.
fn record(manager: &mut Manager) -> Log {
    let log = Log::default();
    let sink = log.clone();
    manager.subscribe(Topic::All, move |event, _| {
        sink.borrow_mut().push((event.kind, event.window.handle()));
        Ok(())
    });
    log
}

fn events(log: &Log) -> Vec<(EventKind, WindowHandle)> {
    log.borrow().clone()
}

#[test]
fn seeding_fires_no_events() {
    // Arrange
    let fake = FakePlatform::new();
    let a = fake.add(1, FakeWindow::app("Firefox"));
    let b = fake.add(2, FakeWindow::app("Code"));
    fake.add(3, FakeWindow::app(""));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert!(events(&log).is_empty());
    let tracked: Vec<WindowHandle> = manager.windows().map(|w| w.handle()).collect();
    assert_eq!(tracked, vec![b, a]);
}

#[test]
fn announce_initial_fires_added_for_seeded_windows() {
    // Arrange
    let fake = FakePlatform::new();
    let a = fake.add(1, FakeWindow::app("Firefox"));
    let b = fake.add(2, FakeWindow::app("Code"));
    let options = ManagerOptions {
        announce_initial: true,
    };
    let mut manager = Manager::with_options(fake.clone(), Filter::default(), options);
    let log = record(&mut manager);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(
        events(&log),
        vec![(EventKind::WindowAdded, b), (EventKind::WindowAdded, a)]
    );
}

#[test]
fn title_change_fires_once_and_updates_cache() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.then(move |os| os.window_mut(w).unwrap().title = "New Tab - Firefox".into());
    fake.notify(NotificationKind::NameChanged, w);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(events(&log), vec![(EventKind::TitleChanged, w)]);
    assert_eq!(manager.get(w).unwrap().last_title(), "New Tab - Firefox");
}

#[test]
fn repeated_name_change_without_new_title_is_silent() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.notify(NotificationKind::NameChanged, w);
    fake.notify(NotificationKind::NameChanged, w);
    fake.then(move |os| os.window_mut(w).unwrap().title = "Firefox - Private".into());
    fake.notify(NotificationKind::NameChanged, w);
    fake.notify(NotificationKind::NameChanged, w);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(events(&log), vec![(EventKind::TitleChanged, w)]);
}

#[test]
fn shown_window_with_empty_title_is_ignored() {
    // Arrange
    let fake = FakePlatform::new();
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.then(|os| os.windows.push((WindowHandle(9), FakeWindow::app(""))));
    fake.notify(NotificationKind::Shown, WindowHandle(9));
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert!(events(&log).is_empty());
    assert!(manager.get(WindowHandle(9)).is_none());
}

#[test]
fn window_that_becomes_manageable_is_added() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app(""));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.notify(NotificationKind::Shown, w);
    fake.then(move |os| os.window_mut(w).unwrap().title = "Loaded".into());
    fake.notify(NotificationKind::NameChanged, w);
    fake.notify(NotificationKind::Shown, w);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(events(&log), vec![(EventKind::WindowAdded, w)]);
    assert_eq!(manager.get(w).unwrap().last_title(), "Loaded");
}

#[test]
fn destroyed_window_is_removed_once_and_reads_not_found() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    let reads = Rc::new(RefCell::new(Vec::new()));
    let sink = reads.clone();
    manager.subscribe(EventKind::WindowRemoved, move |event, _| {
        sink.borrow_mut().push(event.window.title().map_err(|e| e.is_not_found()));
        Ok(())
    });
    fake.then(move |os| os.destroy(w));
    fake.notify(NotificationKind::Destroyed, w);
    fake.notify(NotificationKind::Destroyed, w);
    fake.notify(NotificationKind::Hidden, w);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(events(&log), vec![(EventKind::WindowRemoved, w)]);
    assert_eq!(*reads.borrow(), vec![Err(true)]);
    assert!(manager.is_empty());
    assert!(matches!(
        manager.window(w).title(),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn hidden_untracked_window_is_ignored() {
    // Arrange
    let fake = FakePlatform::new();
    let tooltip = fake.add(1, FakeWindow::app("tip").class("tooltips_class32"));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.notify(NotificationKind::Shown, tooltip);
    fake.notify(NotificationKind::Hidden, tooltip);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert!(events(&log).is_empty());
}

#[test]
fn hidden_tracked_window_is_removed() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.then(move |os| os.window_mut(w).unwrap().visible = false);
    fake.notify(NotificationKind::Hidden, w);
    fake.then(move |os| os.window_mut(w).unwrap().visible = true);
    fake.notify(NotificationKind::Shown, w);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(
        events(&log),
        vec![(EventKind::WindowRemoved, w), (EventKind::WindowAdded, w)]
    );
}

#[test]
fn duplicate_focus_is_suppressed() {
    // Arrange
    let fake = FakePlatform::new();
    let a = fake.add(1, FakeWindow::app("Firefox"));
    let b = fake.add(2, FakeWindow::app("Code"));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.notify(NotificationKind::Foreground, a);
    fake.notify(NotificationKind::Focus, a);
    fake.notify(NotificationKind::Foreground, a);
    fake.notify(NotificationKind::Foreground, b);
    fake.notify(NotificationKind::Focus, a);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(
        events(&log),
        vec![
            (EventKind::FocusChanged, a),
            (EventKind::FocusChanged, b),
            (EventKind::FocusChanged, a),
        ]
    );
    assert_eq!(manager.focused(), Some(a));
}

#[test]
fn initial_foreground_is_the_focus_holder() {
    // Arrange
    let fake = FakePlatform::new();
    let a = fake.add(1, FakeWindow::app("Firefox"));
    fake.with(|os| os.foreground = Some(a));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.notify(NotificationKind::Foreground, a);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert!(events(&log).is_empty());
    assert_eq!(manager.focused(), Some(a));
}

#[test]
fn focus_on_new_window_adds_then_focuses() {
    // Arrange
    let fake = FakePlatform::new();
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.then(|os| os.windows.push((WindowHandle(5), FakeWindow::app("Terminal"))));
    fake.notify(NotificationKind::Foreground, WindowHandle(5));
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(
        events(&log),
        vec![
            (EventKind::WindowAdded, WindowHandle(5)),
            (EventKind::FocusChanged, WindowHandle(5)),
        ]
    );
}

#[test]
fn minimize_and_restore_follow_live_state() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    let minimize = move |state| {
        move |os: &mut crate::fake::FakeOs| os.window_mut(w).unwrap().show_state = state
    };
    fake.then(minimize(ShowState::Minimized));
    fake.notify(NotificationKind::StateChanged, w);
    fake.notify(NotificationKind::StateChanged, w);
    fake.then(minimize(ShowState::Normal));
    fake.notify(NotificationKind::StateChanged, w);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(
        events(&log),
        vec![
            (EventKind::WindowMinimized, w),
            (EventKind::WindowRestored, w)
        ]
    );
    assert!(!manager.get(w).unwrap().was_minimized());
}

#[test]
fn location_change_fires_moved() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.then(move |os| os.window_mut(w).unwrap().rect = crate::Rect::new(10, 10, 640, 480));
    fake.notify(NotificationKind::LocationChanged, w);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(events(&log), vec![(EventKind::WindowMoved, w)]);
}

#[test]
fn window_first_seen_on_restore_is_added_then_restored() {
    // Arrange
    let fake = FakePlatform::new();
    let restored = fake.add(1, FakeWindow::app(""));
    let mut minimized = FakeWindow::app("");
    minimized.show_state = ShowState::Minimized;
    let still_minimized = fake.add(2, minimized);
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.then(move |os| {
        os.window_mut(restored).unwrap().title = "Editor".into();
        os.window_mut(still_minimized).unwrap().title = "Player".into();
    });
    fake.notify(NotificationKind::StateChanged, restored);
    fake.notify(NotificationKind::StateChanged, still_minimized);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(
        events(&log),
        vec![
            (EventKind::WindowAdded, restored),
            (EventKind::WindowRestored, restored),
            (EventKind::WindowAdded, still_minimized),
        ]
    );
    assert!(manager.get(still_minimized).unwrap().was_minimized());
}

#[test]
fn tracked_window_that_stops_being_manageable_is_removed() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.then(move |os| os.window_mut(w).unwrap().cloaked = true);
    fake.notify(NotificationKind::LocationChanged, w);
    fake.notify(NotificationKind::LocationChanged, w);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(events(&log), vec![(EventKind::WindowRemoved, w)]);
}

#[test]
fn vanished_window_is_implicitly_removed() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    fake.with(|os| os.foreground = Some(w));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.then(move |os| os.destroy(w));
    fake.notify(NotificationKind::NameChanged, w);
    fake.notify(NotificationKind::Destroyed, w);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(events(&log), vec![(EventKind::WindowRemoved, w)]);
    assert_eq!(manager.focused(), None);
}

#[test]
fn notification_for_unknown_handle_is_dropped() {
    // Arrange
    let fake = FakePlatform::new();
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    for kind in [
        NotificationKind::Shown,
        NotificationKind::Focus,
        NotificationKind::StateChanged,
        NotificationKind::NameChanged,
        NotificationKind::Destroyed,
    ] {
        fake.notify(kind, WindowHandle(404));
    }
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert!(events(&log).is_empty());
    assert!(manager.is_empty());
}

#[test]
fn specific_subscribers_run_before_wildcard_in_registration_order() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let order = Rc::new(RefCell::new(Vec::new()));
    for (label, topic) in [
        ("all-1", Topic::All),
        ("moved-1", Topic::Kind(EventKind::WindowMoved)),
        ("title", Topic::Kind(EventKind::TitleChanged)),
        ("all-2", Topic::All),
        ("moved-2", Topic::Kind(EventKind::WindowMoved)),
    ] {
        let sink = order.clone();
        manager.subscribe(topic, move |_, _| {
            sink.borrow_mut().push(label);
            Ok(())
        });
    }
    fake.notify(NotificationKind::LocationChanged, w);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(*order.borrow(), vec!["moved-1", "moved-2", "all-1", "all-2"]);
}

#[test]
fn failing_subscribers_do_not_block_others() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let failures = Rc::new(RefCell::new(0));
    let counter = failures.clone();
    manager.subscribe(EventKind::WindowMoved, move |_, _| {
        *counter.borrow_mut() += 1;
        Err("layout engine unavailable".into())
    });
    manager.subscribe(EventKind::WindowMoved, |_, _| panic!("subscriber bug"));
    let log = record(&mut manager);
    fake.notify(NotificationKind::LocationChanged, w);
    fake.notify(NotificationKind::LocationChanged, w);
    fake.end();

    // Act
    let result = manager.start();

    // Assert
    assert!(result.is_ok());
    assert_eq!(*failures.borrow(), 2);
    assert_eq!(
        events(&log),
        vec![(EventKind::WindowMoved, w), (EventKind::WindowMoved, w)]
    );
    assert_eq!(manager.subscriber_count(), 3);
}

#[test]
fn unsubscribed_callback_is_not_called() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();
    let id = manager.subscribe(EventKind::WindowMoved, move |_, _| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    // Act
    assert!(manager.unsubscribe(id));
    assert!(!manager.unsubscribe(id));
    fake.notify(NotificationKind::LocationChanged, w);
    fake.end();
    manager.start().unwrap();

    // Assert
    assert_eq!(*calls.borrow(), 0);
    assert_eq!(events(&log).len(), 1);
}

#[test]
fn context_reflects_tracked_set() {
    // Arrange
    let fake = FakePlatform::new();
    let a = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    manager.subscribe(Topic::All, move |event, ctx| {
        let handle = event.window.handle();
        sink.borrow_mut()
            .push((event.kind, ctx.is_tracked(handle), ctx.len()));
        Ok(())
    });
    fake.then(|os| os.windows.push((WindowHandle(2), FakeWindow::app("Code"))));
    fake.notify(NotificationKind::Shown, WindowHandle(2));
    fake.then(move |os| os.destroy(a));
    fake.notify(NotificationKind::Destroyed, a);
    fake.end();

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(
        *seen.borrow(),
        vec![
            (EventKind::WindowAdded, true, 2),
            (EventKind::WindowRemoved, false, 1),
        ]
    );
}

#[test]
fn hook_failure_leaves_manager_stopped() {
    // Arrange
    let fake = FakePlatform::new();
    fake.add(1, FakeWindow::app("Firefox"));
    fake.with(|os| os.fail_hook = true);
    let mut manager = manager(&fake);

    // Act
    let result = manager.start();

    // Assert
    assert!(matches!(result, Err(Error::HookInstallFailed(_))));
    assert_eq!(manager.state(), ManagerState::Stopped);
    assert_eq!(fake.hooks_installed(), 0);
    assert!(manager.is_empty());
}

#[test]
fn stop_from_another_thread_ends_start() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    let handle = manager.stop_handle();
    let stopper = thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_secs(5);
        while handle.state() != ManagerState::Running && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        handle.stop();
    });

    // Act
    manager.start().unwrap();
    stopper.join().unwrap();

    // Assert
    assert_eq!(manager.state(), ManagerState::Stopped);
    assert_eq!(fake.hooks_installed(), 0);
    assert!(manager.get(w).is_some());
    assert!(events(&log).is_empty());
}

#[test]
fn nothing_is_delivered_after_stop() {
    // Arrange
    let fake = FakePlatform::new();
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    manager.subscribe(EventKind::WindowAdded, |_, ctx| {
        ctx.stop();
        Ok(())
    });
    fake.then(|os| {
        os.windows.push((WindowHandle(1), FakeWindow::app("one")));
        os.windows.push((WindowHandle(2), FakeWindow::app("two")));
    });
    fake.notify(NotificationKind::Shown, WindowHandle(1));
    fake.notify(NotificationKind::Foreground, WindowHandle(1));
    fake.notify(NotificationKind::Shown, WindowHandle(2));

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(events(&log), vec![(EventKind::WindowAdded, WindowHandle(1))]);
    assert_eq!(manager.len(), 1);
    assert_eq!(manager.state(), ManagerState::Stopped);
}

#[test]
fn stop_during_seeding_skips_the_loop() {
    // Arrange
    let fake = FakePlatform::new();
    let w = fake.add(1, FakeWindow::app("Firefox"));
    let options = ManagerOptions {
        announce_initial: true,
    };
    let mut manager = Manager::with_options(fake.clone(), Filter::default(), options);
    let log = record(&mut manager);
    manager.subscribe(EventKind::WindowAdded, |_, ctx| {
        ctx.stop();
        Ok(())
    });
    fake.notify(NotificationKind::LocationChanged, w);

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(events(&log), vec![(EventKind::WindowAdded, w)]);
    assert_eq!(manager.state(), ManagerState::Stopped);
    assert_eq!(fake.hooks_installed(), 0);
}

#[test]
fn stop_during_seeding_silences_remaining_announcements() {
    // Arrange
    let fake = FakePlatform::new();
    let first = fake.add(1, FakeWindow::app("Alpha"));
    fake.add(2, FakeWindow::app("Beta"));
    fake.add(3, FakeWindow::app("Gamma"));
    let options = ManagerOptions {
        announce_initial: true,
    };
    let mut manager = Manager::with_options(fake.clone(), Filter::default(), options);
    let log = record(&mut manager);
    manager.subscribe(EventKind::WindowAdded, |_, ctx| {
        ctx.stop();
        Ok(())
    });

    // Act
    manager.start().unwrap();

    // Assert
    assert_eq!(events(&log), vec![(EventKind::WindowAdded, first)]);
    assert_eq!(manager.state(), ManagerState::Stopped);
    assert_eq!(fake.hooks_installed(), 0);
}

#[test]
fn stop_when_stopped_is_a_no_op() {
    // Arrange
    let fake = FakePlatform::new();
    let manager = manager(&fake);

    // Act
    manager.stop();
    manager.stop_handle().stop();

    // Assert
    assert_eq!(manager.state(), ManagerState::Stopped);
}

#[test]
fn restart_reseeds_from_scratch() {
    // Arrange
    let fake = FakePlatform::new();
    let a = fake.add(1, FakeWindow::app("Firefox"));
    let mut manager = manager(&fake);
    let log = record(&mut manager);
    fake.end();
    manager.start().unwrap();

    // Act
    fake.with(|os| {
        os.destroy(a);
        os.windows.push((WindowHandle(2), FakeWindow::app("Code")));
    });
    fake.notify(NotificationKind::LocationChanged, WindowHandle(2));
    fake.end();
    manager.start().unwrap();

    // Assert
    let tracked: Vec<WindowHandle> = manager.windows().map(|w| w.handle()).collect();
    assert_eq!(tracked, vec![WindowHandle(2)]);
    assert_eq!(events(&log), vec![(EventKind::WindowMoved, WindowHandle(2))]);
    assert_eq!(fake.hooks_installed(), 0);
}

#[test]
fn list_windows_is_stateless() {
    // Arrange
    let fake = FakePlatform::new();
    fake.add(1, FakeWindow::app("Firefox"));
    let manager = manager(&fake);

    // Act
    let windows = manager.list_windows().unwrap();

    // Assert
    assert_eq!(windows.len(), 1);
    assert!(manager.is_empty());
    assert_eq!(fake.hooks_installed(), 0);
    assert_eq!(manager.state(), ManagerState::Stopped);
}

#[test]
fn dump_state_marks_focus_holder() {
    // Arrange
    let fake = FakePlatform::new();
    let a = fake.add(1, FakeWindow::app("Firefox"));
    fake.add(2, FakeWindow::app("Code"));
    fake.with(|os| os.foreground = Some(a));
    let mut manager = manager(&fake);
    fake.end();
    manager.start().unwrap();

    // Act
    let dump = manager.dump_state();

    // Assert
    assert!(dump.starts_with("state: stopped, tracked: 2, focused: 0x1\n"));
    assert!(dump.contains("* [0x1] \"Firefox\""));
    assert!(dump.contains("  [0x2] \"Code\""));
}

/// Replays a pseudo-random notification storm and checks that the
/// tracked set converges to what the filter says about the final state.
#[test]
fn tracked_set_matches_filter_after_any_sequence() {
    for seed in 1..=20u64 {
        // Arrange
        let fake = FakePlatform::new();
        for h in 1..=3 {
            fake.add(h, FakeWindow::app(&format!("seeded {h}")));
        }
        let mut manager = manager(&fake);
        let log = record(&mut manager);
        let mut rng = seed;
        let mut next = move |n: u64| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (rng >> 33) % n
        };
        for _ in 0..60 {
            let handle = WindowHandle(next(6) as usize + 1);
            let mutation = next(7);
            fake.then(move |os| {
                if mutation == 0 {
                    os.destroy(handle);
                    return;
                }
                if os.window(handle).is_err() {
                    os.windows.push((handle, FakeWindow::app("")));
                }
                let Ok(w) = os.window_mut(handle) else { return };
                match mutation {
                    1 => w.title = String::new(),
                    2 => w.title = format!("title {}", handle.raw()),
                    3 => w.visible = !w.visible,
                    4 => w.cloaked = !w.cloaked,
                    5 => {
                        w.show_state = match w.show_state {
                            ShowState::Minimized => ShowState::Normal,
                            _ => ShowState::Minimized,
                        }
                    }
                    _ => w.title = format!("renamed {}", handle.raw()),
                }
            });
            let kind = match mutation {
                0 => NotificationKind::Destroyed,
                1 | 2 | 6 => NotificationKind::NameChanged,
                3 => NotificationKind::Shown,
                4 => NotificationKind::LocationChanged,
                _ => NotificationKind::StateChanged,
            };
            fake.notify(kind, handle);
        }
        // Settle: one notification per handle reflecting its final state.
        for h in 1..=6 {
            fake.notify(NotificationKind::LocationChanged, WindowHandle(h));
        }
        fake.end();

        // Act
        manager.start().unwrap();

        // Assert
        let filter = Filter::default();
        let expected: HashSet<WindowHandle> = (1..=6)
            .map(WindowHandle)
            .filter(|&h| filter.is_manageable(&manager.window(h)))
            .collect();
        let tracked: HashSet<WindowHandle> = manager.windows().map(|w| w.handle()).collect();
        assert_eq!(tracked, expected, "seed {seed}");

        let mut balance: HashMap<WindowHandle, i32> =
            (1..=3).map(|h| (WindowHandle(h), 1)).collect();
        for (kind, handle) in events(&log) {
            let count = balance.entry(handle).or_default();
            match kind {
                EventKind::WindowAdded => *count += 1,
                EventKind::WindowRemoved => *count -= 1,
                _ => assert_eq!(*count, 1, "event for untracked {handle}, seed {seed}"),
            }
            assert!((0..=1).contains(&*count), "unbalanced {handle}, seed {seed}");
        }
    }
}
