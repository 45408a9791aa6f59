use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    EVENT_OBJECT_DESTROY, EVENT_OBJECT_FOCUS, EVENT_OBJECT_HIDE, EVENT_OBJECT_LOCATIONCHANGE,
    EVENT_OBJECT_NAMECHANGE, EVENT_OBJECT_SHOW, EVENT_SYSTEM_FOREGROUND, EVENT_SYSTEM_MINIMIZEEND,
    EVENT_SYSTEM_MINIMIZESTART, EVENT_SYSTEM_MOVESIZEEND,
};
use wintrack_core::{Notification, NotificationKind, WindowHandle};

/// Lowest event code we listen for (EVENT_SYSTEM_FOREGROUND = 0x0003).
pub const EVENT_MIN: u32 = 0x0003;

/// Highest event code we listen for (EVENT_OBJECT_NAMECHANGE = 0x800C).
pub const EVENT_MAX: u32 = 0x800C;

/// Object ID for the window itself, not a scrollbar, caret, or menu item.
const OBJID_WINDOW: i32 = 0;

/// Child ID for the object itself rather than one of its children.
const CHILDID_SELF: i32 = 0;

/// Translates a raw WinEvent into a [`Notification`].
///
/// Returns `None` for child objects, null handles, and codes outside
/// the tracked vocabulary.
pub fn translate(event: u32, hwnd: HWND, id_object: i32, id_child: i32) -> Option<Notification> {
    if id_object != OBJID_WINDOW || id_child != CHILDID_SELF || hwnd.is_invalid() {
        return None;
    }

    let kind = match event {
        e if e == EVENT_OBJECT_SHOW => NotificationKind::Shown,
        e if e == EVENT_OBJECT_HIDE => NotificationKind::Hidden,
        e if e == EVENT_OBJECT_DESTROY => NotificationKind::Destroyed,
        e if e == EVENT_SYSTEM_FOREGROUND => NotificationKind::Foreground,
        e if e == EVENT_OBJECT_FOCUS => NotificationKind::Focus,
        e if e == EVENT_SYSTEM_MINIMIZESTART || e == EVENT_SYSTEM_MINIMIZEEND => {
            NotificationKind::StateChanged
        }
        e if e == EVENT_OBJECT_LOCATIONCHANGE || e == EVENT_SYSTEM_MOVESIZEEND => {
            NotificationKind::LocationChanged
        }
        e if e == EVENT_OBJECT_NAMECHANGE => NotificationKind::NameChanged,
        _ => return None,
    };

    Some(Notification::new(kind, WindowHandle(hwnd.0 as usize)))
}
