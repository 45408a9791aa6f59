use std::mem;

use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::Graphics::Dwm::{DWMWA_EXTENDED_FRAME_BOUNDS, DwmGetWindowAttribute};
use windows::Win32::UI::WindowsAndMessaging::GetWindowRect;
use wintrack_core::Rect;

/// A window's outer rectangle alongside its visible frame.
///
/// On Windows 10/11 the outer rectangle includes invisible drop-shadow
/// borders, usually ~7px left, right and bottom.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    outer: RECT,
    visible: RECT,
}

impl Frame {
    /// Reads both rectangles. The visible one falls back to the outer
    /// rectangle when DWM does not report extended frame bounds.
    pub fn read(hwnd: HWND) -> windows::core::Result<Self> {
        let mut outer = RECT::default();
        // SAFETY: `outer` is a valid RECT for the duration of the call.
        unsafe { GetWindowRect(hwnd, &mut outer)? };

        let mut visible = RECT::default();
        // SAFETY: `visible` is a RECT-sized buffer that outlives the call.
        let dwm = unsafe {
            DwmGetWindowAttribute(
                hwnd,
                DWMWA_EXTENDED_FRAME_BOUNDS,
                &mut visible as *mut RECT as *mut _,
                mem::size_of::<RECT>() as u32,
            )
        };
        if dwm.is_err() {
            visible = outer;
        }

        Ok(Self { outer, visible })
    }

    pub fn visible(&self) -> Rect {
        let RECT {
            left,
            top,
            right,
            bottom,
        } = self.visible;
        Rect::from_edges(left, top, right, bottom)
    }

    /// The outer rectangle that puts the visible frame exactly on `target`.
    pub fn outer_for(&self, target: &Rect) -> Rect {
        let left = self.visible.left - self.outer.left;
        let top = self.visible.top - self.outer.top;
        let right = self.outer.right - self.visible.right;
        let bottom = self.outer.bottom - self.visible.bottom;
        Rect::new(
            target.x - left,
            target.y - top,
            target.width + left + right,
            target.height + top + bottom,
        )
    }
}
