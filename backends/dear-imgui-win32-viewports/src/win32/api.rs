//! The slice of user32 the viewport platform depends on

use bitflags::bitflags;

use crate::{ExtendedStyle, NativeStyle, NativeWindow};

/// Screen-space rectangle in physical pixels (`RECT`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Build from a GUI-space position and size, truncating toward zero
    pub fn from_pos_size(pos: [f32; 2], size: [f32; 2]) -> Self {
        // Plain casts: the right/bottom edges truncate independently of the
        // origin, so a fractional size can lose one pixel.
        let left = pos[0] as i32;
        let top = pos[1] as i32;
        Self {
            left,
            top,
            right: (pos[0] + size[0]) as i32,
            bottom: (pos[1] + size[1]) as i32,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

bitflags! {
    /// `SWP_*` flags for [`WindowManager::set_window_pos`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SetPosFlags: u32 {
        const NO_SIZE = 0x0001;
        const NO_MOVE = 0x0002;
        const NO_Z_ORDER = 0x0004;
        const NO_ACTIVATE = 0x0010;
        const FRAME_CHANGED = 0x0020;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowCommand {
    /// `SW_SHOW`
    Show,
    /// `SW_SHOWNA`: show without activating
    ShowNoActivate,
}

/// One display monitor as reported by `GetMonitorInfoW`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorInfo {
    pub monitor: Rect,
    pub work: Rect,
    pub primary: bool,
}

/// Native window-manager operations.
///
/// Implemented by [`User32`](super::User32) on Windows and by the in-memory
/// simulator for tests. Calls on handles that no longer exist are ignored or
/// return neutral values, as the OS does.
pub trait WindowManager {
    /// Write `GWL_STYLE` and `GWL_EXSTYLE`
    fn set_window_style(&self, hwnd: NativeWindow, style: NativeStyle);
    fn ex_style(&self, hwnd: NativeWindow) -> ExtendedStyle;
    fn set_ex_style(&self, hwnd: NativeWindow, ex_style: ExtendedStyle);

    /// Grow a client rectangle into the window rectangle a window with `style`
    /// needs (`AdjustWindowRectEx`, no menu)
    fn adjust_window_rect(&self, client: Rect, style: NativeStyle) -> Rect;

    /// `SetWindowPos` with a null insert-after handle
    fn set_window_pos(&self, hwnd: NativeWindow, rect: Rect, flags: SetPosFlags);
    fn show_window(&self, hwnd: NativeWindow, command: ShowCommand);

    /// Screen coordinates of a client-area point
    fn client_to_screen(&self, hwnd: NativeWindow, point: Point) -> Point;
    fn client_rect(&self, hwnd: NativeWindow) -> Rect;

    /// Bring to front, make foreground, give keyboard focus
    fn focus_window(&self, hwnd: NativeWindow);
    fn foreground_window(&self) -> Option<NativeWindow>;
    fn is_iconic(&self, hwnd: NativeWindow) -> bool;

    /// `title` is NUL-terminated UTF-16
    fn set_window_text(&self, hwnd: NativeWindow, title: &[u16]);

    /// Whole-window alpha for a layered window
    fn set_layered_alpha(&self, hwnd: NativeWindow, alpha: u8);

    fn capture(&self) -> Option<NativeWindow>;
    fn release_capture(&self);
    fn set_capture(&self, hwnd: NativeWindow);

    /// Cursor in physical screen pixels, `None` when the query fails
    fn cursor_pos(&self) -> Option<Point>;
    fn window_from_point(&self, point: Point) -> Option<NativeWindow>;
    fn is_child(&self, parent: NativeWindow, child: NativeWindow) -> bool;

    /// Monitors in OS enumeration order. Monitors whose info query fails are
    /// left out.
    fn monitors(&self) -> Vec<MonitorInfo>;
}

/// Client rectangle at `pos` grown by the frame of `style`
pub(crate) fn window_rect_for_client(
    wm: &dyn WindowManager,
    pos: [f32; 2],
    size: [f32; 2],
    style: NativeStyle,
) -> Rect {
    wm.adjust_window_rect(Rect::from_pos_size(pos, size), style)
}
