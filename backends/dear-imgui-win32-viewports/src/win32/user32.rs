//! [`WindowManager`] over the real user32 API

use windows_sys::Win32::Foundation::{BOOL, LPARAM, POINT, RECT, TRUE};
use windows_sys::Win32::Graphics::Gdi::{
    ClientToScreen, EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO,
};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    GetCapture, ReleaseCapture, SetCapture, SetFocus,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRectEx, BringWindowToTop, GWL_EXSTYLE, GWL_STYLE, GetClientRect, GetCursorPos,
    GetForegroundWindow, GetWindowLongW, IsChild, IsIconic, LWA_ALPHA, MONITORINFOF_PRIMARY,
    SW_SHOW, SW_SHOWNA, SetForegroundWindow, SetLayeredWindowAttributes, SetWindowLongW,
    SetWindowPos, SetWindowTextW, ShowWindow, WindowFromPoint,
};

use super::api::{MonitorInfo, Point, Rect, SetPosFlags, ShowCommand, WindowManager};
use crate::{ExtendedStyle, NativeStyle, NativeWindow};

/// [`WindowManager`] backed by the real user32/gdi32 API
#[derive(Debug, Clone, Copy, Default)]
pub struct User32;

impl From<RECT> for Rect {
    fn from(r: RECT) -> Self {
        Rect {
            left: r.left,
            top: r.top,
            right: r.right,
            bottom: r.bottom,
        }
    }
}

impl From<Rect> for RECT {
    fn from(r: Rect) -> Self {
        RECT {
            left: r.left,
            top: r.top,
            right: r.right,
            bottom: r.bottom,
        }
    }
}

fn non_null(hwnd: isize) -> Option<NativeWindow> {
    (hwnd != 0).then_some(NativeWindow(hwnd))
}

impl WindowManager for User32 {
    fn set_window_style(&self, hwnd: NativeWindow, style: NativeStyle) {
        unsafe {
            SetWindowLongW(hwnd.0, GWL_STYLE, style.style.bits() as i32);
            SetWindowLongW(hwnd.0, GWL_EXSTYLE, style.ex_style.bits() as i32);
        }
    }

    fn ex_style(&self, hwnd: NativeWindow) -> ExtendedStyle {
        let bits = unsafe { GetWindowLongW(hwnd.0, GWL_EXSTYLE) };
        ExtendedStyle::from_bits_retain(bits as u32)
    }

    fn set_ex_style(&self, hwnd: NativeWindow, ex_style: ExtendedStyle) {
        unsafe {
            SetWindowLongW(hwnd.0, GWL_EXSTYLE, ex_style.bits() as i32);
        }
    }

    fn adjust_window_rect(&self, client: Rect, style: NativeStyle) -> Rect {
        let mut rect = RECT::from(client);
        let ok = unsafe {
            AdjustWindowRectEx(&mut rect, style.style.bits(), 0, style.ex_style.bits())
        };
        if ok == 0 {
            tracing::warn!(?style, "AdjustWindowRectEx failed, using the client rect");
            return client;
        }
        rect.into()
    }

    fn set_window_pos(&self, hwnd: NativeWindow, rect: Rect, flags: SetPosFlags) {
        let ok = unsafe {
            SetWindowPos(
                hwnd.0,
                0,
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                flags.bits(),
            )
        };
        if ok == 0 {
            tracing::warn!(?hwnd, ?rect, "SetWindowPos failed");
        }
    }

    fn show_window(&self, hwnd: NativeWindow, command: ShowCommand) {
        let cmd = match command {
            ShowCommand::Show => SW_SHOW,
            ShowCommand::ShowNoActivate => SW_SHOWNA,
        };
        unsafe {
            ShowWindow(hwnd.0, cmd);
        }
    }

    fn client_to_screen(&self, hwnd: NativeWindow, point: Point) -> Point {
        let mut pt = POINT {
            x: point.x,
            y: point.y,
        };
        unsafe {
            ClientToScreen(hwnd.0, &mut pt);
        }
        Point { x: pt.x, y: pt.y }
    }

    fn client_rect(&self, hwnd: NativeWindow) -> Rect {
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        unsafe {
            GetClientRect(hwnd.0, &mut rect);
        }
        rect.into()
    }

    fn focus_window(&self, hwnd: NativeWindow) {
        unsafe {
            BringWindowToTop(hwnd.0);
            SetForegroundWindow(hwnd.0);
            SetFocus(hwnd.0);
        }
    }

    fn foreground_window(&self) -> Option<NativeWindow> {
        non_null(unsafe { GetForegroundWindow() })
    }

    fn is_iconic(&self, hwnd: NativeWindow) -> bool {
        unsafe { IsIconic(hwnd.0) != 0 }
    }

    fn set_window_text(&self, hwnd: NativeWindow, title: &[u16]) {
        debug_assert_eq!(title.last(), Some(&0), "title must be NUL-terminated");
        unsafe {
            SetWindowTextW(hwnd.0, title.as_ptr());
        }
    }

    fn set_layered_alpha(&self, hwnd: NativeWindow, alpha: u8) {
        unsafe {
            SetLayeredWindowAttributes(hwnd.0, 0, alpha, LWA_ALPHA);
        }
    }

    fn capture(&self) -> Option<NativeWindow> {
        non_null(unsafe { GetCapture() })
    }

    fn release_capture(&self) {
        unsafe {
            ReleaseCapture();
        }
    }

    fn set_capture(&self, hwnd: NativeWindow) {
        unsafe {
            SetCapture(hwnd.0);
        }
    }

    fn cursor_pos(&self) -> Option<Point> {
        let mut pt = POINT { x: 0, y: 0 };
        let ok = unsafe { GetCursorPos(&mut pt) };
        (ok != 0).then_some(Point { x: pt.x, y: pt.y })
    }

    fn window_from_point(&self, point: Point) -> Option<NativeWindow> {
        non_null(unsafe {
            WindowFromPoint(POINT {
                x: point.x,
                y: point.y,
            })
        })
    }

    fn is_child(&self, parent: NativeWindow, child: NativeWindow) -> bool {
        unsafe { IsChild(parent.0, child.0) != 0 }
    }

    fn monitors(&self) -> Vec<MonitorInfo> {
        let mut out: Vec<MonitorInfo> = Vec::new();
        unsafe {
            EnumDisplayMonitors(
                0,
                std::ptr::null(),
                Some(collect_monitor),
                &mut out as *mut Vec<MonitorInfo> as LPARAM,
            );
        }
        out
    }
}

unsafe extern "system" fn collect_monitor(
    monitor: HMONITOR,
    _hdc: HDC,
    _clip: *mut RECT,
    data: LPARAM,
) -> BOOL {
    let out = unsafe { &mut *(data as *mut Vec<MonitorInfo>) };
    let mut info: MONITORINFO = unsafe { std::mem::zeroed() };
    info.cbSize = std::mem::size_of::<MONITORINFO>() as u32;
    if unsafe { GetMonitorInfoW(monitor, &mut info) } == 0 {
        // Keep enumerating; a monitor that cannot be queried is skipped.
        return TRUE;
    }
    out.push(MonitorInfo {
        monitor: info.rcMonitor.into(),
        work: info.rcWork.into(),
        primary: info.dwFlags & MONITORINFOF_PRIMARY != 0,
    });
    TRUE
}
