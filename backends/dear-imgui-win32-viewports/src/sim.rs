//! In-memory window manager and shell for exercising the platform without a
//! desktop.
//!
//! [`SimWindowManager`] models just enough of user32 for the viewport hooks:
//! window rectangles with a fixed frame for overlapped windows, z-order,
//! foreground/capture state, the cursor and a monitor list. Every call that
//! changes state is appended to a call log.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::win32::{MonitorInfo, Point, Rect, SetPosFlags, ShowCommand, WindowManager};
use crate::{
    ContextKey, ExtendedStyle, HostError, NativeStyle, NativeWindow, ViewportHost, WindowKey,
    WindowStyle,
};

/// Non-client insets of an overlapped window: left, top (caption), right, bottom
pub const OVERLAPPED_FRAME: Rect = Rect {
    left: 8,
    top: 31,
    right: 8,
    bottom: 8,
};

fn frame_of(style: NativeStyle) -> Rect {
    if style.style.contains(WindowStyle::OVERLAPPED_WINDOW) {
        OVERLAPPED_FRAME
    } else {
        Rect::default()
    }
}

/// State of one simulated window
#[derive(Debug, Clone, PartialEq)]
pub struct SimWindow {
    pub title: String,
    pub style: NativeStyle,
    /// Outer window rectangle, frame included
    pub rect: Rect,
    pub visible: bool,
    pub iconic: bool,
    pub alpha: Option<u8>,
    pub parent: Option<NativeWindow>,
    /// How many times the window was activated by being shown
    pub activations: u32,
}

#[derive(Debug, Default)]
struct SimState {
    windows: BTreeMap<isize, SimWindow>,
    z_order: Vec<isize>,
    next_hwnd: isize,
    foreground: Option<NativeWindow>,
    focus: Option<NativeWindow>,
    capture: Option<NativeWindow>,
    cursor: Option<Point>,
    monitors: Vec<Option<MonitorInfo>>,
    calls: Vec<String>,
}

impl SimState {
    fn window_mut(&mut self, hwnd: NativeWindow) -> Option<&mut SimWindow> {
        self.windows.get_mut(&hwnd.0)
    }

    fn raise(&mut self, hwnd: NativeWindow) {
        self.z_order.retain(|h| *h != hwnd.0);
        self.z_order.push(hwnd.0);
    }
}

/// Shared-state user32 model. Clones observe the same desktop.
#[derive(Debug, Clone, Default)]
pub struct SimWindowManager {
    state: Rc<RefCell<SimState>>,
}

impl SimWindowManager {
    pub fn new() -> Self {
        let sim = Self::default();
        sim.state.borrow_mut().next_hwnd = 0x100;
        sim
    }

    fn insert(&self, window: SimWindow) -> NativeWindow {
        let mut state = self.state.borrow_mut();
        let hwnd = state.next_hwnd;
        state.next_hwnd += 0x10;
        state.windows.insert(hwnd, window);
        state.z_order.push(hwnd);
        state.calls.push(format!("create_window({hwnd:#x})"));
        NativeWindow(hwnd)
    }

    /// A visible top-level overlapped window with the given outer rect
    pub fn open_window(&self, title: &str, rect: Rect) -> NativeWindow {
        self.insert(SimWindow {
            title: title.to_owned(),
            style: NativeStyle::for_flags(Default::default()),
            rect,
            visible: true,
            iconic: false,
            alpha: None,
            parent: None,
            activations: 0,
        })
    }

    /// A hidden top-level window, the way a shell creates one before styling
    pub fn open_hidden(&self, title: &str) -> NativeWindow {
        self.insert(SimWindow {
            title: title.to_owned(),
            style: NativeStyle::for_flags(Default::default()),
            rect: Rect {
                left: 0,
                top: 0,
                right: 640,
                bottom: 480,
            },
            visible: false,
            iconic: false,
            alpha: None,
            parent: None,
            activations: 0,
        })
    }

    /// A child control of `parent`, excluded from hit testing
    pub fn open_child(&self, parent: NativeWindow) -> NativeWindow {
        self.insert(SimWindow {
            title: String::new(),
            style: NativeStyle::default(),
            rect: Rect::default(),
            visible: false,
            iconic: false,
            alpha: None,
            parent: Some(parent),
            activations: 0,
        })
    }

    /// Destroy a window. Like the OS, this drops capture and focus it held.
    pub fn close_window(&self, hwnd: NativeWindow) {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("destroy_window({:#x})", hwnd.0));
        state.windows.remove(&hwnd.0);
        state.z_order.retain(|h| *h != hwnd.0);
        if state.capture == Some(hwnd) {
            state.capture = None;
        }
        if state.foreground == Some(hwnd) {
            state.foreground = None;
        }
        if state.focus == Some(hwnd) {
            state.focus = None;
        }
    }

    pub fn window(&self, hwnd: NativeWindow) -> Option<SimWindow> {
        self.state.borrow().windows.get(&hwnd.0).cloned()
    }

    pub fn window_count(&self) -> usize {
        self.state.borrow().windows.len()
    }

    pub fn set_cursor(&self, cursor: Option<Point>) {
        self.state.borrow_mut().cursor = cursor;
    }

    pub fn set_foreground(&self, hwnd: Option<NativeWindow>) {
        self.state.borrow_mut().foreground = hwnd;
    }

    pub fn set_iconic(&self, hwnd: NativeWindow, iconic: bool) {
        if let Some(window) = self.state.borrow_mut().window_mut(hwnd) {
            window.iconic = iconic;
        }
    }

    /// Change a window's style the way the OS sometimes does on its own
    pub fn force_style(&self, hwnd: NativeWindow, style: NativeStyle) {
        if let Some(window) = self.state.borrow_mut().window_mut(hwnd) {
            window.style = style;
        }
    }

    pub fn push_monitor(&self, monitor: MonitorInfo) {
        self.state.borrow_mut().monitors.push(Some(monitor));
    }

    /// A monitor whose info query fails
    pub fn push_broken_monitor(&self) {
        self.state.borrow_mut().monitors.push(None);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl WindowManager for SimWindowManager {
    fn set_window_style(&self, hwnd: NativeWindow, style: NativeStyle) {
        self.record(format!("set_window_style({:#x})", hwnd.0));
        if let Some(window) = self.state.borrow_mut().window_mut(hwnd) {
            window.style = style;
        }
    }

    fn ex_style(&self, hwnd: NativeWindow) -> ExtendedStyle {
        self.state
            .borrow()
            .windows
            .get(&hwnd.0)
            .map(|w| w.style.ex_style)
            .unwrap_or_default()
    }

    fn set_ex_style(&self, hwnd: NativeWindow, ex_style: ExtendedStyle) {
        self.record(format!("set_ex_style({:#x}, {:#x})", hwnd.0, ex_style.bits()));
        if let Some(window) = self.state.borrow_mut().window_mut(hwnd) {
            window.style.ex_style = ex_style;
        }
    }

    fn adjust_window_rect(&self, client: Rect, style: NativeStyle) -> Rect {
        let frame = frame_of(style);
        Rect {
            left: client.left - frame.left,
            top: client.top - frame.top,
            right: client.right + frame.right,
            bottom: client.bottom + frame.bottom,
        }
    }

    fn set_window_pos(&self, hwnd: NativeWindow, rect: Rect, flags: SetPosFlags) {
        self.record(format!(
            "set_window_pos({:#x}, {:#x})",
            hwnd.0,
            flags.bits()
        ));
        let mut state = self.state.borrow_mut();
        let Some(window) = state.window_mut(hwnd) else {
            return;
        };
        let current = window.rect;
        let (left, top) = if flags.contains(SetPosFlags::NO_MOVE) {
            (current.left, current.top)
        } else {
            (rect.left, rect.top)
        };
        let (width, height) = if flags.contains(SetPosFlags::NO_SIZE) {
            (current.width(), current.height())
        } else {
            (rect.width(), rect.height())
        };
        window.rect = Rect {
            left,
            top,
            right: left + width,
            bottom: top + height,
        };
        if !flags.contains(SetPosFlags::NO_ACTIVATE) {
            state.foreground = Some(hwnd);
        }
    }

    fn show_window(&self, hwnd: NativeWindow, command: ShowCommand) {
        self.record(format!("show_window({:#x}, {command:?})", hwnd.0));
        let mut state = self.state.borrow_mut();
        let Some(window) = state.window_mut(hwnd) else {
            return;
        };
        window.visible = true;
        if command == ShowCommand::Show {
            window.activations += 1;
            state.foreground = Some(hwnd);
            state.raise(hwnd);
        }
    }

    fn client_to_screen(&self, hwnd: NativeWindow, point: Point) -> Point {
        let state = self.state.borrow();
        match state.windows.get(&hwnd.0) {
            Some(window) => {
                let frame = frame_of(window.style);
                Point {
                    x: window.rect.left + frame.left + point.x,
                    y: window.rect.top + frame.top + point.y,
                }
            }
            None => point,
        }
    }

    fn client_rect(&self, hwnd: NativeWindow) -> Rect {
        let state = self.state.borrow();
        let Some(window) = state.windows.get(&hwnd.0) else {
            return Rect::default();
        };
        let frame = frame_of(window.style);
        Rect {
            left: 0,
            top: 0,
            right: window.rect.width() - frame.left - frame.right,
            bottom: window.rect.height() - frame.top - frame.bottom,
        }
    }

    fn focus_window(&self, hwnd: NativeWindow) {
        self.record(format!("focus_window({:#x})", hwnd.0));
        let mut state = self.state.borrow_mut();
        if !state.windows.contains_key(&hwnd.0) {
            return;
        }
        state.raise(hwnd);
        state.foreground = Some(hwnd);
        state.focus = Some(hwnd);
    }

    fn foreground_window(&self) -> Option<NativeWindow> {
        self.state.borrow().foreground
    }

    fn is_iconic(&self, hwnd: NativeWindow) -> bool {
        self.state
            .borrow()
            .windows
            .get(&hwnd.0)
            .is_some_and(|w| w.iconic)
    }

    fn set_window_text(&self, hwnd: NativeWindow, title: &[u16]) {
        assert_eq!(title.last(), Some(&0), "title must be NUL-terminated");
        let text = String::from_utf16_lossy(&title[..title.len() - 1]);
        self.record(format!("set_window_text({:#x}, {text:?})", hwnd.0));
        if let Some(window) = self.state.borrow_mut().window_mut(hwnd) {
            window.title = text;
        }
    }

    fn set_layered_alpha(&self, hwnd: NativeWindow, alpha: u8) {
        self.record(format!("set_layered_alpha({:#x}, {alpha})", hwnd.0));
        if let Some(window) = self.state.borrow_mut().window_mut(hwnd) {
            window.alpha = Some(alpha);
        }
    }

    fn capture(&self) -> Option<NativeWindow> {
        self.state.borrow().capture
    }

    fn release_capture(&self) {
        self.record("release_capture".to_owned());
        self.state.borrow_mut().capture = None;
    }

    fn set_capture(&self, hwnd: NativeWindow) {
        self.record(format!("set_capture({:#x})", hwnd.0));
        self.state.borrow_mut().capture = Some(hwnd);
    }

    fn cursor_pos(&self) -> Option<Point> {
        self.state.borrow().cursor
    }

    fn window_from_point(&self, point: Point) -> Option<NativeWindow> {
        let state = self.state.borrow();
        state
            .z_order
            .iter()
            .rev()
            .filter_map(|h| state.windows.get(h).map(|w| (*h, w)))
            .find(|(_, w)| {
                w.visible
                    && !w.iconic
                    && point.x >= w.rect.left
                    && point.x < w.rect.right
                    && point.y >= w.rect.top
                    && point.y < w.rect.bottom
            })
            .map(|(h, _)| NativeWindow(h))
    }

    fn is_child(&self, parent: NativeWindow, child: NativeWindow) -> bool {
        let state = self.state.borrow();
        let mut current = state.windows.get(&child.0).and_then(|w| w.parent);
        while let Some(hwnd) = current {
            if hwnd == parent {
                return true;
            }
            current = state.windows.get(&hwnd.0).and_then(|w| w.parent);
        }
        false
    }

    fn monitors(&self) -> Vec<MonitorInfo> {
        self.state.borrow().monitors.iter().flatten().copied().collect()
    }
}

/// Recording [`ViewportHost`] whose windows live in a [`SimWindowManager`]
#[derive(Debug)]
pub struct SimHost {
    wm: SimWindowManager,
    windows: BTreeMap<WindowKey, NativeWindow>,
    contexts: BTreeMap<ContextKey, WindowKey>,
    next_window: u32,
    next_context: u32,
    dpi_scale: f32,
    max_windows: Option<usize>,
    fail_contexts: bool,
    pub created_windows: Vec<WindowKey>,
    pub destroyed_windows: Vec<WindowKey>,
    pub discarded_contexts: Vec<ContextKey>,
}

impl SimHost {
    pub fn new(wm: SimWindowManager) -> Self {
        Self {
            wm,
            windows: BTreeMap::new(),
            contexts: BTreeMap::new(),
            next_window: 1,
            next_context: 1,
            dpi_scale: 1.0,
            max_windows: None,
            fail_contexts: false,
            created_windows: Vec::new(),
            destroyed_windows: Vec::new(),
            discarded_contexts: Vec::new(),
        }
    }

    pub fn with_dpi_scale(mut self, dpi_scale: f32) -> Self {
        self.dpi_scale = dpi_scale;
        self
    }

    pub fn with_max_windows(mut self, max_windows: usize) -> Self {
        self.max_windows = Some(max_windows);
        self
    }

    /// Make every following `create_context` fail
    pub fn fail_contexts(&mut self, fail: bool) {
        self.fail_contexts = fail;
    }

    fn next_window_key(&mut self) -> WindowKey {
        let key = WindowKey(self.next_window);
        self.next_window += 1;
        key
    }

    /// Register a native window the shell did not create through this host
    pub fn adopt(&mut self, hwnd: NativeWindow) -> WindowKey {
        let key = self.next_window_key();
        self.windows.insert(key, hwnd);
        key
    }

    pub fn live_windows(&self) -> usize {
        self.windows.len()
    }

    pub fn live_contexts(&self) -> usize {
        self.contexts.len()
    }

    /// The window a live context renders into
    pub fn context_window(&self, context: ContextKey) -> Option<WindowKey> {
        self.contexts.get(&context).copied()
    }
}

impl ViewportHost for SimHost {
    fn create_window(&mut self, title: &str) -> Result<WindowKey, HostError> {
        if let Some(limit) = self.max_windows
            && self.windows.len() >= limit
        {
            return Err(HostError::WindowLimit { limit });
        }
        let hwnd = self.wm.open_hidden(title);
        let key = self.next_window_key();
        self.windows.insert(key, hwnd);
        self.created_windows.push(key);
        Ok(key)
    }

    fn destroy_window(&mut self, window: WindowKey) {
        if let Some(hwnd) = self.windows.remove(&window) {
            self.wm.close_window(hwnd);
            self.destroyed_windows.push(window);
        }
    }

    fn create_context(&mut self, window: WindowKey) -> Result<ContextKey, HostError> {
        if !self.windows.contains_key(&window) {
            return Err(HostError::UnknownWindow(window));
        }
        if self.fail_contexts {
            return Err(HostError::ContextCreation {
                window,
                reason: "simulated failure".to_owned(),
            });
        }
        let key = ContextKey(self.next_context);
        self.next_context += 1;
        self.contexts.insert(key, window);
        Ok(key)
    }

    fn discard_context(&mut self, context: ContextKey) {
        if self.contexts.remove(&context).is_some() {
            self.discarded_contexts.push(context);
        }
    }

    fn native_handle(&self, window: WindowKey) -> Option<NativeWindow> {
        self.windows.get(&window).copied()
    }

    fn dpi_scale(&self) -> f32 {
        self.dpi_scale
    }
}
