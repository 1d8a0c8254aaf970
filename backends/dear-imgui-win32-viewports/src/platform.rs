//! The per-OS viewport hook interface

use crate::{
    ContextKey, MonitorList, MouseUpdate, NativeWindow, PlatformError, ViewportFlags, ViewportId,
    ViewportState, WindowKey,
};

/// Follow-up work a hook asks of Dear ImGui.
///
/// `MoveAndResize` raises the viewport's `PlatformRequestMove` and
/// `PlatformRequestResize` so the next platform update pushes its rect again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reconcile {
    #[default]
    None,
    MoveAndResize,
}

impl Reconcile {
    pub fn is_needed(self) -> bool {
        self == Reconcile::MoveAndResize
    }
}

/// The application's own window, registered once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainViewport {
    pub id: ViewportId,
    pub window: WindowKey,
    pub context: ContextKey,
    pub flags: ViewportFlags,
}

/// Shell key and native handle of a viewport window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandles {
    pub window: WindowKey,
    pub native: NativeWindow,
}

/// Platform hooks Dear ImGui drives for secondary viewports.
///
/// One implementation exists per operating system. Hook methods are invoked
/// from `Context::update_platform_windows` and `destroy_platform_windows`;
/// everything else is for the application's frame loop.
///
/// Hooks that receive an id for which no window exists panic: Dear ImGui only
/// calls them for viewports it created through [`Self::create_window`].
pub trait ViewportPlatform {
    fn create_window(&mut self, viewport: &ViewportState) -> Result<Reconcile, PlatformError>;
    fn destroy_window(&mut self, id: ViewportId);
    fn show_window(&mut self, viewport: &ViewportState);

    /// Move the client area's top-left corner to `pos` (screen coordinates)
    fn set_window_pos(&mut self, id: ViewportId, pos: [f32; 2]);
    fn window_pos(&self, id: ViewportId) -> [f32; 2];

    /// Resize the client area
    fn set_window_size(&mut self, id: ViewportId, size: [f32; 2]);
    fn window_size(&self, id: ViewportId) -> [f32; 2];

    fn set_window_focus(&mut self, id: ViewportId);
    fn window_focus(&self, id: ViewportId) -> bool;
    fn window_minimized(&self, id: ViewportId) -> bool;
    fn set_window_title(&mut self, id: ViewportId, title: &str);

    /// `alpha` must lie in `0.0..=1.0`
    fn set_window_alpha(&mut self, id: ViewportId, alpha: f32);

    /// Re-derive the native style from the viewport's current flags
    fn update_window(&mut self, viewport: &ViewportState) -> Reconcile;
    fn window_dpi_scale(&self, id: ViewportId) -> f32;

    fn main_viewport(&self) -> MainViewport;
    fn window_handles(&self, id: ViewportId) -> Option<WindowHandles>;
    fn graphics_context(&self, id: ViewportId) -> Option<ContextKey>;
    fn viewport_flags(&self, id: ViewportId) -> Option<ViewportFlags>;
    fn viewport_for_window(&self, window: WindowKey) -> Option<ViewportId>;
    fn viewport_for_native(&self, native: NativeWindow) -> Option<ViewportId>;

    /// Rebuild `monitors` if it was invalidated. Returns whether it was rebuilt.
    fn refresh_monitors(&self, monitors: &mut MonitorList) -> bool;

    /// Sample the OS cursor against the known viewport windows.
    ///
    /// `live_flags` reports each viewport's current flags, which may be newer
    /// than the ones cached at the last update.
    fn poll_mouse(&self, live_flags: &dyn Fn(ViewportId) -> Option<ViewportFlags>)
    -> MouseUpdate;
}
