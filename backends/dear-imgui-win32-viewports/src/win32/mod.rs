//! Windows implementation of [`ViewportPlatform`]

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::mouse;
use crate::{
    ContextKey, ExtendedStyle, HostError, MainViewport, MonitorList, MouseUpdate, NativeStyle,
    NativeWindow, PlatformError, Reconcile, ViewportFlags, ViewportHost, ViewportId,
    ViewportPlatform, ViewportState, WindowHandles, WindowKey,
};

mod api;
#[cfg(windows)]
mod user32;

pub use api::{MonitorInfo, Point, Rect, SetPosFlags, ShowCommand, WindowManager};
#[cfg(windows)]
pub use user32::User32;

#[cfg(test)]
mod tests;

/// Title given to secondary windows until Dear ImGui sets their real one
pub const DEFAULT_SECONDARY_TITLE: &str = "Untitled";

/// Bookkeeping for one viewport window
#[derive(Debug, Clone, Copy)]
struct ViewportData {
    window: WindowKey,
    context: ContextKey,
    /// Style last written to the native window
    style: NativeStyle,
    flags: ViewportFlags,
    /// `false` for the main viewport, whose window belongs to the application
    owned: bool,
}

/// Viewport platform for Windows.
///
/// OS windows and graphics contexts come from the application through `H`;
/// styling, placement, focus, capture and alpha go through `W`.
pub struct Win32Viewports<H, W> {
    host: H,
    wm: W,
    viewports: HashMap<ViewportId, ViewportData>,
    main: MainViewport,
    secondary_title: String,
}

impl<H: ViewportHost, W: WindowManager> Win32Viewports<H, W> {
    /// Create the platform and register the application's main viewport.
    ///
    /// The main window keeps the style the shell gave it.
    pub fn new(host: H, wm: W, main: MainViewport) -> Self {
        let mut viewports = HashMap::new();
        viewports.insert(
            main.id,
            ViewportData {
                window: main.window,
                context: main.context,
                style: NativeStyle::for_flags(main.flags),
                flags: main.flags,
                owned: false,
            },
        );
        debug!(id = ?main.id, window = ?main.window, "Registered main viewport");
        Self {
            host,
            wm,
            viewports,
            main,
            secondary_title: DEFAULT_SECONDARY_TITLE.to_owned(),
        }
    }

    /// Title used when the shell opens a secondary window
    pub fn with_secondary_title(mut self, title: impl Into<String>) -> Self {
        self.secondary_title = title.into();
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn window_manager(&self) -> &W {
        &self.wm
    }

    /// Number of viewports with a live record, main included
    pub fn len(&self) -> usize {
        self.viewports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewports.is_empty()
    }

    fn data(&self, id: ViewportId) -> &ViewportData {
        match self.viewports.get(&id) {
            Some(data) => data,
            None => panic!("no platform data for viewport {id:?}"),
        }
    }

    fn native_of(&self, window: WindowKey) -> Option<NativeWindow> {
        self.host.native_handle(window).filter(|hwnd| !hwnd.is_null())
    }

    /// Native handle of a live viewport. Panics when either is missing.
    fn hwnd(&self, id: ViewportId) -> NativeWindow {
        let data = self.data(id);
        match self.native_of(data.window) {
            Some(hwnd) => hwnd,
            None => panic!("viewport {id:?} has no native window"),
        }
    }

    fn main_hwnd(&self) -> Option<NativeWindow> {
        self.native_of(self.main.window)
    }

    /// Write `style`, place the window so its client area covers the
    /// viewport rect, then show it. Showing is required after a style change.
    fn apply_style(&self, hwnd: NativeWindow, style: NativeStyle, pos: [f32; 2], size: [f32; 2]) {
        self.wm.set_window_style(hwnd, style);
        let rect = api::window_rect_for_client(&self.wm, pos, size, style);
        self.wm.set_window_pos(
            hwnd,
            rect,
            SetPosFlags::NO_Z_ORDER | SetPosFlags::NO_ACTIVATE | SetPosFlags::FRAME_CHANGED,
        );
        self.wm.show_window(hwnd, ShowCommand::ShowNoActivate);
    }

    fn open_window(&mut self) -> Result<(WindowKey, ContextKey), HostError> {
        let window = self.host.create_window(&self.secondary_title)?;
        match self.host.create_context(window) {
            Ok(context) => Ok((window, context)),
            Err(err) => {
                self.host.destroy_window(window);
                Err(err)
            }
        }
    }
}

impl<H: ViewportHost, W: WindowManager> ViewportPlatform for Win32Viewports<H, W> {
    fn create_window(&mut self, viewport: &ViewportState) -> Result<Reconcile, PlatformError> {
        let id = viewport.id;
        let (window, context) = self
            .open_window()
            .map_err(|source| PlatformError::Host { id, source })?;

        let style = NativeStyle::for_flags(viewport.flags);
        self.viewports.insert(
            id,
            ViewportData {
                window,
                context,
                style,
                flags: viewport.flags,
                owned: true,
            },
        );

        let hwnd = self.hwnd(id);
        self.apply_style(hwnd, style, viewport.pos, viewport.size);
        debug!(?id, ?window, ?context, ?style, "Created viewport window");
        Ok(Reconcile::MoveAndResize)
    }

    fn destroy_window(&mut self, id: ViewportId) {
        let data = *self.data(id);

        if !data.owned {
            self.viewports.remove(&id);
            debug!(?id, "Detached main viewport");
            return;
        }

        let hwnd = self.hwnd(id);
        if self.wm.capture() == Some(hwnd) {
            // Hand capture to the main window so a drag in progress still
            // receives its button release.
            self.wm.release_capture();
            if let Some(main) = self.main_hwnd() {
                self.wm.set_capture(main);
            }
            trace!(?id, "Moved mouse capture to main viewport");
        }

        self.viewports.remove(&id);
        self.host.destroy_window(data.window);
        self.host.discard_context(data.context);
        debug!(?id, window = ?data.window, "Destroyed viewport window");
    }

    fn show_window(&mut self, viewport: &ViewportState) {
        let hwnd = self.hwnd(viewport.id);
        let command = if viewport.flags.contains(ViewportFlags::NO_FOCUS_ON_APPEARING) {
            ShowCommand::ShowNoActivate
        } else {
            ShowCommand::Show
        };
        self.wm.show_window(hwnd, command);
    }

    fn set_window_pos(&mut self, id: ViewportId, pos: [f32; 2]) {
        let hwnd = self.hwnd(id);
        let style = self.data(id).style;
        let rect = api::window_rect_for_client(&self.wm, pos, [0.0, 0.0], style);
        self.wm.set_window_pos(
            hwnd,
            rect,
            SetPosFlags::NO_Z_ORDER | SetPosFlags::NO_SIZE | SetPosFlags::NO_ACTIVATE,
        );
    }

    fn window_pos(&self, id: ViewportId) -> [f32; 2] {
        let origin = self.wm.client_to_screen(self.hwnd(id), Point { x: 0, y: 0 });
        [origin.x as f32, origin.y as f32]
    }

    fn set_window_size(&mut self, id: ViewportId, size: [f32; 2]) {
        let hwnd = self.hwnd(id);
        let style = self.data(id).style;
        let rect = api::window_rect_for_client(&self.wm, [0.0, 0.0], size, style);
        self.wm.set_window_pos(
            hwnd,
            rect,
            SetPosFlags::NO_Z_ORDER | SetPosFlags::NO_MOVE | SetPosFlags::NO_ACTIVATE,
        );
    }

    fn window_size(&self, id: ViewportId) -> [f32; 2] {
        let rect = self.wm.client_rect(self.hwnd(id));
        [rect.width() as f32, rect.height() as f32]
    }

    fn set_window_focus(&mut self, id: ViewportId) {
        self.wm.focus_window(self.hwnd(id));
    }

    fn window_focus(&self, id: ViewportId) -> bool {
        self.wm.foreground_window() == Some(self.hwnd(id))
    }

    fn window_minimized(&self, id: ViewportId) -> bool {
        self.wm.is_iconic(self.hwnd(id))
    }

    fn set_window_title(&mut self, id: ViewportId, title: &str) {
        let wide: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();
        self.wm.set_window_text(self.hwnd(id), &wide);
    }

    fn set_window_alpha(&mut self, id: ViewportId, alpha: f32) {
        assert!(
            (0.0..=1.0).contains(&alpha),
            "viewport alpha out of range: {alpha}"
        );
        let hwnd = self.hwnd(id);
        let ex_style = self.wm.ex_style(hwnd);
        if alpha < 1.0 {
            self.wm.set_ex_style(hwnd, ex_style | ExtendedStyle::LAYERED);
            self.wm.set_layered_alpha(hwnd, (255.0 * alpha) as u8);
        } else {
            self.wm.set_ex_style(hwnd, ex_style - ExtendedStyle::LAYERED);
        }
    }

    fn update_window(&mut self, viewport: &ViewportState) -> Reconcile {
        let id = viewport.id;
        let hwnd = self.hwnd(id);
        let style = NativeStyle::for_flags(viewport.flags);

        let data = match self.viewports.get_mut(&id) {
            Some(data) => data,
            None => panic!("no platform data for viewport {id:?}"),
        };
        data.flags = viewport.flags;
        if !data.owned || data.style == style {
            return Reconcile::None;
        }
        data.style = style;

        self.apply_style(hwnd, style, viewport.pos, viewport.size);
        trace!(?id, ?style, "Reapplied viewport style");
        Reconcile::MoveAndResize
    }

    fn window_dpi_scale(&self, _id: ViewportId) -> f32 {
        self.host.dpi_scale()
    }

    fn main_viewport(&self) -> MainViewport {
        self.main
    }

    fn window_handles(&self, id: ViewportId) -> Option<WindowHandles> {
        let data = self.viewports.get(&id)?;
        let native = self.native_of(data.window)?;
        Some(WindowHandles {
            window: data.window,
            native,
        })
    }

    fn graphics_context(&self, id: ViewportId) -> Option<ContextKey> {
        self.viewports.get(&id).map(|data| data.context)
    }

    fn viewport_flags(&self, id: ViewportId) -> Option<ViewportFlags> {
        self.viewports.get(&id).map(|data| data.flags)
    }

    fn viewport_for_window(&self, window: WindowKey) -> Option<ViewportId> {
        self.viewports
            .iter()
            .find(|(_, data)| data.window == window)
            .map(|(id, _)| *id)
    }

    fn viewport_for_native(&self, native: NativeWindow) -> Option<ViewportId> {
        self.viewports
            .iter()
            .find(|(_, data)| self.native_of(data.window) == Some(native))
            .map(|(id, _)| *id)
    }

    fn refresh_monitors(&self, monitors: &mut MonitorList) -> bool {
        monitors.refresh_if_needed(&self.wm, self.host.dpi_scale())
    }

    fn poll_mouse(
        &self,
        live_flags: &dyn Fn(ViewportId) -> Option<ViewportFlags>,
    ) -> MouseUpdate {
        let Some(main) = self.main_hwnd() else {
            return MouseUpdate::default();
        };
        mouse::poll(
            &self.wm,
            main,
            self.host.dpi_scale(),
            &|hwnd| self.viewport_for_native(hwnd),
            live_flags,
        )
    }
}
