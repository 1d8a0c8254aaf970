//! Application host: winit event handling, startup and shutdown

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use dear_imgui_rs::{BackendFlags, ConfigFlags, Context, Io, StyleColor, sys};
use dear_imgui_wgpu::{GammaMode, WgpuInitInfo, WgpuRenderer};
use dear_imgui_win32_viewports::{
    MainViewport, MonitorList, ViewportFlags, ViewportId, WindowKey, hooks,
};
use dear_imgui_winit::{HiDpiMode, WinitPlatform};
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::HostConfig;
use crate::error::AppError;
use crate::gpu::{Gpu, SurfaceRegistry};
use crate::inspector::{Capabilities, Inspector};
use crate::menus::MenuState;
use crate::quit::QuitPrompt;
use crate::shell::{EventLoopScope, WinitWgpuHost};

/// Whether the event loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Whether a window event is passed on to Dear ImGui.
///
/// Cursor motion is skipped everywhere: the mouse bridge reports absolute
/// desktop positions instead. Window-geometry events only matter for the main
/// window, which defines the display size.
pub fn forwards_to_gui(event: &WindowEvent, is_main: bool) -> bool {
    match event {
        WindowEvent::CursorMoved { .. }
        | WindowEvent::CursorEntered { .. }
        | WindowEvent::CursorLeft { .. } => false,
        WindowEvent::Resized(_)
        | WindowEvent::Moved(_)
        | WindowEvent::ScaleFactorChanged { .. }
        | WindowEvent::CloseRequested
        | WindowEvent::Destroyed
        | WindowEvent::RedrawRequested => is_main,
        _ => true,
    }
}

/// Everything the host owns once the main window exists
pub struct AppContext {
    pub(crate) config: HostConfig,
    pub(crate) gpu: Rc<Gpu>,
    pub(crate) surfaces: Rc<RefCell<SurfaceRegistry>>,
    pub(crate) main_window: Arc<Window>,
    pub(crate) main_key: WindowKey,
    pub(crate) imgui: Context,
    pub(crate) platform: WinitPlatform,
    pub(crate) renderer: Option<WgpuRenderer>,
    pub(crate) inspector: Inspector,
    pub(crate) quit: QuitPrompt,
    pub(crate) menus: MenuState,
    pub(crate) monitors: MonitorList,
    pub(crate) last_frame: Instant,
}

impl AppContext {
    pub fn new(event_loop: &ActiveEventLoop, config: HostConfig) -> Result<Self, AppError> {
        let attributes = Window::default_attributes()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(config.window_size.0, config.window_size.1));
        let main_window = Arc::new(event_loop.create_window(attributes)?);

        let (gpu, surface) = Gpu::new(main_window.clone(), config.present_mode)?;

        let mut registry = SurfaceRegistry::new(config.max_windows);
        let main_key = registry.insert_window(main_window.clone())?;
        let main_context =
            registry.insert_context(gpu.wrap_surface(main_key, surface, main_window.inner_size()));

        let mut imgui = Context::create();
        imgui
            .set_ini_filename(config.ini_filename.clone())
            .map_err(|e| AppError::Gui(e.to_string()))?;
        configure_io(imgui.io_mut());
        configure_style(&mut imgui);

        let mut platform = WinitPlatform::new(&mut imgui);
        platform.attach_window(&main_window, HiDpiMode::Default, &mut imgui);

        let init_info = WgpuInitInfo::new(gpu.device.clone(), gpu.queue.clone(), gpu.format)
            .with_instance(gpu.instance.clone())
            .with_adapter(gpu.adapter.clone());
        let mut renderer = WgpuRenderer::new(init_info, &mut imgui)
            .map_err(|e| AppError::Renderer(e.to_string()))?;
        renderer.set_gamma_mode(GammaMode::Auto);

        imgui
            .set_platform_name(Some(format!(
                "dear-imgui-win32-viewports {}",
                env!("CARGO_PKG_VERSION")
            )))
            .map_err(|e| AppError::Gui(e.to_string()))?;
        imgui
            .set_renderer_name(Some(format!("dear-imgui-wgpu {}", env!("CARGO_PKG_VERSION"))))
            .map_err(|e| AppError::Gui(e.to_string()))?;

        let inspector = Inspector::new(Capabilities::of(&gpu.adapter, &gpu.device));
        let gpu = Rc::new(gpu);
        let surfaces = Rc::new(RefCell::new(registry));

        let host = WinitWgpuHost::new(gpu.clone(), surfaces.clone(), main_key);
        let main = MainViewport {
            id: hooks::MAIN_VIEWPORT_ID,
            window: main_key,
            context: main_context,
            flags: ViewportFlags::empty(),
        };
        install_platform(&mut imgui, host, main, &config.secondary_title)?;

        let menus = MenuState::new(config.dockspace);
        let mut context = Self {
            config,
            gpu,
            surfaces,
            main_window,
            main_key,
            imgui,
            platform,
            renderer: Some(renderer),
            inspector,
            quit: QuitPrompt::default(),
            menus,
            monitors: MonitorList::new(),
            last_frame: Instant::now(),
        };
        context.refresh_monitors();
        info!("Host initialized");
        Ok(context)
    }

    pub fn handle_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) -> Result<Flow, AppError> {
        let found = {
            let surfaces = self.surfaces.borrow();
            surfaces
                .find_window(|window| window.id() == window_id)
                .and_then(|key| surfaces.window(key).cloned().map(|window| (key, window)))
        };
        let Some((key, window)) = found else {
            return Ok(Flow::Continue);
        };
        let is_main = key == self.main_key;

        if forwards_to_gui(&event, is_main) {
            let full_event: Event<()> = Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            self.platform
                .handle_event(&mut self.imgui, &window, &full_event);
        }

        match event {
            WindowEvent::RedrawRequested if is_main => {
                return self.frame(event_loop);
            }
            WindowEvent::CloseRequested if is_main => self.quit.request(),
            WindowEvent::CloseRequested => self.request_viewport_close(key),
            WindowEvent::Resized(size) => {
                let device = &self.gpu.device;
                for (_, target) in self.surfaces.borrow_mut().contexts_mut() {
                    if target.window == key {
                        target.resize(device, size);
                    }
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => self.monitors.invalidate(),
            _ => {}
        }
        Ok(Flow::Continue)
    }

    /// Raise Dear ImGui's close request for the viewport shown in `window`
    fn request_viewport_close(&mut self, window: WindowKey) {
        let Some(id) = hooks::with_platform(|p| p.viewport_for_window(window)).flatten() else {
            warn!(?window, "Close requested for a window without a viewport");
            return;
        };
        if let Some(viewport) = self
            .imgui
            .platform_io_mut()
            .viewports_iter_mut()
            .find(|viewport| ViewportId(viewport.id()) == id)
        {
            viewport.set_platform_request_close(true);
        }
    }

    /// Tear down in dependency order: platform windows, hooks, renderer,
    /// inspector, then surfaces and windows.
    pub fn shutdown(mut self, event_loop: &ActiveEventLoop) {
        {
            let _scope = EventLoopScope::enter(event_loop);
            self.imgui.destroy_platform_windows();
        }
        if hooks::uninstall(&mut self.imgui).is_none() {
            warn!("Viewport platform was not installed at shutdown");
        }

        let Self {
            renderer,
            inspector,
            surfaces,
            ..
        } = self;
        drop(renderer);
        drop(inspector);
        surfaces.borrow_mut().clear();
        info!("Host shut down");
    }
}

fn configure_io(io: &mut Io) {
    let mut flags = io.config_flags();
    flags.insert(
        ConfigFlags::NAV_ENABLE_KEYBOARD
            | ConfigFlags::DOCKING_ENABLE
            | ConfigFlags::VIEWPORTS_ENABLE,
    );
    io.set_config_flags(flags);

    let mut backend = io.backend_flags();
    backend.insert(
        BackendFlags::HAS_MOUSE_CURSORS
            | BackendFlags::RENDERER_HAS_VTX_OFFSET
            | BackendFlags::RENDERER_HAS_VIEWPORTS,
    );
    io.set_backend_flags(backend);

    // `Io` is a transparent wrapper over `ImGuiIO`
    let raw = io as *mut Io as *mut sys::ImGuiIO;
    unsafe {
        (*raw).ConfigWindowsMoveFromTitleBarOnly = false;
    }
}

/// Square, opaque windows so secondary viewports match the OS frame
fn configure_style(imgui: &mut Context) {
    let style = imgui.style_mut();
    style.set_window_rounding(0.0);
    let mut bg = style.color(StyleColor::WindowBg);
    bg[3] = 1.0;
    style.set_color(StyleColor::WindowBg, bg);
}

#[cfg(windows)]
fn install_platform(
    imgui: &mut Context,
    host: WinitWgpuHost,
    main: MainViewport,
    secondary_title: &str,
) -> Result<(), AppError> {
    use dear_imgui_win32_viewports::win32::{User32, Win32Viewports};

    let platform = Win32Viewports::new(host, User32, main).with_secondary_title(secondary_title);
    hooks::install(imgui, platform);
    Ok(())
}

#[cfg(not(windows))]
fn install_platform(
    _imgui: &mut Context,
    _host: WinitWgpuHost,
    _main: MainViewport,
    _secondary_title: &str,
) -> Result<(), AppError> {
    Err(AppError::Unsupported)
}

/// winit application wrapper around [`AppContext`]
pub struct App {
    config: HostConfig,
    context: Option<AppContext>,
    error: Option<AppError>,
}

impl App {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            context: None,
            error: None,
        }
    }

    /// The error that stopped the loop, if any
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.context.is_some() {
            return;
        }
        match AppContext::new(event_loop, self.config.clone()) {
            Ok(context) => {
                context.main_window.request_redraw();
                self.context = Some(context);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(context) = self.context.as_mut() else {
            return;
        };
        match context.handle_window_event(event_loop, window_id, event) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => {
                info!("Quit confirmed");
                event_loop.exit();
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(context) = &self.context {
            context.main_window.request_redraw();
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(context) = self.context.take() {
            context.shutdown(event_loop);
        }
    }
}

/// Run the host until the user confirms quitting
pub fn run(config: HostConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    app.take_error().map_or(Ok(()), Err)
}
