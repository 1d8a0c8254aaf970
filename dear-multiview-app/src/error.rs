use dear_imgui_win32_viewports::HostError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Window creation error: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("WGPU surface creation error: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("No suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("WGPU device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("WGPU error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("Surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("Renderer error: {0}")]
    Renderer(String),
    #[error("Dear ImGui error: {0}")]
    Gui(String),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("Native viewports require Windows")]
    Unsupported,
}
