//! WGPU device and per-window surfaces

use std::sync::Arc;

use dear_imgui_win32_viewports::WindowKey;
use pollster::block_on;
use tracing::info;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::AppError;
use crate::registry::Registry;

/// Shared WGPU objects. One device renders every viewport.
pub struct Gpu {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub format: wgpu::TextureFormat,
    pub present_mode: wgpu::PresentMode,
}

/// A window's swap chain: the "graphics context" viewports render into
pub struct GraphicsContext {
    pub window: WindowKey,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

pub type SurfaceRegistry = Registry<Arc<Window>, GraphicsContext>;

/// sRGB formats first, otherwise whatever the surface lists first
pub fn pick_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ]
    .into_iter()
    .find(|f| formats.contains(f))
    .or_else(|| formats.first().copied())
}

/// `Fifo` is guaranteed to be supported and is used when `requested` is not
pub fn pick_present_mode(
    requested: wgpu::PresentMode,
    supported: &[wgpu::PresentMode],
) -> wgpu::PresentMode {
    if supported.contains(&requested) {
        requested
    } else {
        wgpu::PresentMode::Fifo
    }
}

impl Gpu {
    /// Create the device against the main window and return its surface
    pub fn new(
        window: Arc<Window>,
        present_mode: wgpu::PresentMode,
    ) -> Result<(Self, wgpu::Surface<'static>), AppError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        let (device, queue) = block_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_format(&caps.formats).ok_or(AppError::NoSurfaceFormat)?;
        let present_mode = pick_present_mode(present_mode, &caps.present_modes);

        let adapter_info = adapter.get_info();
        info!(
            adapter = %adapter_info.name,
            backend = ?adapter_info.backend,
            ?format,
            ?present_mode,
            "GPU ready"
        );

        Ok((
            Self {
                instance,
                adapter,
                device,
                queue,
                format,
                present_mode,
            },
            surface,
        ))
    }

    pub fn surface_config(&self, size: PhysicalSize<u32>) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: self.present_mode,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    /// Bind a configured surface to `window`
    pub fn create_context(
        &self,
        key: WindowKey,
        window: Arc<Window>,
    ) -> Result<GraphicsContext, AppError> {
        let size = window.inner_size();
        let surface = self.instance.create_surface(window)?;
        Ok(self.wrap_surface(key, surface, size))
    }

    pub fn wrap_surface(
        &self,
        key: WindowKey,
        surface: wgpu::Surface<'static>,
        size: PhysicalSize<u32>,
    ) -> GraphicsContext {
        let config = self.surface_config(size);
        surface.configure(&self.device, &config);
        GraphicsContext {
            window: key,
            surface,
            config,
        }
    }
}

impl GraphicsContext {
    /// Reconfigure for a new size. Zero-area sizes (minimized windows) are ignored.
    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) -> bool {
        if size.width == 0 || size.height == 0 {
            return false;
        }
        if self.config.width == size.width && self.config.height == size.height {
            return false;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(device, &self.config);
        true
    }

    pub fn reconfigure(&self, device: &wgpu::Device) {
        self.surface.configure(device, &self.config);
    }
}
