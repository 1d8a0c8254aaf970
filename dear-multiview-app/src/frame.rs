//! Per-frame driver.
//!
//! Order matters: monitors and mouse are fed before the frame starts, the
//! platform hooks run inside `update_platform_windows`, and only then does
//! every viewport have a window and a surface to render into.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ptr::NonNull;

use dear_imgui_rs::render::DrawData;
use dear_imgui_rs::sys;
use dear_imgui_wgpu::WgpuRenderer;
use dear_imgui_win32_viewports::{
    ContextKey, ViewportFlags, ViewportId, ViewportState, hooks,
};
use tracing::{debug, trace};
use winit::event_loop::ActiveEventLoop;

use crate::error::AppError;
use crate::gpu::{Gpu, SurfaceRegistry};
use crate::host::{AppContext, Flow};
use crate::inspector::{ContextRow, FrameCalls};
use crate::menus::draw_dock_host;
use crate::quit::QuitDecision;
use crate::shell::EventLoopScope;

/// Minimum delta time handed to Dear ImGui, which rejects zero
const MIN_DELTA_TIME: f32 = 1.0e-6;

impl AppContext {
    pub(crate) fn frame(&mut self, event_loop: &ActiveEventLoop) -> Result<Flow, AppError> {
        self.refresh_monitors();
        self.feed_mouse();

        let now = std::time::Instant::now();
        let delta = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.imgui.io_mut().set_delta_time(delta.max(MIN_DELTA_TIME));
        self.platform.prepare_frame(&self.main_window, &mut self.imgui);

        let contexts = self.context_rows();
        let ui = self.imgui.frame();
        let actions = self.menus.draw(ui, &mut self.inspector);
        if draw_dock_host(ui, self.menus.dockspace).is_none() {
            trace!("Dock host hidden");
        }
        self.inspector.draw(ui, &contexts);
        let decision = self.quit.draw(ui);
        self.platform.prepare_render_with_ui(ui, &self.main_window);

        if actions.refresh_monitors {
            self.monitors.invalidate();
        }

        self.imgui.render();
        {
            let _scope = EventLoopScope::enter(event_loop);
            self.imgui.update_platform_windows();
        }
        self.render_viewports()?;
        self.inspector.end_frame();

        Ok(match decision {
            QuitDecision::Exit => Flow::Exit,
            QuitDecision::Stay => Flow::Continue,
        })
    }

    /// Rebuild the monitor list if it was invalidated and publish it
    pub(crate) fn refresh_monitors(&mut self) {
        let monitors = &mut self.monitors;
        let rebuilt = hooks::with_platform(|p| p.refresh_monitors(monitors)).unwrap_or(false);
        if rebuilt {
            self.monitors
                .write_to_platform_io(self.imgui.platform_io_mut());
        }
    }

    /// Queue this frame's absolute mouse position and hovered viewport
    fn feed_mouse(&mut self) {
        let live: HashMap<ViewportId, ViewportFlags> = self
            .imgui
            .platform_io_mut()
            .viewports_iter()
            .map(|viewport| {
                let state = ViewportState::of(viewport);
                (state.id, state.flags)
            })
            .collect();
        let lookup = |id: ViewportId| live.get(&id).copied();

        if let Some(update) = hooks::with_platform(|p| p.poll_mouse(&lookup)) {
            trace!(?update, "Mouse");
            update.apply(self.imgui.io_mut());
        }
    }

    fn context_rows(&self) -> Vec<ContextRow> {
        self.surfaces
            .borrow()
            .contexts()
            .map(|(context, target)| ContextRow {
                context,
                window: target.window,
                size: [target.config.width, target.config.height],
                format: target.config.format,
            })
            .collect()
    }

    /// Render every visible viewport into its own surface
    fn render_viewports(&mut self) -> Result<(), AppError> {
        let viewports: Vec<(ViewportState, Option<NonNull<sys::ImDrawData>>)> = self
            .imgui
            .platform_io_mut()
            .viewports_iter()
            .map(|viewport| (ViewportState::of(viewport), NonNull::new(viewport.draw_data())))
            .collect();
        let targets = render_targets(viewports, |id| {
            hooks::with_platform(|p| p.graphics_context(id)).flatten()
        });

        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        renderer
            .new_frame()
            .map_err(|e| AppError::Renderer(format!("new_frame failed: {e}")))?;

        let clear = self.config.wgpu_clear_color();
        let calls = self.inspector.calls_mut();
        for (context, draw_data) in targets {
            // SAFETY: `DrawData` is a `repr(C)` view of `ImDrawData`, and viewport
            // draw data stays valid until the next `Context::frame`
            let draw_data = unsafe { &*(draw_data.as_ptr() as *const DrawData) };
            render_viewport(
                &self.gpu,
                &self.surfaces,
                renderer,
                calls,
                context,
                draw_data,
                clear,
            )?;
        }
        Ok(())
    }
}

/// Pair each renderable viewport with its graphics context.
///
/// Minimized viewports, viewports without draw data and viewports the
/// platform has no context for are left out.
fn render_targets<D>(
    viewports: impl IntoIterator<Item = (ViewportState, Option<D>)>,
    context_of: impl Fn(ViewportId) -> Option<ContextKey>,
) -> Vec<(ContextKey, D)> {
    viewports
        .into_iter()
        .filter_map(|(state, draw_data)| {
            if state.flags.contains(ViewportFlags::IS_MINIMIZED) {
                return None;
            }
            let draw_data = draw_data?;
            let context = context_of(state.id)?;
            Some((context, draw_data))
        })
        .collect()
}

/// What to do with a viewport whose surface texture could not be acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRecovery {
    /// Reconfigure the surface and try again next frame
    Reconfigure,
    /// Drop this frame for the viewport
    Skip,
    Fail,
}

impl SurfaceRecovery {
    fn for_error(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigure,
            wgpu::SurfaceError::Timeout => Self::Skip,
            _ => Self::Fail,
        }
    }

    fn record(self, calls: &mut FrameCalls) {
        match self {
            Self::Reconfigure => {
                calls.reconfigures += 1;
                calls.skipped += 1;
            }
            Self::Skip => calls.skipped += 1,
            Self::Fail => {}
        }
    }
}

fn render_viewport(
    gpu: &Gpu,
    surfaces: &RefCell<SurfaceRegistry>,
    renderer: &mut WgpuRenderer,
    calls: &mut FrameCalls,
    context: ContextKey,
    draw_data: &DrawData,
    clear: wgpu::Color,
) -> Result<(), AppError> {
    let mut surfaces = surfaces.borrow_mut();
    let window_size = surfaces
        .context(context)
        .and_then(|target| surfaces.window(target.window))
        .map(|window| window.inner_size());
    let Some(target) = surfaces.context_mut(context) else {
        debug!(?context, "Viewport has no graphics context");
        calls.skipped += 1;
        return Ok(());
    };
    if let Some(size) = window_size
        && target.resize(&gpu.device, size)
    {
        calls.reconfigures += 1;
    }

    let frame = match target.surface.get_current_texture() {
        Ok(frame) => frame,
        Err(e) => {
            let recovery = SurfaceRecovery::for_error(&e);
            recovery.record(calls);
            match recovery {
                SurfaceRecovery::Reconfigure => {
                    debug!(?context, error = %e, "Reconfiguring surface");
                    target.reconfigure(&gpu.device);
                    return Ok(());
                }
                SurfaceRecovery::Skip => return Ok(()),
                SurfaceRecovery::Fail => return Err(e.into()),
            }
        }
    };
    let view = frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("viewport-encoder"),
        });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("viewport-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        calls.passes += 1;
        renderer
            .render_draw_data_with_fb_size(
                draw_data,
                &mut pass,
                target.config.width,
                target.config.height,
            )
            .map_err(|e| AppError::Renderer(format!("render_draw_data failed: {e}")))?;
    }

    gpu.queue.submit(Some(encoder.finish()));
    calls.submits += 1;
    frame.present();
    calls.presents += 1;
    Ok(())
}
