//! Winit windows and WGPU surfaces handed to the viewport platform

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use dear_imgui_win32_viewports::{ContextKey, HostError, NativeWindow, ViewportHost, WindowKey};
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use tracing::{debug, warn};
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::gpu::{Gpu, SurfaceRegistry};

thread_local! {
    // winit only creates windows from inside an event-loop callback
    static EVENT_LOOP: Cell<Option<*const ActiveEventLoop>> = const { Cell::new(None) };
}

/// Makes `event_loop` available to viewport hooks until dropped.
///
/// Wrap `Context::update_platform_windows` and
/// `Context::destroy_platform_windows` in one of these.
pub struct EventLoopScope<'a> {
    previous: Option<*const ActiveEventLoop>,
    _event_loop: PhantomData<&'a ActiveEventLoop>,
}

impl<'a> EventLoopScope<'a> {
    pub fn enter(event_loop: &'a ActiveEventLoop) -> Self {
        let previous = EVENT_LOOP.with(|slot| slot.replace(Some(event_loop as *const _)));
        Self {
            previous,
            _event_loop: PhantomData,
        }
    }
}

impl Drop for EventLoopScope<'_> {
    fn drop(&mut self) {
        EVENT_LOOP.with(|slot| slot.set(self.previous));
    }
}

fn with_event_loop<R>(f: impl FnOnce(&ActiveEventLoop) -> R) -> Option<R> {
    let ptr = EVENT_LOOP.with(Cell::get)?;
    // SAFETY: the pointer is only set while an `EventLoopScope` borrowing the
    // event loop is alive on this thread.
    Some(f(unsafe { &*ptr }))
}

/// The Win32 handle behind a winit window
pub fn native_handle_of(window: &Window) -> Option<NativeWindow> {
    let handle = window.window_handle().ok()?;
    match handle.as_raw() {
        RawWindowHandle::Win32(h) => Some(NativeWindow(h.hwnd.get())),
        _ => None,
    }
}

/// [`ViewportHost`] backed by winit windows and WGPU surfaces.
///
/// Windows and surfaces live in a registry shared with the frame driver,
/// which renders into them after the hooks have run.
pub struct WinitWgpuHost {
    gpu: Rc<Gpu>,
    surfaces: Rc<RefCell<SurfaceRegistry>>,
    main: WindowKey,
}

impl WinitWgpuHost {
    pub fn new(gpu: Rc<Gpu>, surfaces: Rc<RefCell<SurfaceRegistry>>, main: WindowKey) -> Self {
        Self {
            gpu,
            surfaces,
            main,
        }
    }
}

impl ViewportHost for WinitWgpuHost {
    fn create_window(&mut self, title: &str) -> Result<WindowKey, HostError> {
        let attributes = Window::default_attributes()
            .with_title(title)
            .with_visible(false);
        let key = self.surfaces.borrow_mut().try_insert_window(|| {
            let window = with_event_loop(|event_loop| event_loop.create_window(attributes))
                .ok_or(HostError::NoEventLoop)?
                .map_err(|e| HostError::WindowCreation(e.to_string()))?;
            Ok(Arc::new(window))
        })?;
        debug!(?key, title, "Opened viewport window");
        Ok(key)
    }

    fn destroy_window(&mut self, window: WindowKey) {
        if self.surfaces.borrow_mut().remove_window(window).is_none() {
            warn!(?window, "Destroying unknown window");
        }
    }

    fn create_context(&mut self, window: WindowKey) -> Result<ContextKey, HostError> {
        let handle = self
            .surfaces
            .borrow()
            .window(window)
            .cloned()
            .ok_or(HostError::UnknownWindow(window))?;
        let context = self
            .gpu
            .create_context(window, handle)
            .map_err(|e| HostError::ContextCreation {
                window,
                reason: e.to_string(),
            })?;
        Ok(self.surfaces.borrow_mut().insert_context(context))
    }

    fn discard_context(&mut self, context: ContextKey) {
        self.surfaces.borrow_mut().remove_context(context);
    }

    fn native_handle(&self, window: WindowKey) -> Option<NativeWindow> {
        let surfaces = self.surfaces.borrow();
        native_handle_of(surfaces.window(window)?)
    }

    fn dpi_scale(&self) -> f32 {
        self.surfaces
            .borrow()
            .window(self.main)
            .map_or(1.0, |window| window.scale_factor() as f32)
    }
}
