//! The seam between the viewport platform and the application shell

use std::ffi::c_void;

use crate::HostError;

/// Shell-side identity of an OS window.
///
/// Keys are handed out by the [`ViewportHost`] and are never zero, so a key
/// can be stored in a viewport's `PlatformHandle` slot without colliding with
/// the "no handle" value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowKey(pub u32);

impl WindowKey {
    /// Pointer-sized form stored in `ImGuiViewport::PlatformHandle`
    pub fn as_handle(self) -> *mut c_void {
        self.0 as usize as *mut c_void
    }

    /// Inverse of [`Self::as_handle`]; `None` for a null handle
    pub fn from_handle(handle: *mut c_void) -> Option<Self> {
        let raw = handle as usize;
        (raw != 0 && raw <= u32::MAX as usize).then_some(WindowKey(raw as u32))
    }
}

/// Identity of a graphics context (swap chain and render-target bindings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextKey(pub u32);

/// A native `HWND`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeWindow(pub isize);

impl NativeWindow {
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Pointer form stored in `ImGuiViewport::PlatformHandleRaw`
    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }
}

/// Window and graphics-context services provided by the application.
///
/// The platform never owns OS windows directly: it asks the shell for them
/// and only uses user32 to style and place what the shell returns.
pub trait ViewportHost {
    /// Open a new, hidden-or-visible OS window with the given title
    fn create_window(&mut self, title: &str) -> Result<WindowKey, HostError>;

    /// Close a window previously returned by [`Self::create_window`]
    fn destroy_window(&mut self, window: WindowKey);

    /// Create a graphics context that renders into `window`
    fn create_context(&mut self, window: WindowKey) -> Result<ContextKey, HostError>;

    /// Release a graphics context
    fn discard_context(&mut self, context: ContextKey);

    /// The native handle behind a shell window, if it is still alive
    fn native_handle(&self, window: WindowKey) -> Option<NativeWindow>;

    /// Process-wide DPI scale (physical pixels per GUI point)
    fn dpi_scale(&self) -> f32;
}
