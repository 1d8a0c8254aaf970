//! Hook table registration
//!
//! Dear ImGui calls platform hooks through C function pointers that carry no
//! user context, so the installed [`ViewportPlatform`] lives in a
//! thread-local slot and each trampoline forwards to it. Hooks only run on
//! the UI thread, from inside `Context::update_platform_windows` and
//! `Context::destroy_platform_windows`.
//!
//! A panic inside a hook is logged and aborts the process; unwinding into
//! Dear ImGui is never allowed.

use std::cell::RefCell;
use std::ffi::{CStr, c_char};
use std::panic::{AssertUnwindSafe, catch_unwind};

use dear_imgui_rs::platform_io::Viewport;
use dear_imgui_rs::{BackendFlags, Context, sys};
use tracing::{error, info, trace};

use crate::{Reconcile, ViewportId, ViewportPlatform, ViewportState, mouse};

/// Id Dear ImGui gives its main viewport (`IMGUI_VIEWPORT_DEFAULT_ID`)
pub const MAIN_VIEWPORT_ID: ViewportId = ViewportId(0x1111_1111);

thread_local! {
    static PLATFORM: RefCell<Option<Box<dyn ViewportPlatform>>> = const { RefCell::new(None) };
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

fn guard<R>(hook: &'static str, f: impl FnOnce() -> R) -> R {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            error!(hook, panic = %panic_message(payload.as_ref()), "Panic in viewport hook");
            std::process::abort();
        }
    }
}

fn with_slot<R>(hook: &'static str, f: impl FnOnce(&mut dyn ViewportPlatform) -> R) -> R {
    guard(hook, || {
        PLATFORM.with(|slot| {
            let mut slot = slot.borrow_mut();
            match slot.as_deref_mut() {
                Some(platform) => f(platform),
                None => panic!("viewport hook {hook} called without an installed platform"),
            }
        })
    })
}

fn store(platform: Box<dyn ViewportPlatform>) {
    PLATFORM.with(|slot| *slot.borrow_mut() = Some(platform));
}

fn take() -> Option<Box<dyn ViewportPlatform>> {
    PLATFORM.with(|slot| slot.borrow_mut().take())
}

fn apply_reconcile(vp: &mut Viewport, reconcile: Reconcile) {
    if reconcile.is_needed() {
        vp.set_platform_request_move(true);
        vp.set_platform_request_resize(true);
    }
}

fn viewport_id(vp: &Viewport) -> ViewportId {
    ViewportId(vp.id())
}

unsafe extern "C" fn create_window(vp: *mut Viewport) {
    let Some(vp) = (unsafe { vp.as_mut() }) else {
        return;
    };
    let state = ViewportState::of(vp);
    let created = with_slot("create_window", |p| {
        p.create_window(&state)
            .map(|reconcile| (reconcile, p.window_handles(state.id)))
    });
    match created {
        Ok((reconcile, handles)) => {
            if let Some(handles) = handles {
                vp.set_platform_handle(handles.window.as_handle());
                unsafe {
                    (*vp.as_raw_mut()).PlatformHandleRaw = handles.native.as_ptr();
                }
            }
            apply_reconcile(vp, reconcile);
        }
        Err(err) => {
            error!(error = %err, "Could not create a window for a viewport");
            std::process::abort();
        }
    }
}

unsafe extern "C" fn destroy_window(vp: *mut Viewport) {
    let Some(vp) = (unsafe { vp.as_mut() }) else {
        return;
    };
    let id = viewport_id(vp);
    with_slot("destroy_window", |p| p.destroy_window(id));
    vp.set_platform_user_data(std::ptr::null_mut());
    vp.set_platform_handle(std::ptr::null_mut());
    unsafe {
        (*vp.as_raw_mut()).PlatformHandleRaw = std::ptr::null_mut();
    }
}

unsafe extern "C" fn show_window(vp: *mut Viewport) {
    let Some(vp) = (unsafe { vp.as_ref() }) else {
        return;
    };
    let state = ViewportState::of(vp);
    with_slot("show_window", |p| p.show_window(&state));
}

unsafe extern "C" fn set_window_pos(vp: *mut Viewport, pos: sys::ImVec2) {
    let Some(vp) = (unsafe { vp.as_ref() }) else {
        return;
    };
    let id = viewport_id(vp);
    with_slot("set_window_pos", |p| p.set_window_pos(id, [pos.x, pos.y]));
}

unsafe extern "C" fn get_window_pos(vp: *mut Viewport) -> sys::ImVec2 {
    let Some(vp) = (unsafe { vp.as_ref() }) else {
        return sys::ImVec2 { x: 0.0, y: 0.0 };
    };
    let id = viewport_id(vp);
    let [x, y] = with_slot("get_window_pos", |p| p.window_pos(id));
    sys::ImVec2 { x, y }
}

unsafe extern "C" fn set_window_size(vp: *mut Viewport, size: sys::ImVec2) {
    let Some(vp) = (unsafe { vp.as_ref() }) else {
        return;
    };
    let id = viewport_id(vp);
    with_slot("set_window_size", |p| p.set_window_size(id, [size.x, size.y]));
}

unsafe extern "C" fn get_window_size(vp: *mut Viewport) -> sys::ImVec2 {
    let Some(vp) = (unsafe { vp.as_ref() }) else {
        return sys::ImVec2 { x: 0.0, y: 0.0 };
    };
    let id = viewport_id(vp);
    let [x, y] = with_slot("get_window_size", |p| p.window_size(id));
    sys::ImVec2 { x, y }
}

unsafe extern "C" fn set_window_focus(vp: *mut Viewport) {
    let Some(vp) = (unsafe { vp.as_ref() }) else {
        return;
    };
    let id = viewport_id(vp);
    with_slot("set_window_focus", |p| p.set_window_focus(id));
}

unsafe extern "C" fn get_window_focus(vp: *mut Viewport) -> bool {
    let Some(vp) = (unsafe { vp.as_ref() }) else {
        return false;
    };
    let id = viewport_id(vp);
    with_slot("get_window_focus", |p| p.window_focus(id))
}

unsafe extern "C" fn get_window_minimized(vp: *mut Viewport) -> bool {
    let Some(vp) = (unsafe { vp.as_ref() }) else {
        return false;
    };
    let id = viewport_id(vp);
    with_slot("get_window_minimized", |p| p.window_minimized(id))
}

unsafe extern "C" fn set_window_title(vp: *mut Viewport, title: *const c_char) {
    let Some(vp) = (unsafe { vp.as_ref() }) else {
        return;
    };
    if title.is_null() {
        return;
    }
    let title = unsafe { CStr::from_ptr(title) }.to_string_lossy();
    let id = viewport_id(vp);
    with_slot("set_window_title", |p| p.set_window_title(id, &title));
}

unsafe extern "C" fn set_window_alpha(vp: *mut Viewport, alpha: f32) {
    let Some(vp) = (unsafe { vp.as_ref() }) else {
        return;
    };
    let id = viewport_id(vp);
    with_slot("set_window_alpha", |p| p.set_window_alpha(id, alpha));
}

unsafe extern "C" fn update_window(vp: *mut Viewport) {
    let Some(vp) = (unsafe { vp.as_mut() }) else {
        return;
    };
    let state = ViewportState::of(vp);
    let reconcile = with_slot("update_window", |p| p.update_window(&state));
    apply_reconcile(vp, reconcile);
}

unsafe extern "C" fn get_window_dpi_scale(vp: *mut sys::ImGuiViewport) -> f32 {
    if vp.is_null() {
        return 1.0;
    }
    let id = ViewportId(unsafe { (*vp).ID });
    with_slot("get_window_dpi_scale", |p| p.window_dpi_scale(id))
}

/// Register `platform` as the viewport backend of `ctx`.
///
/// Attaches the main window's handles to the main viewport, fills the
/// platform hook table and advertises `PLATFORM_HAS_VIEWPORTS` and
/// `HAS_MOUSE_HOVERED_VIEWPORT`. A previously installed platform is dropped.
pub fn install<P: ViewportPlatform + 'static>(ctx: &mut Context, platform: P) {
    let main = platform.main_viewport();
    let handles = platform.window_handles(main.id);
    store(Box::new(platform));

    let pio = ctx.platform_io_mut();
    match pio
        .viewports_iter_mut()
        .find(|vp| ViewportId(vp.id()) == main.id)
    {
        Some(vp) => {
            if let Some(handles) = handles {
                vp.set_platform_handle(handles.window.as_handle());
                unsafe {
                    (*vp.as_raw_mut()).PlatformHandleRaw = handles.native.as_ptr();
                }
            }
        }
        None => tracing::warn!(id = ?main.id, "Main viewport not found in PlatformIo"),
    }

    unsafe {
        pio.set_platform_create_window(Some(create_window));
        pio.set_platform_destroy_window(Some(destroy_window));
        pio.set_platform_show_window(Some(show_window));
        pio.set_platform_set_window_pos(Some(set_window_pos));
        pio.set_platform_get_window_pos(Some(get_window_pos));
        pio.set_platform_set_window_size(Some(set_window_size));
        pio.set_platform_get_window_size(Some(get_window_size));
        pio.set_platform_set_window_focus(Some(set_window_focus));
        pio.set_platform_get_window_focus(Some(get_window_focus));
        pio.set_platform_get_window_minimized(Some(get_window_minimized));
        pio.set_platform_set_window_title(Some(set_window_title));
        pio.set_platform_set_window_alpha(Some(set_window_alpha));
        pio.set_platform_update_window(Some(update_window));
        (*pio.as_raw_mut()).Platform_GetWindowDpiScale = Some(get_window_dpi_scale);
    }

    let io = ctx.io_mut();
    io.set_backend_flags(io.backend_flags() | BackendFlags::PLATFORM_HAS_VIEWPORTS);
    mouse::advertise_hovered_viewport(io);

    info!(main = ?main.id, "Installed Win32 viewport hooks");
}

/// Run `f` against the installed platform. `None` when nothing is installed.
///
/// Must not be called from inside a hook.
pub fn with_platform<R>(f: impl FnOnce(&mut dyn ViewportPlatform) -> R) -> Option<R> {
    PLATFORM.with(|slot| slot.borrow_mut().as_deref_mut().map(|platform| f(platform)))
}

pub fn is_installed() -> bool {
    PLATFORM.with(|slot| slot.borrow().is_some())
}

/// Clear the hook table and hand back the platform.
///
/// Call after `Context::destroy_platform_windows`.
pub fn uninstall(ctx: &mut Context) -> Option<Box<dyn ViewportPlatform>> {
    let pio = ctx.platform_io_mut();
    unsafe {
        pio.set_platform_create_window(None);
        pio.set_platform_destroy_window(None);
        pio.set_platform_show_window(None);
        pio.set_platform_set_window_pos(None);
        pio.set_platform_get_window_pos(None);
        pio.set_platform_set_window_size(None);
        pio.set_platform_get_window_size(None);
        pio.set_platform_set_window_focus(None);
        pio.set_platform_get_window_focus(None);
        pio.set_platform_get_window_minimized(None);
        pio.set_platform_set_window_title(None);
        pio.set_platform_set_window_alpha(None);
        pio.set_platform_update_window(None);
        (*pio.as_raw_mut()).Platform_GetWindowDpiScale = None;
    }
    let platform = take();
    trace!(was_installed = platform.is_some(), "Uninstalled Win32 viewport hooks");
    platform
}
