//! Viewport identity and the subset of viewport flags the hooks consume

use bitflags::bitflags;
use dear_imgui_rs::platform_io::Viewport;
use dear_imgui_rs::sys;

/// Identity of a Dear ImGui viewport (`ImGuiViewport::ID`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewportId(pub u32);

impl From<sys::ImGuiID> for ViewportId {
    fn from(id: sys::ImGuiID) -> Self {
        ViewportId(id)
    }
}

bitflags! {
    /// Viewport flags read by the platform hooks.
    ///
    /// Bits this crate does not name are kept as-is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ViewportFlags: u32 {
        /// The viewport is backed by a platform window
        const IS_PLATFORM_WINDOW = sys::ImGuiViewportFlags_IsPlatformWindow as u32;
        /// No OS decorations (title bar, border)
        const NO_DECORATION = sys::ImGuiViewportFlags_NoDecoration as u32;
        /// No task bar entry
        const NO_TASK_BAR_ICON = sys::ImGuiViewportFlags_NoTaskBarIcon as u32;
        /// Show without taking focus
        const NO_FOCUS_ON_APPEARING = sys::ImGuiViewportFlags_NoFocusOnAppearing as u32;
        /// Mouse passes through the window
        const NO_INPUTS = sys::ImGuiViewportFlags_NoInputs as u32;
        /// Always on top
        const TOP_MOST = sys::ImGuiViewportFlags_TopMost as u32;
        /// The platform window is minimized
        const IS_MINIMIZED = sys::ImGuiViewportFlags_IsMinimized as u32;
    }
}

impl ViewportFlags {
    /// Convert raw `ImGuiViewportFlags`, retaining unknown bits
    pub fn from_raw(raw: sys::ImGuiViewportFlags) -> Self {
        Self::from_bits_retain(raw as u32)
    }
}

/// Snapshot of the viewport fields a hook needs.
///
/// Positions and sizes are in GUI coordinates and describe the client area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub id: ViewportId,
    pub flags: ViewportFlags,
    pub pos: [f32; 2],
    pub size: [f32; 2],
}

impl ViewportState {
    pub fn new(id: ViewportId, flags: ViewportFlags, pos: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            id,
            flags,
            pos,
            size,
        }
    }

    /// Capture the current state of a live Dear ImGui viewport
    pub fn of(viewport: &Viewport) -> Self {
        Self {
            id: ViewportId(viewport.id()),
            flags: ViewportFlags::from_raw(viewport.flags()),
            pos: viewport.pos(),
            size: viewport.size(),
        }
    }
}
