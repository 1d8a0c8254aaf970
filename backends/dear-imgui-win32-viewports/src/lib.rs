//! Win32 multi-viewport platform hooks for Dear ImGui
//!
//! Dear ImGui's multi-viewport mode delegates the management of secondary OS
//! windows to the host application through a table of platform hooks. This
//! crate fills that table for Windows hosts whose windows come from an
//! application shell (winit) and whose pixels come from a graphics library
//! (wgpu): the shell creates the windows, user32 styles and positions them.
//!
//! # Layout
//!
//! - [`ViewportPlatform`]: the per-OS hook interface the GUI library drives
//! - [`win32::Win32Viewports`]: the Windows implementation, generic over the
//!   shell ([`ViewportHost`]) and over the user32 surface ([`win32::WindowManager`])
//! - [`MonitorList`]: the desktop monitor list fed to the GUI library
//! - [`MouseUpdate`]: absolute-desktop mouse position and hovered viewport
//! - [`hooks`]: the C trampolines registered with `PlatformIo`
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn demo(ctx: &mut dear_imgui_rs::Context, host: impl dear_imgui_win32_viewports::ViewportHost + 'static,
//! #         main: dear_imgui_win32_viewports::MainViewport) {
//! use dear_imgui_win32_viewports::{hooks, win32::{User32, Win32Viewports}};
//!
//! let platform = Win32Viewports::new(host, User32, main);
//! hooks::install(ctx, platform);
//! # }
//! ```

#![deny(rust_2018_idioms)]

mod error;
mod flags;
pub mod hooks;
mod host;
pub mod monitors;
pub mod mouse;
mod platform;
pub mod style;
pub mod win32;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use error::{HostError, PlatformError};
pub use flags::{ViewportFlags, ViewportId, ViewportState};
pub use host::{ContextKey, NativeWindow, ViewportHost, WindowKey};
pub use monitors::{MonitorList, PlatformMonitor};
pub use mouse::MouseUpdate;
pub use platform::{MainViewport, Reconcile, ViewportPlatform, WindowHandles};
pub use style::{ExtendedStyle, NativeStyle, WindowStyle};
