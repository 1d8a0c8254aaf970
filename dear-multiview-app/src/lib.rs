//! Docking Dear ImGui host with native Win32 secondary viewports
//!
//! The main window and every torn-off viewport are winit windows rendered
//! with WGPU. Window style, placement, focus, capture and monitor layout go
//! through [`dear_imgui_win32_viewports`], which this crate installs as Dear
//! ImGui's platform backend.
//!
//! ```no_run
//! use dear_multiview_app::{HostConfig, run};
//!
//! run(HostConfig::default().with_ini_filename("layout.ini")).unwrap();
//! ```

#![deny(rust_2018_idioms)]

pub mod config;
pub mod error;
mod frame;
pub mod gpu;
pub mod host;
pub mod inspector;
pub mod logging;
pub mod menus;
pub mod quit;
pub mod registry;
pub mod shell;

pub use config::HostConfig;
pub use error::AppError;
pub use host::{App, AppContext, Flow, run};
pub use menus::DockOptions;
