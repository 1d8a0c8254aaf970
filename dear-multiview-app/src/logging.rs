//! Tracing setup for the binary

use tracing_subscriber::{EnvFilter, fmt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "dear_multiview_app=info,dear_imgui_win32_viewports=info,warn";

/// Install a `fmt` subscriber filtered by `RUST_LOG`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Verbose variant: hook activity and source locations
pub fn init_tracing_dev() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "dear_multiview_app=debug,dear_imgui_win32_viewports=trace,info".into()
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
