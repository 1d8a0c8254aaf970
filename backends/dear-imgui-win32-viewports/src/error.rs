//! Error types for the viewport platform

use thiserror::Error;

use crate::{ViewportId, WindowKey};

/// Failures reported by the application shell or graphics library
#[derive(Debug, Error)]
pub enum HostError {
    /// The shell refused to open another OS window
    #[error("window creation failed: {0}")]
    WindowCreation(String),
    /// The configured cap on simultaneously open windows was reached
    #[error("window limit of {limit} reached")]
    WindowLimit { limit: usize },
    /// A graphics context could not be bound to the window
    #[error("graphics context creation failed for window {window:?}: {reason}")]
    ContextCreation { window: WindowKey, reason: String },
    /// The key does not name a live window
    #[error("unknown window {0:?}")]
    UnknownWindow(WindowKey),
    /// Window creation was requested outside of an event-loop callback
    #[error("no active event loop")]
    NoEventLoop,
}

/// Failures surfaced by [`ViewportPlatform`](crate::ViewportPlatform) hooks
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("viewport {id:?}: {source}")]
    Host {
        id: ViewportId,
        #[source]
        source: HostError,
    },
}
