//! Host configuration and its builder methods

use std::path::PathBuf;

use crate::menus::DockOptions;

/// Host configuration
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub window_title: String,
    /// Logical size of the main window
    pub window_size: (f64, f64),
    pub present_mode: wgpu::PresentMode,
    /// Clear color for every viewport's render pass
    pub clear_color: [f32; 4],
    /// Cap on simultaneously open shell windows, the main window included
    pub max_windows: usize,
    /// `None` disables `.ini` persistence
    pub ini_filename: Option<PathBuf>,
    /// Title given to secondary viewport windows before Dear ImGui renames them
    pub secondary_title: String,
    /// Initial dockspace options; the Debug menu toggles them at runtime
    pub dockspace: DockOptions,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            window_title: format!("Dear ImGui Multi-Viewport - {}", env!("CARGO_PKG_VERSION")),
            window_size: (1280.0, 800.0),
            present_mode: wgpu::PresentMode::Fifo,
            clear_color: [0.5, 0.5, 0.5, 1.0],
            max_windows: 32,
            ini_filename: None,
            secondary_title: "Untitled".to_string(),
            dockspace: DockOptions::PASSTHRU_CENTRAL_NODE,
        }
    }
}

impl HostConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.window_size = (width, height);
        self
    }

    pub fn with_present_mode(mut self, mode: wgpu::PresentMode) -> Self {
        self.present_mode = mode;
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// At least one window (the main one) is always allowed
    pub fn with_max_windows(mut self, max: usize) -> Self {
        self.max_windows = max.max(1);
        self
    }

    pub fn with_ini_filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.ini_filename = Some(path.into());
        self
    }

    pub fn with_secondary_title(mut self, title: impl Into<String>) -> Self {
        self.secondary_title = title.into();
        self
    }

    pub fn with_dockspace(mut self, options: DockOptions) -> Self {
        self.dockspace = options;
        self
    }

    pub(crate) fn wgpu_clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }
}
