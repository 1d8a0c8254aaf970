//! WGPU inspector panels: adapter capabilities, live contexts, per-frame calls

use dear_imgui_rs::{TableColumnFlags, Ui};
use dear_imgui_win32_viewports::{ContextKey, WindowKey};

/// Adapter and device facts captured once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    pub adapter: String,
    pub backend: String,
    pub device_type: String,
    pub driver: String,
    pub features: String,
    pub limits: Vec<(&'static str, u64)>,
}

impl Capabilities {
    pub fn of(adapter: &wgpu::Adapter, device: &wgpu::Device) -> Self {
        let info = adapter.get_info();
        let limits = device.limits();
        Self {
            adapter: info.name,
            backend: format!("{:?}", info.backend),
            device_type: format!("{:?}", info.device_type),
            driver: format!("{} {}", info.driver, info.driver_info),
            features: format!("{:?}", device.features()),
            limits: vec![
                ("max_texture_dimension_2d", u64::from(limits.max_texture_dimension_2d)),
                ("max_bind_groups", u64::from(limits.max_bind_groups)),
                ("max_vertex_buffers", u64::from(limits.max_vertex_buffers)),
                ("max_color_attachments", u64::from(limits.max_color_attachments)),
                ("max_buffer_size", limits.max_buffer_size),
            ],
        }
    }
}

/// One live graphics context as shown in the Contexts panel
#[derive(Debug, Clone, PartialEq)]
pub struct ContextRow {
    pub context: ContextKey,
    pub window: WindowKey,
    pub size: [u32; 2],
    pub format: wgpu::TextureFormat,
}

/// Graphics calls issued during one frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameCalls {
    pub passes: u32,
    pub submits: u32,
    pub presents: u32,
    /// Viewports skipped because their surface was unavailable
    pub skipped: u32,
    pub reconfigures: u32,
}

pub struct Inspector {
    capabilities: Capabilities,
    current: FrameCalls,
    last: FrameCalls,
    pub show_capabilities: bool,
    pub show_contexts: bool,
    pub show_calls: bool,
}

impl Inspector {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            current: FrameCalls::default(),
            last: FrameCalls::default(),
            show_capabilities: false,
            show_contexts: false,
            show_calls: false,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Counters for the frame being recorded
    pub fn calls_mut(&mut self) -> &mut FrameCalls {
        &mut self.current
    }

    /// Counters of the last completed frame
    pub fn last_frame(&self) -> FrameCalls {
        self.last
    }

    /// Close the frame's counters and start fresh ones
    pub fn end_frame(&mut self) {
        self.last = std::mem::take(&mut self.current);
    }

    pub fn menu(&mut self, ui: &Ui) {
        ui.menu_item_toggle("Capabilities", None::<&str>, &mut self.show_capabilities, true);
        ui.menu_item_toggle("Contexts", None::<&str>, &mut self.show_contexts, true);
        ui.menu_item_toggle("Calls", None::<&str>, &mut self.show_calls, true);
    }

    pub fn draw(&mut self, ui: &Ui, contexts: &[ContextRow]) {
        if self.show_capabilities {
            let caps = &self.capabilities;
            ui.window("wgpu Capabilities").build(|| {
                ui.text(format!("Adapter: {}", caps.adapter));
                ui.text(format!("Backend: {}", caps.backend));
                ui.text(format!("Device type: {}", caps.device_type));
                ui.text(format!("Driver: {}", caps.driver));
                ui.separator();
                ui.text_wrapped(format!("Features: {}", caps.features));
                ui.separator();
                for (name, value) in &caps.limits {
                    ui.bullet_text(format!("{name}: {value}"));
                }
            });
        }

        if self.show_contexts {
            ui.window("wgpu Contexts").build(|| {
                if let Some(_table) = ui.begin_table("contexts", 4) {
                    ui.table_setup_column("Context", TableColumnFlags::NONE, 0.0, 0);
                    ui.table_setup_column("Window", TableColumnFlags::NONE, 0.0, 0);
                    ui.table_setup_column("Size", TableColumnFlags::NONE, 0.0, 0);
                    ui.table_setup_column("Format", TableColumnFlags::NONE, 0.0, 0);
                    ui.table_headers_row();
                    for row in contexts {
                        ui.table_next_row();
                        ui.table_next_column();
                        ui.text(format!("{}", row.context.0));
                        ui.table_next_column();
                        ui.text(format!("{}", row.window.0));
                        ui.table_next_column();
                        ui.text(format!("{}x{}", row.size[0], row.size[1]));
                        ui.table_next_column();
                        ui.text(format!("{:?}", row.format));
                    }
                }
            });
        }

        if self.show_calls {
            let calls = self.last;
            ui.window("wgpu Calls").build(|| {
                ui.text(format!("Render passes: {}", calls.passes));
                ui.text(format!("Submits: {}", calls.submits));
                ui.text(format!("Presents: {}", calls.presents));
                ui.text(format!("Skipped viewports: {}", calls.skipped));
                ui.text(format!("Surface reconfigures: {}", calls.reconfigures));
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inspector() -> Inspector {
        Inspector::new(Capabilities {
            adapter: "test".into(),
            backend: "Dx12".into(),
            device_type: "DiscreteGpu".into(),
            driver: String::new(),
            features: String::new(),
            limits: vec![("max_bind_groups", 4)],
        })
    }

    #[test]
    fn end_frame_publishes_and_resets_counters() {
        let mut inspector = inspector();
        {
            let calls = inspector.calls_mut();
            calls.passes += 2;
            calls.submits += 2;
            calls.presents += 1;
            calls.skipped += 1;
        }
        assert_eq!(inspector.last_frame(), FrameCalls::default());

        inspector.end_frame();
        assert_eq!(
            inspector.last_frame(),
            FrameCalls {
                passes: 2,
                submits: 2,
                presents: 1,
                skipped: 1,
                reconfigures: 0,
            }
        );
        assert_eq!(*inspector.calls_mut(), FrameCalls::default());
    }

    #[test]
    fn panels_start_closed() {
        let inspector = inspector();
        assert!(!inspector.show_capabilities);
        assert!(!inspector.show_contexts);
        assert!(!inspector.show_calls);
        assert_eq!(inspector.capabilities().limits, vec![("max_bind_groups", 4)]);
    }
}
