//! Desktop monitor list
//!
//! Dear ImGui clamps and places secondary viewports using the monitor list in
//! `PlatformIo`. The list is rebuilt only when invalidated: once at startup,
//! then whenever the application reports a display-configuration change.

use dear_imgui_rs::platform_io::PlatformIo;
use dear_imgui_rs::sys;

use crate::win32::{MonitorInfo, Rect, WindowManager};

/// One monitor, in physical desktop pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformMonitor {
    pub main_pos: [f32; 2],
    pub main_size: [f32; 2],
    pub work_pos: [f32; 2],
    pub work_size: [f32; 2],
    pub dpi_scale: f32,
}

fn pos_size(rect: Rect) -> ([f32; 2], [f32; 2]) {
    (
        [rect.left as f32, rect.top as f32],
        [rect.width() as f32, rect.height() as f32],
    )
}

impl PlatformMonitor {
    fn from_info(info: &MonitorInfo, dpi_scale: f32) -> Self {
        let (main_pos, main_size) = pos_size(info.monitor);
        let (work_pos, work_size) = pos_size(info.work);
        Self {
            main_pos,
            main_size,
            work_pos,
            work_size,
            dpi_scale,
        }
    }

    fn to_sys(self) -> sys::ImGuiPlatformMonitor {
        let mut monitor = sys::ImGuiPlatformMonitor::default();
        monitor.MainPos = sys::ImVec2 {
            x: self.main_pos[0],
            y: self.main_pos[1],
        };
        monitor.MainSize = sys::ImVec2 {
            x: self.main_size[0],
            y: self.main_size[1],
        };
        monitor.WorkPos = sys::ImVec2 {
            x: self.work_pos[0],
            y: self.work_pos[1],
        };
        monitor.WorkSize = sys::ImVec2 {
            x: self.work_size[0],
            y: self.work_size[1],
        };
        monitor.DpiScale = self.dpi_scale;
        monitor.PlatformHandle = std::ptr::null_mut();
        monitor
    }
}

/// The cached monitor list and its "want update" latch
#[derive(Debug, Clone)]
pub struct MonitorList {
    monitors: Vec<PlatformMonitor>,
    want_update: bool,
}

impl Default for MonitorList {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorList {
    /// An empty list that will be filled on the first refresh
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
            want_update: true,
        }
    }

    /// Request a rebuild on the next refresh
    pub fn invalidate(&mut self) {
        self.want_update = true;
    }

    pub fn wants_update(&self) -> bool {
        self.want_update
    }

    pub fn monitors(&self) -> &[PlatformMonitor] {
        &self.monitors
    }

    /// Re-enumerate if invalidated. Returns whether the list was rebuilt.
    ///
    /// The primary monitor is placed first, the rest follow in enumeration
    /// order. Every entry reports the process-wide `dpi_scale`.
    pub fn refresh_if_needed(&mut self, wm: &dyn WindowManager, dpi_scale: f32) -> bool {
        if !self.want_update {
            return false;
        }
        self.want_update = false;
        self.monitors.clear();

        for info in wm.monitors() {
            let monitor = PlatformMonitor::from_info(&info, dpi_scale);
            if info.primary {
                self.monitors.insert(0, monitor);
            } else {
                self.monitors.push(monitor);
            }
        }
        tracing::debug!(count = self.monitors.len(), "Enumerated monitors");
        true
    }

    /// Replace the monitor vector Dear ImGui reads.
    ///
    /// Storage comes from Dear ImGui's allocator so the library may free it.
    pub fn write_to_platform_io(&self, platform_io: &mut PlatformIo) {
        let pio = platform_io.as_raw_mut();
        unsafe {
            let vec = &mut (*pio).Monitors;
            if vec.Capacity > 0 && !vec.Data.is_null() {
                sys::igMemFree(vec.Data as *mut _);
            }
            vec.Data = std::ptr::null_mut();
            vec.Size = 0;
            vec.Capacity = 0;

            let count = self.monitors.len();
            if count == 0 {
                return;
            }
            let bytes = count * std::mem::size_of::<sys::ImGuiPlatformMonitor>();
            let data = sys::igMemAlloc(bytes) as *mut sys::ImGuiPlatformMonitor;
            if data.is_null() {
                tracing::warn!(count, "Monitor list allocation failed");
                return;
            }
            for (i, monitor) in self.monitors.iter().enumerate() {
                data.add(i).write(monitor.to_sys());
            }
            vec.Data = data;
            vec.Size = count as i32;
            vec.Capacity = count as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimWindowManager;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn monitor(x: i32, primary: bool) -> MonitorInfo {
        MonitorInfo {
            monitor: Rect {
                left: x,
                top: 0,
                right: x + 1920,
                bottom: 1080,
            },
            work: Rect {
                left: x,
                top: 0,
                right: x + 1920,
                bottom: 1040,
            },
            primary,
        }
    }

    #[test]
    fn starts_invalidated_and_rebuilds_once() {
        let wm = SimWindowManager::new();
        wm.push_monitor(monitor(0, true));

        let mut list = MonitorList::new();
        assert!(list.wants_update());
        assert!(list.refresh_if_needed(&wm, 1.0));
        assert!(!list.refresh_if_needed(&wm, 1.0));
        assert_eq!(list.monitors().len(), 1);
    }

    #[test]
    fn primary_monitor_is_always_first() {
        let wm = SimWindowManager::new();
        wm.push_monitor(monitor(-1920, false));
        wm.push_monitor(monitor(1920, false));
        wm.push_monitor(monitor(0, true));
        wm.push_monitor(monitor(3840, false));

        let mut list = MonitorList::new();
        list.refresh_if_needed(&wm, 1.25);

        let xs: Vec<f32> = list.monitors().iter().map(|m| m.main_pos[0]).collect();
        assert_eq!(xs, vec![0.0, -1920.0, 1920.0, 3840.0]);
        assert_relative_eq!(list.monitors()[0].work_size[1], 1040.0);
        assert!(list.monitors().iter().all(|m| m.dpi_scale == 1.25));
    }

    #[test]
    fn invalidate_picks_up_display_changes() {
        let wm = SimWindowManager::new();
        wm.push_monitor(monitor(0, true));

        let mut list = MonitorList::new();
        list.refresh_if_needed(&wm, 1.0);
        wm.push_monitor(monitor(1920, false));
        assert!(!list.refresh_if_needed(&wm, 1.0));
        assert_eq!(list.monitors().len(), 1);

        list.invalidate();
        assert!(list.refresh_if_needed(&wm, 1.0));
        assert_eq!(list.monitors().len(), 2);
    }

    #[test]
    fn unqueryable_monitors_are_skipped() {
        let wm = SimWindowManager::new();
        wm.push_monitor(monitor(0, true));
        wm.push_broken_monitor();

        let mut list = MonitorList::new();
        list.refresh_if_needed(&wm, 1.0);
        assert_eq!(list.monitors().len(), 1);
    }
}
