//! Main menu bar and the full-viewport dock host

use bitflags::bitflags;
use dear_imgui_rs::{Condition, DockFlags, Id, StyleVar, Ui, WindowFlags};
use tracing::info;

use crate::inspector::Inspector;

/// Name of the window hosting the dockspace
pub const DOCK_HOST_WINDOW: &str = "MainWindowHost";

/// Label the dockspace id is hashed from inside the host window
pub const DOCKSPACE_ID: &str = "MainDockSpace";

bitflags! {
    /// Dockspace options the Debug menu can toggle
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DockOptions: u32 {
        const NO_SPLIT = 1 << 0;
        const NO_RESIZE = 1 << 1;
        const NO_DOCKING_IN_CENTRAL_NODE = 1 << 2;
        const PASSTHRU_CENTRAL_NODE = 1 << 3;
        const AUTO_HIDE_TAB_BAR = 1 << 4;
    }
}

impl DockOptions {
    /// Menu labels in display order
    pub const MENU: [(&'static str, DockOptions); 5] = [
        ("NoSplit", DockOptions::NO_SPLIT),
        ("NoResize", DockOptions::NO_RESIZE),
        ("NoDockingInCentralNode", DockOptions::NO_DOCKING_IN_CENTRAL_NODE),
        ("PassthruCentralNode", DockOptions::PASSTHRU_CENTRAL_NODE),
        ("AutoHideTabBar", DockOptions::AUTO_HIDE_TAB_BAR),
    ];

    pub fn dock_flags(self) -> DockFlags {
        let mut flags = DockFlags::empty();
        if self.contains(Self::NO_SPLIT) {
            flags |= DockFlags::NO_DOCKING_SPLIT;
        }
        if self.contains(Self::NO_RESIZE) {
            flags |= DockFlags::NO_RESIZE;
        }
        if self.contains(Self::NO_DOCKING_IN_CENTRAL_NODE) {
            flags |= DockFlags::NO_DOCKING_OVER_CENTRAL_NODE;
        }
        if self.contains(Self::PASSTHRU_CENTRAL_NODE) {
            flags |= DockFlags::PASSTHRU_CENTRAL_NODE;
        }
        if self.contains(Self::AUTO_HIDE_TAB_BAR) {
            flags |= DockFlags::AUTO_HIDE_TAB_BAR;
        }
        flags
    }

    /// Host window flags; a pass-through central node needs a see-through host
    pub fn host_window_flags(self) -> WindowFlags {
        let mut flags = WindowFlags::NO_TITLE_BAR
            | WindowFlags::NO_COLLAPSE
            | WindowFlags::NO_RESIZE
            | WindowFlags::NO_MOVE
            | WindowFlags::NO_BRING_TO_FRONT_ON_FOCUS
            | WindowFlags::NO_NAV_FOCUS
            | WindowFlags::NO_DOCKING;
        if self.contains(Self::PASSTHRU_CENTRAL_NODE) {
            flags |= WindowFlags::NO_BACKGROUND;
        }
        flags
    }
}

/// File menu placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCommand {
    New,
    Open,
    Save,
    Close,
}

/// What the menus asked for this frame, beyond their own toggles
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MenuActions {
    pub file: Option<FileCommand>,
    pub refresh_monitors: bool,
}

/// Toggles owned by the menu bar
#[derive(Debug, Clone)]
pub struct MenuState {
    pub dockspace: DockOptions,
    pub show_metrics: bool,
    pub show_demo: bool,
    pub show_style_editor: bool,
}

impl MenuState {
    pub fn new(dockspace: DockOptions) -> Self {
        Self {
            dockspace,
            show_metrics: false,
            show_demo: false,
            show_style_editor: false,
        }
    }

    /// Flip one dockspace option
    pub fn toggle_dock_option(&mut self, option: DockOptions) {
        self.dockspace.toggle(option);
    }

    /// Draw the main menu bar, then any debug windows it keeps open
    pub fn draw(&mut self, ui: &Ui, inspector: &mut Inspector) -> MenuActions {
        let mut actions = MenuActions::default();

        if let Some(_bar) = ui.begin_main_menu_bar() {
            if let Some(_menu) = ui.begin_menu("File") {
                actions.file = file_menu(ui);
            }
            if let Some(_menu) = ui.begin_menu("Debug") {
                actions.refresh_monitors = self.debug_menu(ui);
            }
            if let Some(_menu) = ui.begin_menu("wgpu") {
                inspector.menu(ui);
            }
            ui.text(format!(
                "{:.3} ms/frame ({:.1} FPS)",
                1000.0 / ui.io().framerate().max(f32::EPSILON),
                ui.io().framerate()
            ));
        }

        if self.show_metrics {
            ui.show_metrics_window(&mut self.show_metrics);
        }
        if self.show_demo {
            ui.show_demo_window(&mut self.show_demo);
        }
        if self.show_style_editor {
            let mut close = false;
            ui.window("Style Editor").build(|| {
                ui.show_default_style_editor();
                close = ui.button("Close");
            });
            if close {
                self.show_style_editor = false;
            }
        }

        if let Some(command) = actions.file {
            info!(?command, "File menu");
        }
        actions
    }

    fn debug_menu(&mut self, ui: &Ui) -> bool {
        ui.menu_item_toggle("Metrics", None::<&str>, &mut self.show_metrics, true);
        ui.menu_item_toggle("Demo", None::<&str>, &mut self.show_demo, true);
        ui.menu_item_toggle("Style editor", None::<&str>, &mut self.show_style_editor, true);
        ui.separator();

        if let Some(_dock) = ui.begin_menu("Dockspace") {
            for (label, option) in DockOptions::MENU {
                let selected = self.dockspace.contains(option);
                if ui.menu_item_enabled_selected(label, None::<&str>, selected, true) {
                    self.toggle_dock_option(option);
                }
            }
        }
        ui.separator();
        ui.menu_item("Refresh monitors")
    }
}

fn file_menu(ui: &Ui) -> Option<FileCommand> {
    let mut command = None;
    if ui.menu_item("New") {
        command = Some(FileCommand::New);
    }
    if ui.menu_item_with_shortcut("Open", "Ctrl+O") {
        command = Some(FileCommand::Open);
    }
    if ui.menu_item_with_shortcut("Save", "Ctrl+S") {
        command = Some(FileCommand::Save);
    }
    ui.separator();
    if ui.menu_item("Close") {
        command = Some(FileCommand::Close);
    }
    command
}

/// Full-size window over the main viewport's work area holding the dockspace.
/// Returns the dockspace id while the host window is visible.
pub fn draw_dock_host(ui: &Ui, options: DockOptions) -> Option<Id> {
    let viewport = ui.main_viewport();
    ui.set_next_window_viewport(Id::from(viewport.id()));
    let pos = viewport.work_pos();
    let size = viewport.work_size();

    let rounding = ui.push_style_var(StyleVar::WindowRounding(0.0));
    let border = ui.push_style_var(StyleVar::WindowBorderSize(0.0));
    let padding = ui.push_style_var(StyleVar::WindowPadding([0.0, 0.0]));

    ui.window(DOCK_HOST_WINDOW)
        .flags(options.host_window_flags())
        .position(pos, Condition::Always)
        .size(size, Condition::Always)
        .build(|| {
            padding.pop();
            border.pop();
            rounding.pop();

            let dockspace_id = ui.get_id(DOCKSPACE_ID);
            let avail = ui.content_region_avail();
            ui.dock_space_with_class(dockspace_id, avail, options.dock_flags(), None)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn passthru_central_node_drops_the_host_background() {
        let opaque = DockOptions::NO_SPLIT.host_window_flags();
        assert!(!opaque.contains(WindowFlags::NO_BACKGROUND));

        let passthru = (DockOptions::NO_SPLIT | DockOptions::PASSTHRU_CENTRAL_NODE).host_window_flags();
        assert!(passthru.contains(WindowFlags::NO_BACKGROUND));
        assert!(passthru.contains(WindowFlags::NO_MOVE));
    }

    #[test]
    fn host_window_is_pinned_and_never_docks() {
        let flags = DockOptions::empty().host_window_flags();
        assert!(flags.contains(WindowFlags::NO_DOCKING));
        assert!(flags.contains(WindowFlags::NO_TITLE_BAR | WindowFlags::NO_RESIZE));
        assert!(flags.contains(WindowFlags::NO_BRING_TO_FRONT_ON_FOCUS));
        assert!(!flags.contains(WindowFlags::NO_BACKGROUND));
    }

    #[test]
    fn toggling_flips_one_option() {
        let mut state = MenuState::new(DockOptions::PASSTHRU_CENTRAL_NODE);
        state.toggle_dock_option(DockOptions::AUTO_HIDE_TAB_BAR);
        assert_eq!(
            state.dockspace,
            DockOptions::PASSTHRU_CENTRAL_NODE | DockOptions::AUTO_HIDE_TAB_BAR
        );
        state.toggle_dock_option(DockOptions::PASSTHRU_CENTRAL_NODE);
        assert_eq!(state.dockspace, DockOptions::AUTO_HIDE_TAB_BAR);
    }

    #[test]
    fn menu_lists_every_option_once() {
        let all = DockOptions::MENU
            .iter()
            .fold(DockOptions::empty(), |acc, (_, option)| acc | *option);
        assert_eq!(all, DockOptions::all());
    }

    #[test]
    fn dock_flags_follow_the_options() {
        let flags = (DockOptions::NO_RESIZE | DockOptions::PASSTHRU_CENTRAL_NODE).dock_flags();
        assert!(flags.contains(DockFlags::NO_RESIZE));
        assert!(flags.contains(DockFlags::PASSTHRU_CENTRAL_NODE));
        assert!(!flags.contains(DockFlags::AUTO_HIDE_TAB_BAR));
        assert!(DockOptions::empty().dock_flags().is_empty());
    }
}
