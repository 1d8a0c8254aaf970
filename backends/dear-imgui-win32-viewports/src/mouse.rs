//! Absolute-desktop mouse position and hovered-viewport tracking
//!
//! With viewports enabled Dear ImGui wants the mouse in desktop coordinates
//! and, ideally, the id of the viewport under it. Both are sampled once per
//! frame before `Context::frame`.

use dear_imgui_rs::{BackendFlags, Io, sys};

use crate::win32::WindowManager;
use crate::{NativeWindow, ViewportFlags, ViewportId};

/// One frame's worth of mouse state for the GUI library.
///
/// `None` fields mean "unknown": the position becomes Dear ImGui's invalid
/// sentinel and the hovered viewport becomes id 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseUpdate {
    pub pos: Option<[f32; 2]>,
    pub hovered: Option<ViewportId>,
}

impl MouseUpdate {
    /// Queue the position and hovered-viewport events on `io`
    pub fn apply(&self, io: &mut Io) {
        let pos = self.pos.unwrap_or([-f32::MAX, -f32::MAX]);
        io.add_mouse_pos_event(pos);

        let hovered = self.hovered.map_or(0, |id| id.0);
        // `Io` is a transparent wrapper over `ImGuiIO`
        let raw = io as *mut Io as *mut sys::ImGuiIO;
        unsafe {
            sys::ImGuiIO_AddMouseViewportEvent(raw, hovered);
        }
    }
}

/// Tell Dear ImGui that [`MouseUpdate::hovered`] is reliable
pub fn advertise_hovered_viewport(io: &mut Io) {
    let flags = io.backend_flags()
        | BackendFlags::from_bits_retain(sys::ImGuiBackendFlags_HasMouseHoveredViewport);
    io.set_backend_flags(flags);
}

/// Sample the cursor against the viewport windows.
///
/// `lookup` maps a native window to the viewport it backs. A foreground
/// window that is a child of `main` counts as `main`. Hover testing is a plain
/// point-to-window hit test, so foreign windows that overlap ours are not
/// accounted for.
pub fn poll(
    wm: &dyn WindowManager,
    main: NativeWindow,
    dpi_scale: f32,
    lookup: &dyn Fn(NativeWindow) -> Option<ViewportId>,
    live_flags: &dyn Fn(ViewportId) -> Option<ViewportFlags>,
) -> MouseUpdate {
    let mut update = MouseUpdate::default();

    let Some(cursor) = wm.cursor_pos() else {
        return update;
    };

    if let Some(mut focused) = wm.foreground_window() {
        if wm.is_child(main, focused) {
            focused = main;
        }
        if lookup(focused).is_some() {
            update.pos = Some([cursor.x as f32 / dpi_scale, cursor.y as f32 / dpi_scale]);
        }
    }

    update.hovered = wm
        .window_from_point(cursor)
        .and_then(lookup)
        .filter(|id| {
            live_flags(*id).is_some_and(|flags| !flags.contains(ViewportFlags::NO_INPUTS))
        });

    update
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimWindowManager;
    use crate::win32::{Point, Rect};
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    struct Desk {
        wm: SimWindowManager,
        main: NativeWindow,
        views: HashMap<NativeWindow, (ViewportId, ViewportFlags)>,
    }

    impl Desk {
        fn new() -> Self {
            let wm = SimWindowManager::new();
            let main = wm.open_window("main", Rect::from_pos_size([0.0, 0.0], [800.0, 600.0]));
            let mut views = HashMap::new();
            views.insert(main, (ViewportId(1), ViewportFlags::empty()));
            Self { wm, main, views }
        }

        fn add(&mut self, id: u32, flags: ViewportFlags, rect: Rect) -> NativeWindow {
            let hwnd = self.wm.open_window("secondary", rect);
            self.views.insert(hwnd, (ViewportId(id), flags));
            hwnd
        }

        fn poll(&self, dpi: f32) -> MouseUpdate {
            let lookup = |hwnd: NativeWindow| self.views.get(&hwnd).map(|(id, _)| *id);
            let flags = |id: ViewportId| {
                self.views
                    .values()
                    .find(|(vid, _)| *vid == id)
                    .map(|(_, flags)| *flags)
            };
            poll(&self.wm, self.main, dpi, &lookup, &flags)
        }
    }

    #[test]
    fn cursor_failure_yields_the_sentinel() {
        let desk = Desk::new();
        desk.wm.set_cursor(None);
        desk.wm.set_foreground(Some(desk.main));
        assert_eq!(desk.poll(1.0), MouseUpdate::default());
    }

    #[test]
    fn position_is_reported_in_points_when_our_window_is_foreground() {
        let desk = Desk::new();
        desk.wm.set_cursor(Some(Point { x: 300, y: 150 }));
        desk.wm.set_foreground(Some(desk.main));

        let update = desk.poll(1.5);
        let pos = update.pos.expect("position");
        assert_relative_eq!(pos[0], 200.0);
        assert_relative_eq!(pos[1], 100.0);
        assert_eq!(update.hovered, Some(ViewportId(1)));
    }

    #[test]
    fn child_of_main_counts_as_main() {
        let desk = Desk::new();
        let child = desk.wm.open_child(desk.main);
        desk.wm.set_cursor(Some(Point { x: 10, y: 10 }));
        desk.wm.set_foreground(Some(child));

        assert_eq!(desk.poll(1.0).pos, Some([10.0, 10.0]));
    }

    #[test]
    fn foreign_foreground_window_hides_the_position() {
        let desk = Desk::new();
        let foreign = desk
            .wm
            .open_window("other app", Rect::from_pos_size([2000.0, 0.0], [50.0, 50.0]));
        desk.wm.set_cursor(Some(Point { x: 10, y: 10 }));
        desk.wm.set_foreground(Some(foreign));

        let update = desk.poll(1.0);
        assert_eq!(update.pos, None);
        assert_eq!(update.hovered, Some(ViewportId(1)));
    }

    #[test]
    fn no_inputs_viewports_are_never_hovered() {
        let mut desk = Desk::new();
        desk.add(
            7,
            ViewportFlags::NO_INPUTS | ViewportFlags::NO_DECORATION,
            Rect::from_pos_size([100.0, 100.0], [200.0, 200.0]),
        );
        desk.wm.set_cursor(Some(Point { x: 150, y: 150 }));
        desk.wm.set_foreground(Some(desk.main));

        let update = desk.poll(1.0);
        assert!(update.pos.is_some());
        assert_eq!(update.hovered, None);
    }

    #[test]
    fn hovered_viewport_is_the_window_under_the_cursor() {
        let mut desk = Desk::new();
        desk.add(
            7,
            ViewportFlags::NO_DECORATION,
            Rect::from_pos_size([100.0, 100.0], [200.0, 200.0]),
        );
        desk.wm.set_cursor(Some(Point { x: 150, y: 150 }));
        desk.wm.set_foreground(Some(desk.main));

        assert_eq!(desk.poll(1.0).hovered, Some(ViewportId(7)));
    }
}
