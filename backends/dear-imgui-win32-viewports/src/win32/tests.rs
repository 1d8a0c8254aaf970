use super::*;
use crate::WindowStyle;
use crate::sim::{SimHost, SimWindowManager};
use approx::assert_relative_eq;
use pretty_assertions::assert_eq;

const MAIN: ViewportId = ViewportId(0x1111);

struct Fixture {
    platform: Win32Viewports<SimHost, SimWindowManager>,
    wm: SimWindowManager,
    main_hwnd: NativeWindow,
}

fn fixture() -> Fixture {
    let wm = SimWindowManager::new();
    let main_hwnd = wm.open_window(
        "main",
        Rect {
            left: 0,
            top: 0,
            right: 1296,
            bottom: 839,
        },
    );
    let mut host = SimHost::new(wm.clone()).with_dpi_scale(1.5);
    let window = host.adopt(main_hwnd);
    let context = host.create_context(window).expect("main context");
    let main = MainViewport {
        id: MAIN,
        window,
        context,
        flags: ViewportFlags::empty(),
    };
    Fixture {
        platform: Win32Viewports::new(host, wm.clone(), main),
        wm,
        main_hwnd,
    }
}

fn viewport(id: u32, flags: ViewportFlags) -> ViewportState {
    ViewportState::new(ViewportId(id), flags, [100.0, 200.0], [300.0, 150.0])
}

impl Fixture {
    fn create(&mut self, state: &ViewportState) -> NativeWindow {
        let reconcile = self.platform.create_window(state).expect("create viewport");
        assert_eq!(reconcile, Reconcile::MoveAndResize);
        self.hwnd(state.id)
    }

    fn hwnd(&self, id: ViewportId) -> NativeWindow {
        self.platform.window_handles(id).expect("window handles").native
    }

    fn style(&self, hwnd: NativeWindow) -> NativeStyle {
        self.wm.window(hwnd).expect("live window").style
    }
}

#[test]
fn create_styles_places_and_shows_without_activating() {
    let mut fx = fixture();
    let state = viewport(2, ViewportFlags::empty());
    let hwnd = fx.create(&state);

    let window = fx.wm.window(hwnd).unwrap();
    assert_eq!(window.style.style, WindowStyle::OVERLAPPED_WINDOW);
    assert_eq!(window.style.ex_style, ExtendedStyle::APP_WINDOW);
    assert_eq!(window.title, DEFAULT_SECONDARY_TITLE);
    assert!(window.visible);
    assert_eq!(window.activations, 0);

    assert_eq!(fx.platform.window_pos(state.id), [100.0, 200.0]);
    assert_eq!(fx.platform.window_size(state.id), [300.0, 150.0]);

    let calls = fx.wm.calls();
    let place = format!("set_window_pos({:#x}, {:#x})", hwnd.0, 0x4 | 0x10 | 0x20);
    assert!(calls.contains(&place), "{calls:#?}");
}

#[test]
fn create_uses_configured_secondary_title() {
    let fx = fixture();
    let mut platform = fx.platform.with_secondary_title("Tool window");
    platform
        .create_window(&viewport(2, ViewportFlags::empty()))
        .unwrap();
    let hwnd = platform.window_handles(ViewportId(2)).unwrap().native;
    assert_eq!(fx.wm.window(hwnd).unwrap().title, "Tool window");
}

#[test]
fn create_binds_one_graphics_context_per_window() {
    let mut fx = fixture();
    fx.create(&viewport(2, ViewportFlags::empty()));
    fx.create(&viewport(3, ViewportFlags::NO_DECORATION));

    let host = fx.platform.host();
    assert_eq!(host.live_windows(), 3);
    assert_eq!(host.live_contexts(), 3);
    for id in [ViewportId(2), ViewportId(3)] {
        let context = fx.platform.graphics_context(id).unwrap();
        let window = fx.platform.window_handles(id).unwrap().window;
        assert_eq!(host.context_window(context), Some(window));
    }
}

#[test]
fn create_derives_borderless_tool_topmost_style() {
    let mut fx = fixture();
    let flags =
        ViewportFlags::NO_DECORATION | ViewportFlags::NO_TASK_BAR_ICON | ViewportFlags::TOP_MOST;
    let hwnd = fx.create(&viewport(2, flags));

    let style = fx.style(hwnd);
    assert_eq!(style.style, WindowStyle::POPUP);
    assert_eq!(
        style.ex_style,
        ExtendedStyle::TOOL_WINDOW | ExtendedStyle::TOP_MOST
    );
    assert_eq!(fx.platform.window_pos(ViewportId(2)), [100.0, 200.0]);
}

#[test]
fn failed_context_creation_closes_the_window() {
    let mut fx = fixture();
    fx.platform.host_mut().fail_contexts(true);

    let err = fx
        .platform
        .create_window(&viewport(2, ViewportFlags::empty()))
        .unwrap_err();
    assert!(matches!(
        err,
        PlatformError::Host {
            id: ViewportId(2),
            source: HostError::ContextCreation { .. }
        }
    ));
    assert_eq!(fx.platform.host().live_windows(), 1);
    assert_eq!(fx.platform.host().destroyed_windows.len(), 1);
    assert!(fx.platform.window_handles(ViewportId(2)).is_none());
    assert_eq!(fx.platform.len(), 1);
}

#[test]
fn window_limit_surfaces_as_platform_error() {
    let wm = SimWindowManager::new();
    let main_hwnd = wm.open_window("main", Rect::default());
    let mut host = SimHost::new(wm.clone()).with_max_windows(1);
    let window = host.adopt(main_hwnd);
    let context = host.create_context(window).unwrap();
    let mut platform = Win32Viewports::new(
        host,
        wm,
        MainViewport {
            id: MAIN,
            window,
            context,
            flags: ViewportFlags::empty(),
        },
    );

    let err = platform
        .create_window(&viewport(2, ViewportFlags::empty()))
        .unwrap_err();
    assert!(matches!(
        err,
        PlatformError::Host {
            source: HostError::WindowLimit { limit: 1 },
            ..
        }
    ));
}

#[test]
fn set_then_get_position_round_trips_through_the_border() {
    let mut fx = fixture();
    fx.create(&viewport(2, ViewportFlags::empty()));
    fx.create(&viewport(3, ViewportFlags::NO_DECORATION));

    for id in [ViewportId(2), ViewportId(3)] {
        for pos in [[0.0, 0.0], [640.0, 360.0], [-1500.0, 40.0]] {
            fx.platform.set_window_pos(id, pos);
            assert_eq!(fx.platform.window_pos(id), pos, "{id:?}");
            assert_eq!(fx.platform.window_size(id), [300.0, 150.0], "{id:?}");
        }
    }
}

#[test]
fn set_position_neither_resizes_nor_activates() {
    let mut fx = fixture();
    let hwnd = fx.create(&viewport(2, ViewportFlags::empty()));
    fx.wm.clear_calls();

    fx.platform.set_window_pos(ViewportId(2), [10.0, 10.0]);
    assert_eq!(
        fx.wm.calls(),
        vec![format!("set_window_pos({:#x}, {:#x})", hwnd.0, 0x4 | 0x1 | 0x10)]
    );
    assert_ne!(fx.wm.foreground_window(), Some(hwnd));
}

#[test]
fn set_then_get_size_round_trips_and_keeps_position() {
    let mut fx = fixture();
    fx.create(&viewport(2, ViewportFlags::empty()));
    fx.create(&viewport(3, ViewportFlags::NO_DECORATION));

    for id in [ViewportId(2), ViewportId(3)] {
        fx.platform.set_window_size(id, [512.0, 384.0]);
        assert_eq!(fx.platform.window_size(id), [512.0, 384.0], "{id:?}");
        assert_eq!(fx.platform.window_pos(id), [100.0, 200.0], "{id:?}");
    }
}

#[test]
fn show_honours_no_focus_on_appearing() {
    let mut fx = fixture();
    let quiet = viewport(2, ViewportFlags::NO_FOCUS_ON_APPEARING);
    let loud = viewport(3, ViewportFlags::empty());
    let quiet_hwnd = fx.create(&quiet);
    let loud_hwnd = fx.create(&loud);

    fx.platform.show_window(&quiet);
    assert_eq!(fx.wm.window(quiet_hwnd).unwrap().activations, 0);

    fx.platform.show_window(&loud);
    assert_eq!(fx.wm.window(loud_hwnd).unwrap().activations, 1);
    assert!(fx.platform.window_focus(loud.id));
}

#[test]
fn focus_brings_the_window_forward() {
    let mut fx = fixture();
    fx.create(&viewport(2, ViewportFlags::empty()));
    fx.wm.set_foreground(Some(fx.main_hwnd));
    assert!(fx.platform.window_focus(MAIN));
    assert!(!fx.platform.window_focus(ViewportId(2)));

    fx.platform.set_window_focus(ViewportId(2));
    assert!(fx.platform.window_focus(ViewportId(2)));
    assert!(!fx.platform.window_focus(MAIN));
}

#[test]
fn minimized_mirrors_iconic_state() {
    let mut fx = fixture();
    let hwnd = fx.create(&viewport(2, ViewportFlags::empty()));
    assert!(!fx.platform.window_minimized(ViewportId(2)));
    fx.wm.set_iconic(hwnd, true);
    assert!(fx.platform.window_minimized(ViewportId(2)));
}

#[test]
fn title_is_transcoded_to_utf16() {
    let mut fx = fixture();
    let hwnd = fx.create(&viewport(2, ViewportFlags::empty()));

    let title = "Fenêtre 視窗 \u{1F5D4}";
    fx.platform.set_window_title(ViewportId(2), title);
    assert_eq!(fx.wm.window(hwnd).unwrap().title, title);
}

#[test]
fn full_alpha_clears_the_layered_bit() {
    let mut fx = fixture();
    let hwnd = fx.create(&viewport(2, ViewportFlags::TOP_MOST));

    fx.platform.set_window_alpha(ViewportId(2), 0.5);
    let window = fx.wm.window(hwnd).unwrap();
    assert!(window.style.ex_style.contains(ExtendedStyle::LAYERED));
    assert_eq!(window.alpha, Some(127));

    fx.platform.set_window_alpha(ViewportId(2), 1.0);
    let ex_style = fx.wm.window(hwnd).unwrap().style.ex_style;
    assert!(!ex_style.contains(ExtendedStyle::LAYERED));
    assert_eq!(
        ex_style,
        ExtendedStyle::APP_WINDOW | ExtendedStyle::TOP_MOST
    );
}

#[test]
fn zero_alpha_is_fully_transparent() {
    let mut fx = fixture();
    let hwnd = fx.create(&viewport(2, ViewportFlags::empty()));
    fx.platform.set_window_alpha(ViewportId(2), 0.0);
    assert_eq!(fx.wm.window(hwnd).unwrap().alpha, Some(0));
}

#[test]
#[should_panic(expected = "alpha out of range")]
fn alpha_above_one_is_a_contract_violation() {
    let mut fx = fixture();
    fx.create(&viewport(2, ViewportFlags::empty()));
    fx.platform.set_window_alpha(ViewportId(2), 1.5);
}

#[test]
fn update_with_unchanged_flags_is_a_no_op() {
    let mut fx = fixture();
    let state = viewport(2, ViewportFlags::NO_TASK_BAR_ICON);
    fx.create(&state);
    fx.wm.clear_calls();

    assert_eq!(fx.platform.update_window(&state), Reconcile::None);
    assert!(fx.wm.calls().is_empty());
}

#[test]
fn update_does_not_fight_out_of_band_style_changes() {
    let mut fx = fixture();
    let state = viewport(2, ViewportFlags::empty());
    let hwnd = fx.create(&state);

    let tweaked = NativeStyle {
        style: WindowStyle::OVERLAPPED_WINDOW,
        ex_style: ExtendedStyle::APP_WINDOW | ExtendedStyle::TOP_MOST,
    };
    fx.wm.force_style(hwnd, tweaked);
    assert_eq!(fx.platform.update_window(&state), Reconcile::None);
    assert_eq!(fx.style(hwnd), tweaked);
}

#[test]
fn update_tracks_live_flags() {
    let mut fx = fixture();
    let state = viewport(2, ViewportFlags::empty());
    fx.create(&state);

    let moved = ViewportState {
        flags: ViewportFlags::NO_INPUTS,
        ..state
    };
    assert_eq!(fx.platform.update_window(&moved), Reconcile::None);
    assert_eq!(
        fx.platform.viewport_flags(ViewportId(2)),
        Some(ViewportFlags::NO_INPUTS)
    );
}

#[test]
fn update_never_restyles_the_main_window() {
    let mut fx = fixture();
    let before = fx.style(fx.main_hwnd);
    let state = ViewportState::new(MAIN, ViewportFlags::NO_DECORATION, [0.0, 0.0], [1280.0, 800.0]);
    assert_eq!(fx.platform.update_window(&state), Reconcile::None);
    assert_eq!(fx.style(fx.main_hwnd), before);
}

#[test]
fn destroy_moves_capture_to_main_before_closing() {
    let mut fx = fixture();
    let hwnd = fx.create(&viewport(2, ViewportFlags::empty()));
    fx.wm.set_capture(hwnd);
    fx.wm.clear_calls();

    fx.platform.destroy_window(ViewportId(2));

    assert_eq!(fx.wm.capture(), Some(fx.main_hwnd));
    assert_eq!(
        fx.wm.calls(),
        vec![
            "release_capture".to_owned(),
            format!("set_capture({:#x})", fx.main_hwnd.0),
            format!("destroy_window({:#x})", hwnd.0),
        ]
    );
}

#[test]
fn destroy_without_capture_leaves_capture_alone() {
    let mut fx = fixture();
    let hwnd = fx.create(&viewport(2, ViewportFlags::empty()));
    fx.wm.clear_calls();

    fx.platform.destroy_window(ViewportId(2));

    assert_eq!(fx.wm.capture(), None);
    assert_eq!(fx.wm.calls(), vec![format!("destroy_window({:#x})", hwnd.0)]);
    assert!(fx.wm.window(hwnd).is_none());
}

#[test]
fn destroy_releases_window_context_and_record() {
    let mut fx = fixture();
    fx.create(&viewport(2, ViewportFlags::empty()));
    let context = fx.platform.graphics_context(ViewportId(2)).unwrap();

    fx.platform.destroy_window(ViewportId(2));

    let host = fx.platform.host();
    assert_eq!(host.destroyed_windows.len(), 1);
    assert_eq!(host.discarded_contexts, vec![context]);
    assert_eq!(host.live_contexts(), 1);
    assert!(fx.platform.graphics_context(ViewportId(2)).is_none());
    assert_eq!(fx.platform.len(), 1);
}

#[test]
fn destroying_the_main_viewport_keeps_its_window() {
    let mut fx = fixture();
    fx.platform.destroy_window(MAIN);

    assert!(fx.wm.window(fx.main_hwnd).is_some());
    assert!(fx.platform.host().destroyed_windows.is_empty());
    assert!(fx.platform.host().discarded_contexts.is_empty());
    assert!(fx.platform.is_empty());
}

#[test]
fn capture_still_reaches_main_after_main_was_detached() {
    let mut fx = fixture();
    let hwnd = fx.create(&viewport(2, ViewportFlags::empty()));
    fx.wm.set_capture(hwnd);

    // Dear ImGui tears down the main viewport first on shutdown
    fx.platform.destroy_window(MAIN);
    fx.platform.destroy_window(ViewportId(2));

    assert_eq!(fx.wm.capture(), Some(fx.main_hwnd));
}

#[test]
#[should_panic(expected = "no platform data")]
fn hooks_on_unknown_viewports_panic() {
    let fx = fixture();
    fx.platform.window_pos(ViewportId(42));
}

#[test]
#[should_panic(expected = "has no native window")]
fn hooks_on_vanished_windows_panic() {
    let mut fx = fixture();
    fx.create(&viewport(2, ViewportFlags::empty()));
    let window = fx.platform.window_handles(ViewportId(2)).unwrap().window;
    fx.platform.host_mut().destroy_window(window);
    fx.platform.window_size(ViewportId(2));
}

#[test]
fn dpi_scale_is_process_wide() {
    let mut fx = fixture();
    fx.create(&viewport(2, ViewportFlags::empty()));
    assert_relative_eq!(fx.platform.window_dpi_scale(MAIN), 1.5);
    assert_relative_eq!(fx.platform.window_dpi_scale(ViewportId(2)), 1.5);
}

#[test]
fn lookups_resolve_both_directions() {
    let mut fx = fixture();
    let hwnd = fx.create(&viewport(2, ViewportFlags::empty()));
    let handles = fx.platform.window_handles(ViewportId(2)).unwrap();

    assert_eq!(handles.native, hwnd);
    assert_eq!(
        fx.platform.viewport_for_window(handles.window),
        Some(ViewportId(2))
    );
    assert_eq!(fx.platform.viewport_for_native(hwnd), Some(ViewportId(2)));
    assert_eq!(fx.platform.viewport_for_native(fx.main_hwnd), Some(MAIN));
    assert_eq!(fx.platform.viewport_for_native(NativeWindow(0xdead)), None);
    assert_eq!(fx.platform.main_viewport().id, MAIN);
}

#[test]
fn poll_mouse_scales_by_dpi_and_reports_hover() {
    let mut fx = fixture();
    fx.create(&viewport(2, ViewportFlags::NO_DECORATION));
    fx.wm.set_foreground(Some(fx.main_hwnd));
    fx.wm.set_cursor(Some(Point { x: 150, y: 210 }));

    let update = fx.platform.poll_mouse(&|_| Some(ViewportFlags::empty()));
    assert_eq!(update.pos, Some([100.0, 140.0]));
    assert_eq!(update.hovered, Some(ViewportId(2)));

    let update = fx.platform.poll_mouse(&|id| {
        Some(if id == ViewportId(2) {
            ViewportFlags::NO_INPUTS
        } else {
            ViewportFlags::empty()
        })
    });
    assert_eq!(update.hovered, None);
}

#[test]
fn refresh_monitors_uses_host_dpi() {
    let fx = fixture();
    fx.wm.push_monitor(MonitorInfo {
        monitor: Rect {
            left: 0,
            top: 0,
            right: 2560,
            bottom: 1440,
        },
        work: Rect {
            left: 0,
            top: 0,
            right: 2560,
            bottom: 1400,
        },
        primary: true,
    });

    let mut monitors = MonitorList::new();
    assert!(fx.platform.refresh_monitors(&mut monitors));
    assert_relative_eq!(monitors.monitors()[0].dpi_scale, 1.5);
    assert!(!fx.platform.refresh_monitors(&mut monitors));
}

#[test]
fn plain_viewport_flipped_borderless_then_destroyed_under_capture() {
    let mut fx = fixture();

    let plain = viewport(2, ViewportFlags::empty());
    let hwnd = fx.create(&plain);
    assert_eq!(fx.style(hwnd).style, WindowStyle::OVERLAPPED_WINDOW);
    assert_eq!(fx.style(hwnd).ex_style, ExtendedStyle::APP_WINDOW);

    let borderless = ViewportState {
        flags: ViewportFlags::NO_DECORATION,
        ..plain
    };
    assert_eq!(
        fx.platform.update_window(&borderless),
        Reconcile::MoveAndResize
    );
    assert_eq!(fx.style(hwnd).style, WindowStyle::POPUP);
    assert_eq!(fx.platform.window_pos(plain.id), plain.pos);
    assert_eq!(fx.platform.window_size(plain.id), plain.size);

    fx.wm.set_capture(hwnd);
    fx.platform.destroy_window(plain.id);
    assert_eq!(fx.wm.capture(), Some(fx.main_hwnd));
    assert!(fx.wm.window(hwnd).is_none());
}
