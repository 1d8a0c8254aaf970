//! Native window style bits and their derivation from viewport flags

use bitflags::bitflags;

use crate::ViewportFlags;

bitflags! {
    /// `WS_*` window style bits used for viewport windows
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowStyle: u32 {
        /// `WS_POPUP`: no frame, no caption
        const POPUP = 0x8000_0000;
        /// `WS_OVERLAPPEDWINDOW`: caption, system menu, sizing frame, min/max boxes
        const OVERLAPPED_WINDOW = 0x00CF_0000;
    }
}

bitflags! {
    /// `WS_EX_*` extended window style bits used for viewport windows
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExtendedStyle: u32 {
        /// `WS_EX_TOPMOST`
        const TOP_MOST = 0x0000_0008;
        /// `WS_EX_TOOLWINDOW`: no task bar button
        const TOOL_WINDOW = 0x0000_0080;
        /// `WS_EX_APPWINDOW`: force a task bar button
        const APP_WINDOW = 0x0004_0000;
        /// `WS_EX_LAYERED`: whole-window alpha through the compositor
        const LAYERED = 0x0008_0000;
    }
}

#[cfg(windows)]
mod checks {
    use super::{ExtendedStyle, WindowStyle};
    use windows_sys::Win32::UI::WindowsAndMessaging as wm;

    const _: () = assert!(WindowStyle::POPUP.bits() == wm::WS_POPUP);
    const _: () = assert!(WindowStyle::OVERLAPPED_WINDOW.bits() == wm::WS_OVERLAPPEDWINDOW);
    const _: () = assert!(ExtendedStyle::TOP_MOST.bits() == wm::WS_EX_TOPMOST);
    const _: () = assert!(ExtendedStyle::TOOL_WINDOW.bits() == wm::WS_EX_TOOLWINDOW);
    const _: () = assert!(ExtendedStyle::APP_WINDOW.bits() == wm::WS_EX_APPWINDOW);
    const _: () = assert!(ExtendedStyle::LAYERED.bits() == wm::WS_EX_LAYERED);
}

/// The style pair applied to a viewport window (`GWL_STYLE` / `GWL_EXSTYLE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeStyle {
    pub style: WindowStyle,
    pub ex_style: ExtendedStyle,
}

impl NativeStyle {
    /// Derive the native style for a viewport.
    ///
    /// - `NO_DECORATION` selects a borderless popup, anything else an overlapped window
    /// - `NO_TASK_BAR_ICON` selects a tool window, anything else an app window
    /// - `TOP_MOST` adds the topmost bit on top of either
    pub fn for_flags(flags: ViewportFlags) -> Self {
        let style = if flags.contains(ViewportFlags::NO_DECORATION) {
            WindowStyle::POPUP
        } else {
            WindowStyle::OVERLAPPED_WINDOW
        };

        let mut ex_style = if flags.contains(ViewportFlags::NO_TASK_BAR_ICON) {
            ExtendedStyle::TOOL_WINDOW
        } else {
            ExtendedStyle::APP_WINDOW
        };
        if flags.contains(ViewportFlags::TOP_MOST) {
            ex_style |= ExtendedStyle::TOP_MOST;
        }

        Self { style, ex_style }
    }

    /// Whether windows with this style carry an OS-drawn frame
    pub fn has_frame(&self) -> bool {
        self.style.contains(WindowStyle::OVERLAPPED_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const INTERESTING: [ViewportFlags; 3] = [
        ViewportFlags::NO_DECORATION,
        ViewportFlags::NO_TASK_BAR_ICON,
        ViewportFlags::TOP_MOST,
    ];

    fn all_combinations() -> impl Iterator<Item = ViewportFlags> {
        (0u32..8).map(|mask| {
            INTERESTING
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .fold(ViewportFlags::empty(), |acc, (_, flag)| acc | *flag)
        })
    }

    #[test]
    fn plain_viewport_is_overlapped_app_window() {
        let style = NativeStyle::for_flags(ViewportFlags::empty());
        assert_eq!(style.style, WindowStyle::OVERLAPPED_WINDOW);
        assert_eq!(style.ex_style, ExtendedStyle::APP_WINDOW);
        assert!(style.has_frame());
    }

    #[test]
    fn every_flag_combination_follows_the_derivation_rule() {
        for flags in all_combinations() {
            let style = NativeStyle::for_flags(flags);

            if flags.contains(ViewportFlags::NO_DECORATION) {
                assert_eq!(style.style, WindowStyle::POPUP, "{flags:?}");
            } else {
                assert_eq!(style.style, WindowStyle::OVERLAPPED_WINDOW, "{flags:?}");
            }

            if flags.contains(ViewportFlags::NO_TASK_BAR_ICON) {
                assert!(style.ex_style.contains(ExtendedStyle::TOOL_WINDOW), "{flags:?}");
                assert!(!style.ex_style.contains(ExtendedStyle::APP_WINDOW), "{flags:?}");
            } else {
                assert!(style.ex_style.contains(ExtendedStyle::APP_WINDOW), "{flags:?}");
                assert!(!style.ex_style.contains(ExtendedStyle::TOOL_WINDOW), "{flags:?}");
            }

            assert_eq!(
                style.ex_style.contains(ExtendedStyle::TOP_MOST),
                flags.contains(ViewportFlags::TOP_MOST),
                "{flags:?}"
            );
            assert!(!style.ex_style.contains(ExtendedStyle::LAYERED));
        }
    }

    #[test]
    fn unrelated_flags_do_not_change_the_style() {
        let base = NativeStyle::for_flags(ViewportFlags::NO_DECORATION);
        let noisy = NativeStyle::for_flags(
            ViewportFlags::NO_DECORATION
                | ViewportFlags::NO_INPUTS
                | ViewportFlags::NO_FOCUS_ON_APPEARING
                | ViewportFlags::IS_PLATFORM_WINDOW,
        );
        assert_eq!(base, noisy);
    }
}
