//! "Really Quit?" confirmation for main-window close requests

use dear_imgui_rs::Ui;

pub const QUIT_POPUP: &str = "Really Quit?";

/// Where the confirmation is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuitPrompt {
    #[default]
    Idle,
    /// A close was requested; the modal opens on the next frame
    Requested,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitChoice {
    Ok,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitDecision {
    Stay,
    Exit,
}

impl QuitPrompt {
    /// Ask for confirmation. Repeated requests while pending are ignored.
    pub fn request(&mut self) {
        if *self == QuitPrompt::Idle {
            *self = QuitPrompt::Requested;
        }
    }

    pub fn is_open(self) -> bool {
        self == QuitPrompt::Open
    }

    /// `true` exactly once per request: the frame that must open the popup
    pub fn take_open_request(&mut self) -> bool {
        if *self == QuitPrompt::Requested {
            *self = QuitPrompt::Open;
            true
        } else {
            false
        }
    }

    pub fn resolve(&mut self, choice: QuitChoice) -> QuitDecision {
        *self = QuitPrompt::Idle;
        match choice {
            QuitChoice::Ok => QuitDecision::Exit,
            QuitChoice::Cancel => QuitDecision::Stay,
        }
    }

    /// Draw the modal when pending or open
    pub fn draw(&mut self, ui: &Ui) -> QuitDecision {
        if self.take_open_request() {
            ui.open_popup(QUIT_POPUP);
        }
        if !self.is_open() {
            return QuitDecision::Stay;
        }

        let choice = ui.modal_popup(QUIT_POPUP, || {
            ui.text("Quit the application?");
            ui.separator();
            let mut choice = None;
            if ui.button("OK") {
                choice = Some(QuitChoice::Ok);
            }
            ui.same_line();
            if ui.button("Cancel") {
                choice = Some(QuitChoice::Cancel);
            }
            if choice.is_some() {
                ui.close_current_popup();
            }
            choice
        });

        match choice {
            Some(Some(choice)) => self.resolve(choice),
            Some(None) => QuitDecision::Stay,
            // Closed without an answer
            None => {
                *self = QuitPrompt::Idle;
                QuitDecision::Stay
            }
        }
    }
}
