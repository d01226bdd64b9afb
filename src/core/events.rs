use bilicopy_core::core::events::{MountLocator, Presenter, StreamOption, UiState};

use crate::core::locale::Messages;

/// Presenter for the command line. State labels go to stderr. The option
/// list goes to stdout when listing is the whole job, else to stderr so the
/// copied URL stays the only line on stdout.
pub struct TerminalPresenter {
    messages: &'static Messages,
    list_to_stdout: bool,
}

impl TerminalPresenter {
    pub fn new(messages: &'static Messages, list_to_stdout: bool) -> Self {
        Self {
            messages,
            list_to_stdout,
        }
    }

    pub fn option_lines(&self, options: &[StreamOption]) -> Vec<String> {
        let mut lines = vec![
            self.messages.button_title.to_string(),
            format!("{}:", self.messages.select_placeholder),
        ];
        for opt in options {
            let qn = opt.qn.map(|q| q.to_string()).unwrap_or_else(|| "-".into());
            lines.push(format!("  [{}] qn={:<4} {}", opt.index, qn, opt.label));
        }
        lines
    }

    pub fn state_label(&self, state: &UiState) -> String {
        match state {
            UiState::Idle | UiState::Ready => self.messages.button_idle.to_string(),
            UiState::Fetching | UiState::Copying => self.messages.button_fetching.to_string(),
            UiState::Copied => self.messages.button_copied.to_string(),
            UiState::Error { message } => format!("{} {}", self.messages.button_error, message),
        }
    }
}

impl Presenter for TerminalPresenter {
    fn emit_state(&self, state: &UiState) {
        tracing::debug!("[ui] state -> {:?}", state);
        if matches!(state, UiState::Idle | UiState::Ready) {
            return;
        }
        eprintln!("{}", self.state_label(state));
    }

    fn emit_options(&self, options: &[StreamOption]) {
        for line in self.option_lines(options) {
            if self.list_to_stdout {
                println!("{}", line);
            } else {
                eprintln!("{}", line);
            }
        }
    }
}

/// A terminal always has somewhere to render.
pub struct TerminalMount;

impl MountLocator for TerminalMount {
    fn find_mount_point(&self) -> bool {
        true
    }
}
