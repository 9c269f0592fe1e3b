use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::dashboard::state::InputMode;
use crate::links::DashboardAction;

/// What the user asked the dashboard to do, decoupled from the key layout
/// and from the terminal toolkit delivering the events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Refresh,
    MoveUp,
    MoveDown,
    Open(DashboardAction),
    ShowEnvVars,
    StartSearch,
    SearchChar(char),
    SearchBackspace,
    SearchAccept,
    SearchCancel,
    Dismiss,
}

/// Dispatch table from key events to commands, per input mode. Anything the
/// table does not know is ignored.
pub fn map_key(mode: InputMode, modal_open: bool, key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if modal_open {
        return match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('v') => {
                Some(Command::Dismiss)
            }
            _ => None,
        };
    }

    match mode {
        InputMode::Search => match key.code {
            KeyCode::Esc => Some(Command::SearchCancel),
            KeyCode::Enter => Some(Command::SearchAccept),
            KeyCode::Backspace => Some(Command::SearchBackspace),
            KeyCode::Char(c) => Some(Command::SearchChar(c)),
            _ => None,
        },
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => Some(Command::Quit),
            KeyCode::Char('r') => Some(Command::Refresh),
            KeyCode::Up | KeyCode::Char('k') => Some(Command::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Command::MoveDown),
            KeyCode::Char('l') => Some(Command::Open(DashboardAction::Logs)),
            KeyCode::Char('e') => Some(Command::Open(DashboardAction::Events)),
            KeyCode::Char('m') => Some(Command::Open(DashboardAction::Metrics)),
            KeyCode::Char('s') => Some(Command::Open(DashboardAction::Settings)),
            KeyCode::Char('d') => Some(Command::Open(DashboardAction::Deploys)),
            KeyCode::Char('v') => Some(Command::ShowEnvVars),
            KeyCode::Char('/') => Some(Command::StartSearch),
            KeyCode::Esc => Some(Command::Dismiss),
            _ => None,
        },
    }
}
