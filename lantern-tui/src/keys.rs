//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    SwitchView(usize),
    MoveUp,
    MoveDown,
    /// Open the selected story.
    Confirm,
    /// Leave the story detail.
    Back,
    LoadMore,
    Refresh,
    Increment,
    Decrement,
    StepUp,
    StepDown,
    EditCity,
    OpenCommand,
}

/// Keys while a text prompt (city or command line) has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    Char(char),
    Backspace,
    Submit,
    Cancel,
}

pub fn map_key(event: KeyEvent) -> Option<Action> {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char(':') => Some(Action::OpenCommand),
        KeyCode::Char('m') => Some(Action::LoadMore),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char('c') => Some(Action::EditCity),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::Increment),
        KeyCode::Char('-') => Some(Action::Decrement),
        KeyCode::Char(']') => Some(Action::StepUp),
        KeyCode::Char('[') => Some(Action::StepDown),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc | KeyCode::Backspace => Some(Action::Back),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::BackTab => Some(Action::PrevView),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Char(c @ '1'..='3') => Some(Action::SwitchView(c as usize - '1' as usize)),
        _ => None,
    }
}

pub fn map_input_key(event: KeyEvent) -> Option<InputKey> {
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match event.code {
        KeyCode::Char(c) => Some(InputKey::Char(c)),
        KeyCode::Backspace => Some(InputKey::Backspace),
        KeyCode::Enter => Some(InputKey::Submit),
        KeyCode::Esc => Some(InputKey::Cancel),
        _ => None,
    }
}
