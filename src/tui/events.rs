use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

/// User actions from keyboard events
#[derive(Debug, PartialEq)]
pub enum Action {
    Quit,
    Escape,
    MoveUp,
    MoveDown,
    PrevDay,
    NextDay,
    PrevMonth,
    NextMonth,
    PrevYear,
    NextYear,
    Submit,
    ToggleTab,
    Input(char),
    DeleteChar,
    None,
}

/// Poll for keyboard events and convert to actions.
///
/// A zero timeout returns immediately, which is how the loop keeps a search
/// moving while still seeing every key press.
pub fn poll_event(timeout: Duration) -> anyhow::Result<Action> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
    {
        return Ok(key_to_action(key));
    }
    Ok(Action::None)
}

fn key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::Escape,

        // Lists
        (KeyCode::Char('p'), KeyModifiers::CONTROL) => Action::MoveUp,
        (KeyCode::Char('n'), KeyModifiers::CONTROL) => Action::MoveDown,
        (KeyCode::Up, _) => Action::MoveUp,
        (KeyCode::Down, _) => Action::MoveDown,

        // Calendar
        (KeyCode::Left, _) => Action::PrevDay,
        (KeyCode::Right, _) => Action::NextDay,
        (KeyCode::PageUp, KeyModifiers::SHIFT) => Action::PrevYear,
        (KeyCode::PageDown, KeyModifiers::SHIFT) => Action::NextYear,
        (KeyCode::PageUp, _) => Action::PrevMonth,
        (KeyCode::PageDown, _) => Action::NextMonth,

        (KeyCode::Enter, _) => Action::Submit,
        (KeyCode::Tab, _) => Action::ToggleTab,

        // Text input
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::Input(c)
        }
        (KeyCode::Backspace, _) => Action::DeleteChar,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_and_escape() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_c), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Escape);
    }

    #[test]
    fn test_list_navigation() {
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::MoveUp);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::MoveDown);
        let ctrl_p = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_p), Action::MoveUp);
        let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_n), Action::MoveDown);
    }

    #[test]
    fn test_calendar_navigation() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::PrevDay);
        assert_eq!(key_to_action(key(KeyCode::Right)), Action::NextDay);
        assert_eq!(key_to_action(key(KeyCode::PageUp)), Action::PrevMonth);
        assert_eq!(key_to_action(key(KeyCode::PageDown)), Action::NextMonth);

        let shift_up = KeyEvent::new(KeyCode::PageUp, KeyModifiers::SHIFT);
        assert_eq!(key_to_action(shift_up), Action::PrevYear);
        let shift_down = KeyEvent::new(KeyCode::PageDown, KeyModifiers::SHIFT);
        assert_eq!(key_to_action(shift_down), Action::NextYear);
    }

    #[test]
    fn test_text_input() {
        assert_eq!(key_to_action(key(KeyCode::Char('q'))), Action::Input('q'));
        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(key_to_action(shifted), Action::Input('A'));
        assert_eq!(key_to_action(key(KeyCode::Backspace)), Action::DeleteChar);
    }

    #[test]
    fn test_submit_and_tab() {
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Submit);
        assert_eq!(key_to_action(key(KeyCode::Tab)), Action::ToggleTab);
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(key_to_action(key(KeyCode::F(1))), Action::None);
        let ctrl_z = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_z), Action::None);
    }
}
