use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::message::Input;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Decode a terminal event into an [`Input`], if it maps to one.
pub fn to_input(event: &Event) -> Option<Input> {
    match event {
        Event::Key(key) => key_to_input(key),
        _ => None,
    }
}

/// Map a key press to an [`Input`]
pub fn key_to_input(key: &KeyEvent) -> Option<Input> {
    // Windows terminals also report releases
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let input = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Input::Quit,
        KeyCode::Char('q') => Input::Quit,

        KeyCode::Char('r') => Input::Refresh,
        KeyCode::Char('?') => Input::ToggleHelp,
        KeyCode::Tab | KeyCode::BackTab => Input::TogglePanel,

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => Input::Up,
        KeyCode::Down | KeyCode::Char('j') => Input::Down,
        KeyCode::PageUp | KeyCode::Char('b') => Input::PageUp,
        KeyCode::PageDown | KeyCode::Char('f') | KeyCode::Char(' ') => Input::PageDown,
        KeyCode::Home | KeyCode::Char('g') => Input::Home,
        KeyCode::End | KeyCode::Char('G') => Input::End,

        KeyCode::Enter => Input::Select,
        KeyCode::Esc | KeyCode::Backspace => Input::Back,

        _ => return None,
    };
    Some(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(key_to_input(&key(KeyCode::Up)), Some(Input::Up));
        assert_eq!(key_to_input(&key(KeyCode::Char('j'))), Some(Input::Down));
        assert_eq!(key_to_input(&key(KeyCode::Char('G'))), Some(Input::End));
        assert_eq!(key_to_input(&key(KeyCode::Char(' '))), Some(Input::PageDown));
        assert_eq!(key_to_input(&key(KeyCode::Enter)), Some(Input::Select));
        assert_eq!(key_to_input(&key(KeyCode::Backspace)), Some(Input::Back));
        assert_eq!(key_to_input(&key(KeyCode::Tab)), Some(Input::TogglePanel));
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(key_to_input(&key(KeyCode::Char('q'))), Some(Input::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_input(&ctrl_c), Some(Input::Quit));
        assert_eq!(key_to_input(&key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn test_release_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('r'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(key_to_input(&release), None);
        assert_eq!(key_to_input(&key(KeyCode::Char('r'))), Some(Input::Refresh));
    }

    #[test]
    fn test_non_key_events() {
        assert_eq!(to_input(&Event::Resize(80, 24)), None);
        assert_eq!(to_input(&Event::Key(key(KeyCode::Char('?')))), Some(Input::ToggleHelp));
    }
}
