//! Event handling for the askme TUI.

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// Text pasted while bracketed paste is on, line breaks included.
    Paste(String),
    /// A tick event for UI updates.
    Tick,
    /// Terminal was resized.
    Resize(u16, u16),
}

/// Event handler that runs in a background thread.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        // crossterm polling is blocking, so it gets its own thread
        std::thread::spawn(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let event = match evt {
                            CrosstermEvent::Key(key) => Some(Event::Key(key)),
                            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                            CrosstermEvent::Paste(text) => Some(Event::Paste(text)),
                            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                            _ => None,
                        };
                        if let Some(e) = event {
                            if tx_clone.send(e).is_err() {
                                break;
                            }
                        }
                    }
                } else if tx_clone.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Get the next event, waiting until one is available.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Key action that can be performed in the TUI.
///
/// Keys that map to [`Action::None`] are text editing keys and go to the
/// prompt field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    Submit,
    Newline,
    Export,
    CopyLast,
    Back,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    None,
}

/// Convert a key event to an action.
///
/// `?` opens help only while the prompt field is empty; otherwise it is
/// typed like any other character.
pub fn key_to_action(key: KeyEvent, input_empty: bool) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('e') => Action::Export,
            KeyCode::Char('y') => Action::CopyLast,
            KeyCode::Char('j') | KeyCode::Enter => Action::Newline,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('?') if input_empty => Action::Help,
        KeyCode::Enter => Action::Submit,
        KeyCode::Esc => Action::Back,
        KeyCode::Up => Action::ScrollUp,
        KeyCode::Down => Action::ScrollDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(key_to_action(ctrl('c'), false), Action::Quit);
        assert_eq!(key_to_action(ctrl('e'), true), Action::Export);
        assert_eq!(key_to_action(ctrl('y'), true), Action::CopyLast);
        assert_eq!(key_to_action(ctrl('j'), false), Action::Newline);
        assert_eq!(key_to_action(ctrl('x'), false), Action::None);
    }

    #[test]
    fn test_enter_submits() {
        assert_eq!(key_to_action(key(KeyCode::Enter), false), Action::Submit);
        assert_eq!(key_to_action(key(KeyCode::Enter), true), Action::Submit);
    }

    #[test]
    fn test_question_mark_depends_on_input() {
        assert_eq!(key_to_action(key(KeyCode::Char('?')), true), Action::Help);
        assert_eq!(key_to_action(key(KeyCode::Char('?')), false), Action::None);
    }

    #[test]
    fn test_scroll_keys() {
        assert_eq!(key_to_action(key(KeyCode::Up), false), Action::ScrollUp);
        assert_eq!(key_to_action(key(KeyCode::Down), false), Action::ScrollDown);
        assert_eq!(key_to_action(key(KeyCode::PageUp), false), Action::PageUp);
        assert_eq!(key_to_action(key(KeyCode::PageDown), false), Action::PageDown);
    }

    #[test]
    fn test_plain_chars_are_text() {
        assert_eq!(key_to_action(key(KeyCode::Char('q')), true), Action::None);
        assert_eq!(key_to_action(key(KeyCode::Backspace), false), Action::None);
    }
}
