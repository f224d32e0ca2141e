//! Chat screen: transcript on top, prompt input, status line at the bottom.

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use super::Screen;
use crate::app::App;
use crate::layout::chat_layout;
use crate::widgets::{InputBar, StatusBar, TranscriptView};

/// The single conversation screen.
pub struct ChatScreen;

impl Screen for ChatScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let input_height = InputBar::height_for(&app.input_state);
        let (transcript_area, input_area, status_area) = chat_layout(area, input_height);

        TranscriptView::new(app.flow.exchanges(), &app.theme, &app.transcript_cache)
            .scroll_back(app.transcript_scroll)
            .render(transcript_area, buf);

        InputBar::new(&app.input_state, &app.theme)
            .focused(!app.show_help)
            .loading(app.is_pending(), app.tick)
            .render(input_area, buf);

        let status = app.status();
        StatusBar::new(&status, &app.theme).render(status_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        create_test_app, create_test_app_with, render_screen_to_string, FakeGenerator,
    };
    use askme_engine::MemoryStorage;
    use std::sync::Arc;

    #[test]
    fn test_empty_chat_screen() {
        let app = create_test_app();
        let screen = render_screen_to_string(&ChatScreen, &app);

        assert!(screen.contains("Ask me.."));
        assert!(screen.contains("No questions yet"));
        assert!(screen.contains("Enter your prompt here..."));
        assert!(screen.contains("Ask me! (Enter)"));
        assert!(screen.contains("Idle"));
        assert!(screen.contains("0 exchanges"));
    }

    #[test]
    fn test_chat_screen_shows_history() {
        let storage = Arc::new(MemoryStorage::with_entry(
            "history",
            r#"[{"prompt":"What is Rust?","response":"A **systems** language."},{"prompt":"Why?","response":"Speed"}]"#,
        ));
        let app = create_test_app_with(storage, FakeGenerator::replying("unused"));
        let screen = render_screen_to_string(&ChatScreen, &app);

        assert!(screen.contains("Q: What is Rust?"));
        assert!(screen.contains("A systems language."));
        assert!(screen.contains("Q: Why?"));
        assert!(screen.contains("2 exchanges"));

        let first = screen.find("Q: What is Rust?").unwrap();
        let second = screen.find("Q: Why?").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_chat_screen_shows_typed_prompt() {
        let mut app = create_test_app();
        app.input_state.insert_str("Hello");
        let screen = render_screen_to_string(&ChatScreen, &app);

        assert!(screen.contains("> Hello"));
        assert!(!screen.contains("Enter your prompt here..."));
    }
}
