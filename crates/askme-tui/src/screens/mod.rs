//! Screen definitions for the askme TUI.

pub mod chat;

use crate::app::App;
use crate::layout::centered_fixed;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

const HELP_TEXT: &str = r"
  Prompt
    Enter             Ask
    Ctrl+J            Newline
    Esc               Dismiss error

  Transcript
    Up/Down           Scroll
    PgUp/PgDn         Scroll a page
    Ctrl+Y            Copy last response
    Ctrl+E            Export to markdown

  Ctrl+C quit, ? toggle this help

  [Press any key to close]
";

/// Render the help overlay.
pub fn render_help_overlay(theme: &Theme, area: Rect, buf: &mut Buffer) {
    let width = 50.min(area.width.saturating_sub(4));
    let height = 19.min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(theme.styles().title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().fg(theme.text));

    Paragraph::new(HELP_TEXT)
        .block(block)
        .render(overlay_area, buf);
}

/// Draw the whole UI: the chat screen plus the help overlay when open.
pub fn draw(app: &App, area: Rect, buf: &mut Buffer) {
    chat::ChatScreen.render(app, area, buf);
    if app.show_help {
        render_help_overlay(&app.theme, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{buffer_to_string, create_test_app};

    #[test]
    fn test_help_overlay_lists_keys() {
        let mut app = create_test_app();
        app.show_help = true;

        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        draw(&app, area, &mut buf);
        let screen = buffer_to_string(&buf);

        assert!(screen.contains(" Help "));
        assert!(screen.contains("Copy last response"));
        assert!(screen.contains("Export to markdown"));
    }

    #[test]
    fn test_help_overlay_hidden_by_default() {
        let app = create_test_app();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        draw(&app, area, &mut buf);
        assert!(!buffer_to_string(&buf).contains(" Help "));
    }
}
