//! Full-width input bar widget.
//!
//! Always visible at the bottom of the screen for prompt entry.
//! Supports multi-line input with Ctrl+J for newlines. While a submission is
//! in flight the submit hint in the bottom border becomes a spinner.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::TextInputState;
use crate::theme::Theme;

/// Placeholder shown while the field is empty.
pub const PLACEHOLDER: &str = "Enter your prompt here...";

/// Spinner frames, advanced once per tick.
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Most content lines the bar grows to before scrolling.
const MAX_VISIBLE_LINES: usize = 5;

/// Full-width input bar for prompt entry.
pub struct InputBar<'a> {
    input: &'a TextInputState,
    theme: &'a Theme,
    focused: bool,
    loading: bool,
    tick: usize,
}

impl<'a> InputBar<'a> {
    /// Create a new input bar widget.
    pub fn new(input: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            input,
            theme,
            focused: true,
            loading: false,
            tick: 0,
        }
    }

    /// Set whether the input bar is focused.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Show the processing spinner instead of the submit hint.
    #[must_use]
    pub fn loading(mut self, loading: bool, tick: usize) -> Self {
        self.loading = loading;
        self.tick = tick;
        self
    }

    /// Height the bar needs for `input`, borders included.
    #[allow(clippy::cast_possible_truncation)]
    pub fn height_for(input: &TextInputState) -> u16 {
        let lines = input.content().split('\n').count().clamp(1, MAX_VISIBLE_LINES);
        lines as u16 + 2
    }

    /// Build Lines for multi-line input display.
    /// Returns the lines to display and which line index contains the cursor.
    fn build_input_lines(&self) -> (Vec<Line<'static>>, usize) {
        let styles = self.theme.styles();
        let cursor_style = styles.cursor;
        let prefix_style = styles.prompt_marker;

        if self.input.is_empty() {
            let mut spans = vec![Span::styled("> ", prefix_style)];
            if self.focused {
                spans.push(Span::styled("█", cursor_style));
            }
            spans.push(Span::styled(PLACEHOLDER, styles.placeholder));
            return (vec![Line::from(spans)], 0);
        }

        let content = self.input.content();
        let cursor_pos = self.input.cursor;
        let text_lines: Vec<&str> = content.split('\n').collect();

        // Locate the cursor line and column
        let mut char_count = 0;
        let mut cursor_line = 0;
        let mut cursor_col = 0;
        for (line_idx, line) in text_lines.iter().enumerate() {
            let line_len = line.chars().count();
            if cursor_pos <= char_count + line_len {
                cursor_line = line_idx;
                cursor_col = cursor_pos - char_count;
                break;
            }
            char_count += line_len + 1;
        }

        let mut lines = Vec::with_capacity(text_lines.len());
        for (line_idx, line_text) in text_lines.iter().enumerate() {
            let prefix = if line_idx == 0 { "> " } else { "  " };
            let mut spans = vec![Span::styled(prefix, prefix_style)];

            if self.focused && line_idx == cursor_line {
                let chars: Vec<char> = line_text.chars().collect();
                let before: String = chars[..cursor_col.min(chars.len())].iter().collect();
                let after: String = chars[cursor_col.min(chars.len())..].iter().collect();
                spans.push(Span::raw(before));
                spans.push(Span::styled("█", cursor_style));
                spans.push(Span::raw(after));
            } else {
                spans.push(Span::raw((*line_text).to_string()));
            }
            lines.push(Line::from(spans));
        }

        (lines, cursor_line)
    }

    fn submit_hint(&self) -> Line<'static> {
        let styles = self.theme.styles();
        if self.loading {
            let frame = SPINNER[self.tick % SPINNER.len()];
            Line::from(Span::styled(
                format!(" {frame} Processing... "),
                styles.spinner,
            ))
        } else {
            Line::from(vec![
                Span::styled(" Ask me! ", styles.submit_label),
                Span::styled("(Enter) ", styles.submit_key),
            ])
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(self.theme.border_focused)
        } else {
            Style::default().fg(self.theme.border)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title_bottom(self.submit_hint().right_aligned());

        let inner_height = area.height.saturating_sub(2) as usize;
        let (lines, cursor_line) = self.build_input_lines();

        // Keep the cursor line visible
        let scroll_offset = if lines.len() <= inner_height {
            0
        } else {
            cursor_line.saturating_sub(inner_height.saturating_sub(1))
        };

        Paragraph::new(lines)
            .block(block)
            .style(Style::default().fg(self.theme.text))
            .scroll((scroll_offset as u16, 0))
            .render(area, buf);
    }
}
