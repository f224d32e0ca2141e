//! Status bar widget for the bottom of the TUI.
//!
//! Format: `● State │ model │ N exchanges │ message`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use askme_engine::SubmissionState;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::Theme;

/// Marks a message cut to fit the bar.
const ELLIPSIS: &str = "...";

/// Status bar content.
#[derive(Debug, Clone, Default)]
pub struct StatusBarContent {
    /// Submission state.
    pub state: SubmissionState,
    /// Model answering prompts.
    pub model: String,
    /// Number of exchanges in the log.
    pub exchanges: usize,
    /// Transient notification.
    pub notification: Option<String>,
}

/// Status bar widget.
pub struct StatusBar<'a> {
    content: &'a StatusBarContent,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar widget.
    pub fn new(content: &'a StatusBarContent, theme: &'a Theme) -> Self {
        Self { content, theme }
    }

    fn state_label(&self) -> (&'static str, Color) {
        match self.content.state {
            SubmissionState::Idle => ("Idle", self.theme.idle),
            SubmissionState::Pending => ("Processing", self.theme.busy),
            SubmissionState::Failed(_) => ("Failed", self.theme.failed),
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (label, color) = self.state_label();
        let separator = Style::default().fg(self.theme.dim);
        let count = match self.content.exchanges {
            1 => "1 exchange".to_string(),
            n => format!("{n} exchanges"),
        };

        let mut spans = vec![
            Span::styled("● ", Style::default().fg(color)),
            Span::styled(label, Style::default().fg(self.theme.text)),
            Span::styled(" │ ", separator),
            Span::styled(self.content.model.as_str(), Style::default().fg(self.theme.dim)),
            Span::styled(" │ ", separator),
            Span::styled(count, Style::default().fg(self.theme.link)),
        ];

        // A failure stays visible until dismissed; notifications come second
        let message = match &self.content.state {
            SubmissionState::Failed(error) => {
                Some((format!("{error} (Esc to dismiss)"), self.theme.failed))
            }
            _ => self
                .content
                .notification
                .as_ref()
                .map(|n| (format!("→ {n}"), self.theme.code)),
        };

        if let Some((text, color)) = message {
            let used: usize = spans.iter().map(|s| s.width()).sum();
            let room = (area.width as usize).saturating_sub(used + 3);
            spans.push(Span::styled(" │ ", separator));
            spans.push(Span::styled(
                fit_message(&text, room),
                Style::default().fg(color),
            ));
        }

        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(self.theme.bar))
            .render(area, buf);
    }
}

/// Cut `text` to `room` cells, ending in an ellipsis when anything was dropped.
/// Wide characters are never split.
fn fit_message(text: &str, room: usize) -> String {
    if text.width() <= room {
        return text.to_string();
    }

    let budget = room.saturating_sub(ELLIPSIS.len());
    let mut used = 0;
    let mut out: String = text
        .chars()
        .take_while(|ch| {
            used += ch.width().unwrap_or(0);
            used <= budget
        })
        .collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;
    use insta::assert_snapshot;

    fn render(content: &StatusBarContent, width: u16) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new(content, &theme).render(area, &mut buf);
        buffer_to_string(&buf)
    }

    fn content(state: SubmissionState) -> StatusBarContent {
        StatusBarContent {
            state,
            model: "gemini-1.5-flash".into(),
            exchanges: 2,
            notification: None,
        }
    }

    #[test]
    fn test_idle() {
        assert_snapshot!(render(&content(SubmissionState::Idle), 60), @"● Idle │ gemini-1.5-flash │ 2 exchanges");
    }

    #[test]
    fn test_single_exchange_wording() {
        let mut c = content(SubmissionState::Pending);
        c.exchanges = 1;
        assert_snapshot!(render(&c, 60), @"● Processing │ gemini-1.5-flash │ 1 exchange");
    }

    #[test]
    fn test_notification() {
        let mut c = content(SubmissionState::Idle);
        c.notification = Some("Copied".into());
        assert_snapshot!(render(&c, 60), @"● Idle │ gemini-1.5-flash │ 2 exchanges │ → Copied");
    }

    #[test]
    fn test_failure_wins_over_notification() {
        let mut c = content(SubmissionState::Failed("API error 400".into()));
        c.notification = Some("Copied".into());
        let output = render(&c, 100);
        assert!(output.contains("Failed"));
        assert!(output.contains("API error 400 (Esc to dismiss)"));
        assert!(!output.contains("Copied"));
    }

    #[test]
    fn test_long_message_truncated() {
        let mut c = content(SubmissionState::Failed("x".repeat(200)));
        c.notification = None;
        let output = render(&c, 60);
        assert!(output.ends_with("..."));
        assert!(output.chars().count() <= 60);
    }

    #[test]
    fn test_fit_message() {
        assert_eq!(fit_message("Copied", 10), "Copied");
        assert_eq!(fit_message("hello world", 8), "hello...");
        assert_eq!(fit_message("你好世界", 6), "你...");
        assert_eq!(fit_message("hello", 2), "...");
    }
}
