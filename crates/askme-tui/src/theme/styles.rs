//! Style table for every element the chat draws.

use ratatui::style::{Modifier, Style};

use super::Theme;

/// Styles for the transcript, the prompt field and rendered markdown.
#[derive(Debug, Clone)]
pub struct ChatStyles {
    /// `Q: <prompt>` lines.
    pub question: Style,
    /// Pane titles.
    pub title: Style,
    /// Hint shown in an empty transcript.
    pub empty_hint: Style,

    /// `> ` marker in front of the prompt.
    pub prompt_marker: Style,
    pub cursor: Style,
    pub placeholder: Style,
    /// "Ask me!" label of the submit hint.
    pub submit_label: Style,
    /// "(Enter)" part of the submit hint.
    pub submit_key: Style,
    pub spinner: Style,

    // Markdown
    pub text: Style,
    pub h1: Style,
    pub h2: Style,
    pub h3: Style,
    pub code: Style,
    pub code_block: Style,
    pub emphasis: Style,
    pub strong: Style,
    pub strikethrough: Style,
    pub list_marker: Style,
    pub link: Style,
    pub blockquote: Style,
    pub rule: Style,
}

impl ChatStyles {
    /// Build the table from a palette.
    pub fn from_theme(theme: &Theme) -> Self {
        let bold = Modifier::BOLD;
        let question = Style::default().fg(theme.question).add_modifier(bold);
        let code = Style::default().fg(theme.code).bg(theme.bar);

        Self {
            question,
            title: question,
            empty_hint: Style::default().fg(theme.dim),

            prompt_marker: Style::default().fg(theme.question),
            cursor: Style::default().fg(theme.question),
            placeholder: Style::default().fg(theme.dim),
            submit_label: question,
            submit_key: Style::default().fg(theme.dim),
            spinner: Style::default().fg(theme.busy),

            text: Style::default().fg(theme.text),
            h1: question,
            h2: Style::default().fg(theme.text).add_modifier(bold),
            h3: Style::default().fg(theme.dim).add_modifier(bold),
            code,
            code_block: code,
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(bold),
            strikethrough: Style::default().add_modifier(Modifier::CROSSED_OUT),
            list_marker: Style::default().fg(theme.dim),
            link: Style::default()
                .fg(theme.link)
                .add_modifier(Modifier::UNDERLINED),
            blockquote: Style::default()
                .fg(theme.dim)
                .add_modifier(Modifier::ITALIC),
            rule: Style::default().fg(theme.border),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_questions_stand_out_from_answers() {
        let theme = Theme::default();
        let styles = theme.styles();

        assert_eq!(styles.question.fg, Some(theme.question));
        assert!(styles.question.add_modifier.contains(Modifier::BOLD));
        assert_eq!(styles.text.fg, Some(theme.text));
        assert_ne!(styles.question, styles.text);
    }

    #[test]
    fn test_code_sits_on_bar_background() {
        let theme = Theme::default();
        let styles = theme.styles();
        assert_eq!(styles.code.bg, Some(theme.bar));
        assert_eq!(styles.code_block, styles.code);
    }
}
