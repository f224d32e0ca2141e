//! Colors and styles for the TUI.
//!
//! [`Theme`] names colors by the role they play in the chat, and
//! [`ChatStyles`] turns them into the ratatui styles the widgets and the
//! markdown renderer draw with.

mod styles;

pub use styles::ChatStyles;

use ratatui::style::Color;

/// Color palette, one field per role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Transcript background.
    pub background: Color,
    /// Status bar and code background.
    pub bar: Color,
    /// Answer text.
    pub text: Color,
    /// Placeholders, separators and key hints.
    pub dim: Color,
    /// Questions, titles and the prompt marker.
    pub question: Color,
    /// Inline code and code blocks.
    pub code: Color,
    /// Links and counters.
    pub link: Color,
    /// Submission state dots.
    pub idle: Color,
    pub busy: Color,
    pub failed: Color,
    /// Pane borders.
    pub border: Color,
    pub border_focused: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark palette in the Gemini web colors.
    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(32, 33, 36), // #202124
            bar: Color::Rgb(48, 49, 52),        // #303134
            text: Color::Rgb(232, 234, 237),    // #e8eaed
            dim: Color::Rgb(154, 160, 166),     // #9aa0a6
            question: Color::Rgb(138, 180, 248), // #8ab4f8
            code: Color::Rgb(129, 201, 149),    // #81c995
            link: Color::Rgb(174, 203, 250),    // #aecbfa
            idle: Color::Rgb(129, 201, 149),
            busy: Color::Rgb(253, 214, 99),   // #fdd663
            failed: Color::Rgb(242, 139, 130), // #f28b82
            border: Color::Rgb(95, 99, 104),  // #5f6368
            border_focused: Color::Rgb(138, 180, 248),
        }
    }

    /// Styles derived from this palette.
    pub fn styles(&self) -> ChatStyles {
        ChatStyles::from_theme(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_dark() {
        assert_eq!(Theme::default(), Theme::dark());
    }

    #[test]
    fn test_state_colors_are_distinct() {
        let theme = Theme::dark();
        assert_ne!(theme.idle, theme.busy);
        assert_ne!(theme.busy, theme.failed);
    }
}
