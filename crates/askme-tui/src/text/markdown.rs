//! Markdown rendering using pulldown-cmark.
//!
//! Provides [`render_markdown`] to convert a model response to styled ratatui
//! Lines.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::theme::ChatStyles;

/// Longest horizontal rule drawn, in cells.
const MAX_RULE_WIDTH: usize = 40;

/// Render markdown text to styled ratatui Lines.
///
/// `width` bounds horizontal rules; wrapping is left to the caller.
pub fn render_markdown(input: &str, width: usize, styles: &ChatStyles) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(input, options);
    let mut renderer = MarkdownRenderer::new(styles.clone(), width);
    renderer.run(parser);
    renderer.lines
}

/// Internal renderer that processes pulldown-cmark events.
struct MarkdownRenderer {
    lines: Vec<Line<'static>>,
    styles: ChatStyles,
    width: usize,
    /// Stack of active styles for nested formatting.
    style_stack: Vec<Style>,
    current_spans: Vec<Span<'static>>,
    /// One entry per open list: next number for ordered lists, None for bullets.
    list_stack: Vec<Option<u64>>,
    in_code_block: bool,
    in_blockquote: bool,
    /// Marker to prepend to the next text of a list item.
    pending_list_marker: Option<String>,
    /// Task list checkbox state (Some(checked) if in task item).
    task_checkbox: Option<bool>,
}

impl MarkdownRenderer {
    fn new(styles: ChatStyles, width: usize) -> Self {
        Self {
            lines: Vec::new(),
            styles,
            width,
            style_stack: Vec::new(),
            current_spans: Vec::new(),
            list_stack: Vec::new(),
            in_code_block: false,
            in_blockquote: false,
            pending_list_marker: None,
            task_checkbox: None,
        }
    }

    fn run<'a>(&mut self, parser: impl Iterator<Item = Event<'a>>) {
        for event in parser {
            self.handle_event(event);
        }
        self.flush_line();
    }

    #[allow(clippy::too_many_lines)]
    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_line();
                self.style_stack.push(self.heading_style(level));
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush_line();
                self.style_stack.pop();
            }

            Event::Start(Tag::Emphasis) => self.style_stack.push(self.styles.emphasis),
            Event::Start(Tag::Strong) => self.style_stack.push(self.styles.strong),
            Event::Start(Tag::Strikethrough) => self.style_stack.push(self.styles.strikethrough),
            Event::Start(Tag::Link { .. }) => self.style_stack.push(self.styles.link),
            Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link) => {
                self.style_stack.pop();
            }

            Event::Start(Tag::CodeBlock(_)) => {
                self.flush_line();
                self.in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.flush_line();
                self.in_code_block = false;
                self.lines.push(Line::from(""));
            }

            Event::Start(Tag::List(start)) => {
                self.flush_line();
                self.list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.lines.push(Line::from(""));
                }
            }

            Event::Start(Tag::Item) => {
                self.flush_line();
                let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
                let marker = match self.list_stack.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.pending_list_marker = Some(marker);
            }
            Event::End(TagEnd::Item) => {
                self.flush_line();
                self.task_checkbox = None;
            }

            Event::TaskListMarker(checked) => {
                self.task_checkbox = Some(checked);
            }

            Event::Start(Tag::BlockQuote) => {
                self.flush_line();
                self.in_blockquote = true;
            }
            Event::End(TagEnd::BlockQuote) => {
                self.flush_line();
                self.in_blockquote = false;
            }

            Event::End(TagEnd::Paragraph) => {
                self.flush_line();
                // Paragraphs inside list items stay tight
                if self.list_stack.is_empty() {
                    self.lines.push(Line::from(""));
                }
            }

            Event::Text(text) => self.add_text(&text),

            Event::Code(code) => {
                self.take_list_marker();
                self.current_spans
                    .push(Span::styled(format!("`{code}`"), self.styles.code));
            }

            Event::SoftBreak => self.add_text(" "),
            Event::HardBreak => self.flush_line(),

            Event::Rule => {
                self.flush_line();
                let width = self.width.clamp(1, MAX_RULE_WIDTH);
                self.lines
                    .push(Line::from(Span::styled("─".repeat(width), self.styles.rule)));
            }

            Event::Start(
                Tag::Paragraph
                | Tag::Image { .. }
                | Tag::Table(_)
                | Tag::TableHead
                | Tag::TableRow
                | Tag::TableCell
                | Tag::FootnoteDefinition(_)
                | Tag::MetadataBlock(_)
                | Tag::HtmlBlock,
            )
            | Event::End(
                TagEnd::Image
                | TagEnd::Table
                | TagEnd::TableHead
                | TagEnd::TableRow
                | TagEnd::TableCell
                | TagEnd::FootnoteDefinition
                | TagEnd::MetadataBlock(_)
                | TagEnd::HtmlBlock,
            )
            | Event::Html(_)
            | Event::InlineHtml(_)
            | Event::FootnoteReference(_) => {}
        }
    }

    fn add_text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.lines() {
                self.current_spans
                    .push(Span::styled(format!("  {line}"), self.styles.code_block));
                self.flush_line();
            }
            return;
        }

        self.take_list_marker();

        if self.in_blockquote && self.current_spans.is_empty() {
            self.current_spans
                .push(Span::styled("> ".to_string(), self.styles.blockquote));
        }

        let style = self.current_style();
        self.current_spans.push(Span::styled(text.to_string(), style));
    }

    /// Emit the pending list marker (and task checkbox) before item content.
    fn take_list_marker(&mut self) {
        if let Some(marker) = self.pending_list_marker.take() {
            self.current_spans
                .push(Span::styled(marker, self.styles.list_marker));
            if let Some(checked) = self.task_checkbox.take() {
                let checkbox = if checked { "[x] " } else { "[ ] " };
                self.current_spans
                    .push(Span::styled(checkbox, self.styles.list_marker));
            }
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack
            .iter()
            .fold(self.styles.text, |style, s| style.patch(*s))
    }

    fn heading_style(&self, level: HeadingLevel) -> Style {
        match level {
            HeadingLevel::H1 => self.styles.h1,
            HeadingLevel::H2 => self.styles.h2,
            _ => self.styles.h3,
        }
    }

    fn flush_line(&mut self) {
        if !self.current_spans.is_empty() {
            let spans = std::mem::take(&mut self.current_spans);
            self.lines.push(Line::from(spans));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use ratatui::style::Modifier;

    fn render(md: &str) -> Vec<Line<'static>> {
        render_markdown(md, 80, &Theme::default().styles())
    }

    fn plain(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_render_empty() {
        assert!(render("").is_empty());
    }

    #[test]
    fn test_render_heading_is_styled() {
        let lines = render("# Title");
        assert_eq!(plain(&lines), "Title");
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_render_bold_and_italic() {
        let lines = render("**bold and *italic* text**");
        let italic = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "italic")
            .unwrap();
        assert!(italic.style.add_modifier.contains(Modifier::BOLD));
        assert!(italic.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_render_paragraphs() {
        insta::assert_snapshot!(plain(&render("First paragraph.\n\nSecond\nparagraph.")), @r"
        First paragraph.

        Second paragraph.
        ");
    }

    #[test]
    fn test_render_inline_code() {
        assert_eq!(plain(&render("Use `cargo` here")), "Use `cargo` here\n");
    }

    #[test]
    fn test_render_code_block() {
        assert_eq!(
            plain(&render("```rust\nfn main() {}\nlet x = 1;\n```")),
            "  fn main() {}\n  let x = 1;\n"
        );
    }

    #[test]
    fn test_render_bullet_list() {
        insta::assert_snapshot!(plain(&render("* Item 1\n* Item 2\n    * Nested")), @r"
        • Item 1
        • Item 2
          • Nested
        ");
    }

    #[test]
    fn test_render_ordered_list() {
        insta::assert_snapshot!(plain(&render("3. three\n4. four")), @r"
        3. three
        4. four
        ");
    }

    #[test]
    fn test_render_checkbox() {
        insta::assert_snapshot!(plain(&render("- [ ] Unchecked\n- [x] Checked")), @r"
        • [ ] Unchecked
        • [x] Checked
        ");
    }

    #[test]
    fn test_render_blockquote() {
        assert!(plain(&render("> This is a quote")).starts_with("> This is a quote"));
    }

    #[test]
    fn test_render_rule_bounded_by_width() {
        let lines = render_markdown("a\n\n---\n\nb", 10, &Theme::default().styles());
        assert!(plain(&lines).contains(&"─".repeat(10)));
    }
}
