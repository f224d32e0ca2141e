//! Transcript pane: every exchange as `Q: <prompt>` followed by the
//! rendered response, newest last.

use std::cell::RefCell;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use askme_engine::Exchange;

use crate::text::{render_markdown, wrap_lines};
use crate::theme::{ChatStyles, Theme};

/// Title of the transcript pane.
pub const TITLE: &str = " Ask me.. ";

/// Shown when the log is empty.
const EMPTY_HINT: &str = "No questions yet. Type a prompt below and press Enter.";

/// Wrapped lines of each exchange, rendered for one content width.
///
/// The log only grows, so exchanges rendered at the current width are kept
/// and only new ones are parsed. A width change starts over.
#[derive(Debug, Default)]
pub struct TranscriptCache {
    width: usize,
    blocks: Vec<Vec<Line<'static>>>,
}

impl TranscriptCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render whatever in `exchanges` is not cached yet at `width`.
    fn sync(&mut self, exchanges: &[Exchange], width: usize, styles: &ChatStyles) {
        if self.width != width || self.blocks.len() > exchanges.len() {
            self.width = width;
            self.blocks.clear();
        }
        for exchange in &exchanges[self.blocks.len()..] {
            self.blocks.push(render_exchange(exchange, width, styles));
        }
    }

    /// Lines in the joined transcript, blank separators included.
    fn line_count(&self) -> usize {
        let lines: usize = self.blocks.iter().map(Vec::len).sum();
        lines + self.blocks.len().saturating_sub(1)
    }

    /// `len` lines of the joined transcript starting at `start`.
    fn window(&self, start: usize, len: usize) -> Vec<Line<'static>> {
        let separator = Line::from("");
        self.blocks
            .iter()
            .enumerate()
            .flat_map(|(i, block)| {
                (i > 0)
                    .then_some(&separator)
                    .into_iter()
                    .chain(block.iter())
            })
            .skip(start)
            .take(len)
            .cloned()
            .collect()
    }
}

/// Question lines plus the markdown answer, wrapped to `width`.
fn render_exchange(exchange: &Exchange, width: usize, styles: &ChatStyles) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = exchange
        .prompt
        .split('\n')
        .enumerate()
        .map(|(n, prompt_line)| {
            let prefix = if n == 0 { "Q: " } else { "   " };
            Line::from(vec![
                Span::styled(prefix, styles.question),
                Span::styled(prompt_line.to_string(), styles.question),
            ])
        })
        .collect();

    let mut response = render_markdown(&exchange.response, width, styles);
    while response.last().is_some_and(|l| l.width() == 0) {
        response.pop();
    }
    lines.extend(response);

    wrap_lines(lines, width)
}

/// Scrollable transcript of the conversation log.
pub struct TranscriptView<'a> {
    exchanges: &'a [Exchange],
    theme: &'a Theme,
    cache: &'a RefCell<TranscriptCache>,
    /// Lines scrolled back from the bottom. 0 follows the newest exchange.
    scroll_back: usize,
}

impl<'a> TranscriptView<'a> {
    /// Create a new transcript view drawing through `cache`.
    pub fn new(
        exchanges: &'a [Exchange],
        theme: &'a Theme,
        cache: &'a RefCell<TranscriptCache>,
    ) -> Self {
        Self {
            exchanges,
            theme,
            cache,
            scroll_back: 0,
        }
    }

    /// Scroll back `lines` from the bottom.
    #[must_use]
    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }
}

impl Widget for TranscriptView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let styles = self.theme.styles();
        let block = Block::default()
            .title(TITLE)
            .title_style(styles.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .style(Style::default().bg(self.theme.background));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.exchanges.is_empty() {
            Paragraph::new(Line::from(Span::styled(EMPTY_HINT, styles.empty_hint)))
                .render(inner, buf);
            return;
        }

        let mut cache = self.cache.borrow_mut();
        cache.sync(self.exchanges, usize::from(inner.width), &styles);

        let height = usize::from(inner.height);
        let max_top = cache.line_count().saturating_sub(height);
        let top = max_top - self.scroll_back.min(max_top);

        Paragraph::new(cache.window(top, height))
            .style(styles.text)
            .render(inner, buf);
    }
}
