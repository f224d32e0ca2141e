//! Headless mode for the askme TUI.
//!
//! Runs the app against a `TestBackend` instead of a real terminal, for E2E
//! tests and automation. Keys are sent through a channel and the rendered
//! screen is published after every frame.

use std::time::Duration;

use askme_engine::SubmissionState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::app::App;
use crate::event::Event;
use crate::screens;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// State captured from the headless TUI after each render.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    /// Whether the TUI should quit.
    pub should_quit: bool,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Submission state.
    pub state: SubmissionState,
    /// Number of exchanges in the log.
    pub exchanges: usize,
}

/// Handle to control a headless TUI instance.
pub struct HeadlessHandle {
    event_tx: mpsc::UnboundedSender<Event>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send a key event. Returns `true` if the TUI is still listening.
    pub fn send_key(&self, key: KeyEvent) -> bool {
        self.event_tx.send(Event::Key(key)).is_ok()
    }

    /// Paste `text` in one go, as a terminal with bracketed paste would.
    pub fn paste(&self, text: &str) -> bool {
        self.event_tx.send(Event::Paste(text.to_string())).is_ok()
    }

    /// Press a key without modifiers.
    pub fn press(&self, code: KeyCode) -> bool {
        self.send_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Press a key with Ctrl held.
    pub fn press_ctrl(&self, c: char) -> bool {
        self.send_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    /// Type `text` one character at a time.
    pub fn type_text(&self, text: &str) -> bool {
        text.chars().all(|c| self.press(KeyCode::Char(c)))
    }

    /// Get the current state of the TUI.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until a condition is met on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(&mut self, condition: F, timeout: Duration) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match tokio::time::timeout(remaining, self.state_rx.changed()).await {
                Ok(Ok(())) => {}
                // Timed out, or the loop exited
                Ok(Err(_)) | Err(_) => return None,
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(&mut self, text: &str, timeout: Duration) -> Option<HeadlessState> {
        self.wait_for(|s| s.screen_contents.contains(text), timeout)
            .await
    }

    /// Check if the TUI has quit.
    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 20,
        }
    }
}

/// Run `app` in headless mode.
///
/// Returns a handle to drive the TUI and the join handle of its loop.
pub fn run_tui_headless(
    app: App,
    config: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let task = tokio::spawn(async move {
        run_headless_loop(app, config, event_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    (HeadlessHandle { event_tx, state_rx }, task)
}

async fn run_headless_loop(
    mut app: App,
    config: HeadlessConfig,
    mut event_rx: mpsc::UnboundedReceiver<Event>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = TestBackend::new(config.width, config.height);
    let mut terminal = Terminal::new(backend)?;
    let tick_duration = Duration::from_millis(config.tick_rate_ms);

    loop {
        terminal.draw(|frame| screens::draw(&app, frame.area(), frame.buffer_mut()))?;

        let _ = state_tx.send(HeadlessState {
            screen_contents: buffer_to_string(terminal.backend().buffer()),
            should_quit: app.should_quit,
            show_help: app.show_help,
            state: app.flow.state().clone(),
            exchanges: app.flow.exchanges().len(),
        });

        if app.should_quit {
            app.shutdown();
            break;
        }

        app.poll_submission().await;

        tokio::select! {
            event = event_rx.recv() => match event {
                Some(Event::Key(key)) => app.handle_key(key),
                Some(Event::Paste(text)) => app.handle_paste(&text),
                Some(_) => {}
                // Handle dropped
                None => app.should_quit = true,
            },
            () = tokio::time::sleep(tick_duration) => app.tick(),
        }
    }

    Ok(())
}

/// Convert a terminal buffer to a string, trimming trailing whitespace per row.
///
/// Rows are joined with `\n`, so blank rows at the bottom still count.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut rows = Vec::with_capacity(usize::from(area.height));

    for y in area.y..area.y + area.height {
        let mut row = String::new();
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                row.push_str(cell.symbol());
            }
        }
        rows.push(row.trim_end().to_string());
    }

    rows.join("\n")
}
