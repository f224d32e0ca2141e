//! Application state and update logic for the askme TUI.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use askme_engine::{
    default_export_path, export_transcript, GenerationError, Generator, KeyValueStorage,
    PromptFlow, SettleOutcome,
};
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::event::{key_to_action, Action};
use crate::theme::Theme;
use crate::widgets::{StatusBarContent, TextInputState, TranscriptCache};

/// Storage handle shared between the app and whoever built it.
pub type SharedStorage = Arc<dyn KeyValueStorage>;

/// Lines moved by PageUp/PageDown.
const PAGE_LINES: usize = 10;

/// Ticks a notification stays visible (~3s at 250ms per tick).
const NOTIFICATION_TICKS: usize = 12;

/// Application state.
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Submission flow owning the conversation log.
    pub flow: PromptFlow<SharedStorage>,

    /// Prompt field.
    pub input_state: TextInputState,

    /// Transcript lines scrolled back from the bottom.
    pub transcript_scroll: usize,

    /// Rendered transcript lines, reused between frames.
    pub transcript_cache: RefCell<TranscriptCache>,

    /// Tick counter for the spinner.
    pub tick: usize,

    /// Notification message (displayed temporarily, cleared after some ticks).
    pub notification: Option<String>,

    /// Ticks remaining until notification is cleared.
    notification_ttl: usize,

    /// Color palette.
    pub theme: Theme,

    /// Directory exports are written under.
    data_dir: PathBuf,

    generator: Arc<dyn Generator>,

    /// In-flight generation call.
    pending: Option<JoinHandle<Result<String, GenerationError>>>,
}

impl App {
    /// Create a new app over a hydrated flow.
    pub fn new(
        flow: PromptFlow<SharedStorage>,
        generator: Arc<dyn Generator>,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            flow,
            input_state: TextInputState::new(),
            transcript_scroll: 0,
            transcript_cache: RefCell::default(),
            tick: 0,
            notification: None,
            notification_ttl: 0,
            theme: Theme::default(),
            data_dir,
            generator,
            pending: None,
        }
    }

    /// Name of the model answering prompts.
    pub fn model_name(&self) -> &str {
        self.generator.name()
    }

    /// Content for the status bar.
    pub fn status(&self) -> StatusBarContent {
        StatusBarContent {
            state: self.flow.state().clone(),
            model: self.model_name().to_string(),
            exchanges: self.flow.exchanges().len(),
            notification: self.notification.clone(),
        }
    }

    /// Route a key press: actions first, everything else edits the prompt.
    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = key_to_action(key, self.input_state.is_empty());
        if action == Action::None {
            if self.show_help {
                self.show_help = false;
            } else {
                self.edit_input(key);
            }
            return;
        }
        self.handle_action(action);
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
                return;
            }
            Action::Help => {
                self.show_help = !self.show_help;
                return;
            }
            _ => {}
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        match action {
            Action::Submit => self.submit(),
            Action::Newline => self.input_state.insert('\n'),
            Action::Export => self.export(),
            Action::CopyLast => self.copy_last_response(),
            Action::Back => self.flow.dismiss_error(),
            Action::ScrollUp => self.scroll_up(1),
            Action::ScrollDown => self.scroll_down(1),
            Action::PageUp => self.scroll_up(PAGE_LINES),
            Action::PageDown => self.scroll_down(PAGE_LINES),
            Action::Quit | Action::Help | Action::None => {}
        }
    }

    /// Insert pasted text into the prompt. Line breaks are kept, nothing is submitted.
    pub fn handle_paste(&mut self, text: &str) {
        if self.show_help {
            self.show_help = false;
            return;
        }
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        self.input_state.insert_str(&text);
    }

    fn edit_input(&mut self, key: KeyEvent) {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return;
        }

        match key.code {
            KeyCode::Char(c) => self.input_state.insert(c),
            KeyCode::Backspace => self.input_state.backspace(),
            KeyCode::Delete => self.input_state.delete(),
            KeyCode::Left => self.input_state.move_left(),
            KeyCode::Right => self.input_state.move_right(),
            KeyCode::Home => self.input_state.move_home(),
            KeyCode::End => self.input_state.move_end(),
            _ => {}
        }
    }

    /// Start a submission with the current prompt. Inert while one is pending.
    pub fn submit(&mut self) {
        if self.pending.is_some() {
            return;
        }

        let pending = match self.flow.begin(self.input_state.content()) {
            Ok(pending) => pending,
            Err(e) => {
                warn!(error = %e, "Submission rejected");
                return;
            }
        };

        info!(model = self.model_name(), "Submitting prompt");
        let generator = Arc::clone(&self.generator);
        self.pending = Some(tokio::spawn(async move {
            generator.generate(&pending.prompt).await
        }));
    }

    /// Whether a generation call is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Settle the in-flight submission if its task has finished.
    pub async fn poll_submission(&mut self) {
        if !self.pending.as_ref().is_some_and(JoinHandle::is_finished) {
            return;
        }
        let Some(handle) = self.pending.take() else {
            return;
        };

        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(GenerationError::Interrupted(e.to_string())),
        };
        self.settle(result);
    }

    fn settle(&mut self, result: Result<String, GenerationError>) {
        let settlement = match self.flow.settle(result) {
            Ok(settlement) => settlement,
            Err(e) => {
                warn!(error = %e, "Settle rejected");
                return;
            }
        };

        if settlement.clear_prompt {
            self.input_state.clear();
        }

        if let Some(error) = &settlement.persist_error {
            self.set_notification(format!("History not saved: {error}"));
        }

        match settlement.outcome {
            SettleOutcome::Appended(_) => self.transcript_scroll = 0,
            SettleOutcome::Skipped => {
                self.set_notification("Empty response, nothing recorded".to_string());
            }
            SettleOutcome::Failed(_) => {}
        }
    }

    /// Abort any in-flight generation call.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    fn scroll_up(&mut self, lines: usize) {
        self.transcript_scroll = self.transcript_scroll.saturating_add(lines);
    }

    fn scroll_down(&mut self, lines: usize) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
    }

    /// Export the transcript under the data directory.
    fn export(&mut self) {
        let path = default_export_path(&self.data_dir, Local::now());
        match export_transcript(self.flow.exchanges(), self.model_name(), &path) {
            Ok(path) => self.set_notification(format!("Exported to {}", path.display())),
            Err(e) => {
                warn!(error = %e, "Export failed");
                self.set_notification(format!("Export failed: {e}"));
            }
        }
    }

    /// Copy the newest response to the system clipboard.
    fn copy_last_response(&mut self) {
        let Some(last) = self.flow.exchanges().last() else {
            self.set_notification("Nothing to copy".to_string());
            return;
        };
        let text = last.response.clone();

        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
        match copied {
            Ok(()) => self.set_notification("Copied last response".to_string()),
            Err(e) => {
                warn!(error = %e, "Clipboard unavailable");
                self.set_notification(format!("Copy failed: {e}"));
            }
        }
    }

    /// Set a temporary notification message.
    fn set_notification(&mut self, msg: String) {
        self.notification = Some(msg);
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Increment tick counter and update time-based state.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }
}
