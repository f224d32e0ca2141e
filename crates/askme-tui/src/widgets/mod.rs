//! UI widgets for the TUI.
//!
//! This module provides:
//! - [`TranscriptView`] - The conversation log, newest last
//! - [`InputBar`] - Prompt entry with the submit hint or spinner
//! - [`StatusBar`] - Bottom line with state, model and notifications

mod input_bar;
mod status_bar;
mod text_input;
mod transcript;

pub use input_bar::InputBar;
pub use status_bar::{StatusBar, StatusBarContent};
pub use text_input::TextInputState;
pub use transcript::{TranscriptCache, TranscriptView};
