//! Test utilities for askme-tui rendering and integration tests.
//!
//! Provides a scripted [`FakeGenerator`], app builders over in-memory
//! storage, and buffer-to-string helpers for screen assertions.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use askme_engine::{
    ConversationStore, GenerationError, Generator, MemoryStorage, PromptFlow, DEFAULT_HISTORY_KEY,
};
use async_trait::async_trait;
use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::{App, SharedStorage};
pub use crate::headless::buffer_to_string;
use crate::screens::Screen as ScreenTrait;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Model name reported by [`FakeGenerator`].
pub const FAKE_MODEL: &str = "fake-model";

/// Generator returning a fixed reply, optionally after a delay.
pub struct FakeGenerator {
    reply: Result<String, String>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl FakeGenerator {
    /// Always answer with `reply`.
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always fail with an API error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            ..Self::replying("")
        }
    }

    /// Wait `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Counter of `generate` calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone().map_err(|body| GenerationError::Api {
            status: 429,
            body,
        })
    }

    fn name(&self) -> &str {
        FAKE_MODEL
    }
}

/// Create a test app over empty in-memory storage.
pub fn create_test_app() -> App {
    create_test_app_with(
        Arc::new(MemoryStorage::new()),
        FakeGenerator::replying("World"),
    )
}

/// Create a test app over `storage`, answering with `generator`.
pub fn create_test_app_with(storage: SharedStorage, generator: FakeGenerator) -> App {
    let store = ConversationStore::open(storage, DEFAULT_HISTORY_KEY);
    App::new(
        PromptFlow::new(store),
        Arc::new(generator),
        PathBuf::from(".askme"),
    )
}

/// Render a screen to a buffer and return it as a string.
pub fn render_screen_to_string<S: ScreenTrait>(screen: &S, app: &App) -> String {
    let area = Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_app() {
        let app = create_test_app();
        assert!(app.flow.exchanges().is_empty());
        assert_eq!(app.model_name(), FAKE_MODEL);
    }

    #[tokio::test]
    async fn test_fake_generator_counts_calls() {
        let generator = FakeGenerator::failing("nope");
        let calls = generator.calls();
        assert!(generator.generate("x").await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
