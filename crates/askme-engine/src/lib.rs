//! askme-engine: headless core of the askme chat client
//!
//! This crate provides:
//! - The conversation log and its persistence in a key-value slot
//! - The prompt submission state machine
//! - The generation capability and its Gemini implementation
//! - Configuration and transcript export

pub mod config;
pub mod exchange;
pub mod gemini;
pub mod generation;
pub mod storage;
pub mod store;
pub mod submission;
pub mod transcript;

// Re-export commonly used types
pub use config::{Config, ConfigError, CONFIG_FILE, DEFAULT_DATA_DIR, STORAGE_DIR};
pub use exchange::Exchange;
pub use gemini::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use generation::{GenerationConfig, GenerationError, Generator};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{ConversationStore, StoreError, DEFAULT_HISTORY_KEY};
pub use submission::{
    PendingSubmission, PromptFlow, SettleOutcome, Settlement, SubmissionState, SubmitError,
};
pub use transcript::{default_export_path, export_transcript, to_markdown, TranscriptError};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
