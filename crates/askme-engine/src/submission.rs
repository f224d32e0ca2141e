//! Prompt submission flow.
//!
//! ```text
//!            begin(prompt)               settle(Ok(response))
//!   Idle ───────────────────▶ Pending ──────────────────────▶ Idle
//!    ▲                          │
//!    │ dismiss_error()          │ settle(Err(e))
//!    │                          ▼
//!    └──────────────────────  Failed ── begin(prompt) ──▶ Pending
//! ```
//!
//! Only one submission can be in flight. The prompt is captured at
//! [`PromptFlow::begin`], so edits made to the input field while Pending do
//! not change what gets recorded.

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::exchange::Exchange;
use crate::generation::{GenerationError, Generator};
use crate::storage::KeyValueStorage;
use crate::store::ConversationStore;

/// Where the flow currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    /// Ready to accept a submission.
    #[default]
    Idle,
    /// A generation call is in flight.
    Pending,
    /// The last generation call failed.
    Failed(String),
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "processing"),
            Self::Failed(_) => write!(f, "failed"),
        }
    }
}

/// Errors from driving the flow out of order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// A submission is already in flight.
    #[error("A submission is already in progress")]
    AlreadyPending,

    /// `settle` was called with nothing in flight.
    #[error("No submission is in progress")]
    NotPending,
}

/// A submission that has started and awaits its generation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    /// Prompt captured when the submission began.
    pub prompt: String,
}

/// What happened to a settled submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The exchange was added to the log.
    Appended(Exchange),
    /// Prompt or response was empty; nothing was recorded.
    Skipped,
    /// The generation call failed.
    Failed(String),
}

/// Result of settling a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// What happened to the exchange.
    pub outcome: SettleOutcome,
    /// Whether the UI must clear its prompt field.
    pub clear_prompt: bool,
    /// Set when the exchange was appended in memory but writing the log failed.
    pub persist_error: Option<String>,
}

/// The submission state machine, owning the conversation store.
#[derive(Debug)]
pub struct PromptFlow<S> {
    store: ConversationStore<S>,
    state: SubmissionState,
    in_flight: Option<String>,
}

impl<S: KeyValueStorage> PromptFlow<S> {
    /// Create a flow over an already hydrated store. Starts Idle.
    pub fn new(store: ConversationStore<S>) -> Self {
        Self {
            store,
            state: SubmissionState::Idle,
            in_flight: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Whether a generation call is in flight.
    pub fn is_pending(&self) -> bool {
        self.state == SubmissionState::Pending
    }

    /// Error message of the last failed submission, if the flow is Failed.
    pub fn last_error(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// The conversation log.
    pub fn exchanges(&self) -> &[Exchange] {
        self.store.exchanges()
    }

    /// The underlying store.
    pub fn store(&self) -> &ConversationStore<S> {
        &self.store
    }

    /// Start a submission. Any prompt is accepted, including an empty one.
    pub fn begin(&mut self, prompt: &str) -> Result<PendingSubmission, SubmitError> {
        if self.is_pending() {
            return Err(SubmitError::AlreadyPending);
        }

        self.state = SubmissionState::Pending;
        self.in_flight = Some(prompt.to_string());
        Ok(PendingSubmission {
            prompt: prompt.to_string(),
        })
    }

    /// Finish the in-flight submission with the generation result.
    pub fn settle(
        &mut self,
        result: Result<String, GenerationError>,
    ) -> Result<Settlement, SubmitError> {
        let prompt = self.in_flight.take().ok_or(SubmitError::NotPending)?;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Generation failed");
                self.state = SubmissionState::Failed(message.clone());
                return Ok(Settlement {
                    outcome: SettleOutcome::Failed(message),
                    clear_prompt: false,
                    persist_error: None,
                });
            }
        };

        self.state = SubmissionState::Idle;

        let mut persist_error = None;
        let outcome = match Exchange::from_settled(&prompt, &response) {
            Some(exchange) => {
                if let Err(e) = self.store.append(exchange.clone()) {
                    warn!(error = %e, "Failed to persist conversation log");
                    persist_error = Some(e.to_string());
                }
                SettleOutcome::Appended(exchange)
            }
            None => {
                info!("Empty prompt or response, nothing recorded");
                SettleOutcome::Skipped
            }
        };

        Ok(Settlement {
            outcome,
            clear_prompt: true,
            persist_error,
        })
    }

    /// Leave the Failed state. No-op in any other state.
    pub fn dismiss_error(&mut self) {
        if matches!(self.state, SubmissionState::Failed(_)) {
            self.state = SubmissionState::Idle;
        }
    }

    /// Run a whole submission: begin, generate, settle.
    pub async fn submit<G>(&mut self, prompt: &str, generator: &G) -> Result<Settlement, SubmitError>
    where
        G: Generator + ?Sized,
    {
        let pending = self.begin(prompt)?;
        let result = generator.generate(&pending.prompt).await;
        self.settle(result)
    }
}
