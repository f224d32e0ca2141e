//! Exchange type: one prompt and the response it produced.

use serde::{Deserialize, Serialize};

/// A single prompt/response pair in the conversation log.
///
/// Serialized as `{"prompt": ..., "response": ...}` with no other fields, so
/// the persisted log stays a plain JSON array of pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// Text the user submitted.
    pub prompt: String,
    /// Text the model returned.
    pub response: String,
}

impl Exchange {
    /// Create a new exchange.
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
        }
    }

    /// Build an exchange from a settled submission.
    ///
    /// Returns `None` when either side is empty; such submissions never
    /// reach the log.
    pub fn from_settled(prompt: &str, response: &str) -> Option<Self> {
        if prompt.is_empty() || response.is_empty() {
            return None;
        }
        Some(Self::new(prompt, response))
    }
}
