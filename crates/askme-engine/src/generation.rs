//! The generation capability: turn a prompt into text.
//!
//! [`Generator`] is the seam between the submission flow and whatever model
//! backs it. The production implementation is
//! [`GeminiClient`](crate::gemini::GeminiClient); tests substitute fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling threshold.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Top-k sampling threshold.
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Maximum number of output tokens.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// MIME type requested for the response body.
    #[serde(default = "default_response_mime_type")]
    pub response_mime_type: String,
}

fn default_temperature() -> f32 {
    1.0
}

fn default_top_p() -> f32 {
    0.95
}

fn default_top_k() -> u32 {
    64
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_response_mime_type() -> String {
    "text/plain".into()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            response_mime_type: default_response_mime_type(),
        }
    }
}

/// Errors that can occur while generating a response.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No API key was configured.
    #[error("No API key configured (set GEMINI_API_KEY or pass --api-key)")]
    MissingApiKey,

    /// Transport-level failure (connect, timeout, TLS).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The API refused to answer the prompt.
    #[error("Response blocked: {0}")]
    Blocked(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The task running the call ended without producing a result.
    #[error("Generation interrupted: {0}")]
    Interrupted(String),
}

/// Something that turns a single prompt into generated text.
///
/// Each call is independent: no conversation history is sent.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a response for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Name shown in the UI (e.g. the model id).
    fn name(&self) -> &str;
}
