//! Completion request and result types.
//!
//! These are the provider-agnostic shapes the relay works with. The
//! provider's wire format lives in `amolo-upstream`.

use serde::{Deserialize, Serialize};

use super::chat::ChatMessage;

/// Model used when the client does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling parameters sent with every completion.
///
/// These are fixed server-side; clients cannot override them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

/// A fully built request for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    /// The windowed conversation, system directive first.
    pub messages: Vec<ChatMessage>,
    pub sampling: SamplingParams,
}

impl CompletionRequest {
    /// Create a request with the fixed sampling parameters.
    ///
    /// Falls back to [`DEFAULT_MODEL`] when `model` is `None`.
    #[must_use]
    pub fn new(model: Option<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            messages,
            sampling: SamplingParams::default(),
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Result of a buffered completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub content: String,
    pub usage: Usage,
}

/// One increment of a streamed completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamChunk {
    /// Generated text in this increment; may be empty (e.g. role-only frames).
    pub delta_content: String,
    /// Set on the provider's terminal frame.
    pub done: bool,
}

impl StreamChunk {
    #[must_use]
    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            delta_content: content.into(),
            done: false,
        }
    }

    /// The terminal chunk.
    #[must_use]
    pub fn done() -> Self {
        Self {
            delta_content: String::new(),
            done: true,
        }
    }
}
