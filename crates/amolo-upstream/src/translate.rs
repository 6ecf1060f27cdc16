//! Response translator: provider outcomes to service outcomes.
//!
//! | Provider outcome            | Service outcome                          |
//! |-----------------------------|------------------------------------------|
//! | 2xx, well-formed body       | `CompletionResult`                       |
//! | 401                         | `Auth` (401)                             |
//! | 429                         | `RateLimited` (429)                      |
//! | 5xx                         | `UpstreamUnavailable` (500)              |
//! | other 4xx                   | `Provider` with the provider's status    |
//! | transport failure / timeout | `UpstreamUnavailable` (500)              |
//! | malformed body, other codes | `Protocol` (500)                         |

use amolo_core::{CompletionResult, ServiceError, StreamChunk};

use crate::wire::{ChatCompletionChunk, ChatCompletionResponse, ProviderErrorBody};

pub const INVALID_API_KEY: &str = "Invalid API key";
pub const PROVIDER_RATE_LIMITED: &str = "Rate limit exceeded. Please try again later.";
pub const PROVIDER_UNAVAILABLE: &str = "AI service temporarily unavailable";

/// Everything the provider call can end in.
#[derive(Debug, Clone, Copy)]
pub enum ProviderOutcome<'a> {
    /// The provider answered with a status and a complete body.
    Response { status: u16, body: &'a [u8] },
    /// No usable answer: connect failure, reset, or timeout.
    Transport { timed_out: bool },
}

impl ProviderOutcome<'_> {
    #[must_use]
    pub fn transport(err: &reqwest::Error) -> Self {
        Self::Transport {
            timed_out: err.is_timeout(),
        }
    }
}

/// Translate a buffered provider outcome.
pub fn translate(outcome: ProviderOutcome<'_>) -> Result<CompletionResult, ServiceError> {
    match outcome {
        ProviderOutcome::Response { status, body } if (200..300).contains(&status) => {
            translate_body(body)
        }
        ProviderOutcome::Response { status, body } => Err(translate_failure(status, body)),
        ProviderOutcome::Transport { timed_out } => Err(transport_error(timed_out)),
    }
}

/// Translate a non-success provider status.
pub fn translate_failure(status: u16, body: &[u8]) -> ServiceError {
    match status {
        401 => ServiceError::Auth(INVALID_API_KEY.to_string()),
        429 => ServiceError::RateLimited(PROVIDER_RATE_LIMITED.to_string()),
        500..=599 => ServiceError::UpstreamUnavailable(PROVIDER_UNAVAILABLE.to_string()),
        400..=499 => ServiceError::Provider {
            status,
            message: provider_message(body)
                .unwrap_or_else(|| format!("AI service rejected the request (status {status})")),
        },
        _ => ServiceError::Protocol(format!("Unexpected response status from AI service: {status}")),
    }
}

pub fn transport_error(timed_out: bool) -> ServiceError {
    if timed_out {
        ServiceError::UpstreamUnavailable("AI service request timed out".to_string())
    } else {
        ServiceError::UpstreamUnavailable(PROVIDER_UNAVAILABLE.to_string())
    }
}

/// Translate a successful buffered body.
pub fn translate_body(body: &[u8]) -> Result<CompletionResult, ServiceError> {
    let response: ChatCompletionResponse = serde_json::from_slice(body)
        .map_err(|e| ServiceError::Protocol(format!("Invalid response from AI service: {e}")))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            ServiceError::Protocol("Invalid response from AI service: no message content".into())
        })?;

    Ok(CompletionResult {
        content,
        usage: response.usage.unwrap_or_default(),
    })
}

/// Translate one SSE `data:` payload.
pub fn translate_frame(data: &str) -> Result<StreamChunk, ServiceError> {
    if data == "[DONE]" {
        return Ok(StreamChunk::done());
    }

    let chunk: ChatCompletionChunk = serde_json::from_str(data)
        .map_err(|e| ServiceError::Protocol(format!("Invalid stream frame from AI service: {e}")))?;

    if let Some(error) = chunk.error {
        return Err(ServiceError::UpstreamUnavailable(
            error
                .message
                .unwrap_or_else(|| PROVIDER_UNAVAILABLE.to_string()),
        ));
    }

    let delta = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .unwrap_or_default();
    Ok(StreamChunk::delta(delta))
}

fn provider_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ProviderErrorBody>(body)
        .ok()
        .and_then(|body| body.error.message)
        .filter(|message| !message.is_empty())
}
