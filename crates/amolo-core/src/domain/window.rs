//! Message window builder.
//!
//! Turns client-supplied history into the conversation sent upstream: one
//! system directive followed by at most [`HISTORY_WINDOW`] of the most recent
//! client messages, in their original order.

use serde::Deserialize;
use serde_json::Value;

use super::chat::ChatMessage;
use crate::error::ServiceError;

/// Maximum number of client messages forwarded upstream.
pub const HISTORY_WINDOW: usize = 10;

/// System directive prepended to every conversation.
pub const DEFAULT_SYSTEM_DIRECTIVE: &str =
    "You are AMOLO.AI, a powerful global AI assistant built from Africa.";

const MISSING_MESSAGES: &str = "Invalid request: messages array is required";

/// Build the upstream conversation from client history.
///
/// Returns `[directive] ++ last min(HISTORY_WINDOW, len) messages`.
pub fn build_conversation(
    directive: &str,
    history: &[ChatMessage],
) -> Result<Vec<ChatMessage>, ServiceError> {
    if history.is_empty() {
        return Err(ServiceError::Validation(MISSING_MESSAGES.to_string()));
    }

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut conversation = Vec::with_capacity(history.len() - start + 1);
    conversation.push(ChatMessage::system(directive));
    conversation.extend_from_slice(&history[start..]);
    Ok(conversation)
}

/// Extract client history from the raw `messages` field of a request body.
///
/// Fails if the field is missing, not an array, empty, or holds entries that
/// are not `{role, content}` messages.
pub fn parse_history(messages: Option<&Value>) -> Result<Vec<ChatMessage>, ServiceError> {
    let entries = match messages {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => return Err(ServiceError::Validation(MISSING_MESSAGES.to_string())),
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            ChatMessage::deserialize(entry).map_err(|e| {
                ServiceError::Validation(format!("Invalid request: messages[{index}]: {e}"))
            })
        })
        .collect()
}
