//! Core domain types.
//!
//! # Structure
//!
//! - `chat` - Message and role types
//! - `completion` - Completion request/result and stream chunk types
//! - `window` - History truncation and system directive injection

pub mod chat;
pub mod completion;
pub mod window;

pub use chat::{ChatMessage, MessageRole};
pub use completion::{
    CompletionRequest, CompletionResult, DEFAULT_MODEL, SamplingParams, StreamChunk, Usage,
};
pub use window::{DEFAULT_SYSTEM_DIRECTIVE, HISTORY_WINDOW, build_conversation, parse_history};
