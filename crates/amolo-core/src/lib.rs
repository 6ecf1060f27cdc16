//! Core domain for the AMOLO chat relay.
//!
//! This crate holds everything the relay decides on its own: the message
//! window, the completion request shape, the closed error taxonomy, the
//! admission limiter and the stream relay state machine. It knows nothing
//! about HTTP; adapters (`amolo-upstream`, `amolo-axum`) plug in through the
//! [`CompletionPort`] trait.

#![deny(unused_crate_dependencies)]

pub mod admission;
pub mod domain;
pub mod error;
pub mod ports;
pub mod relay;

pub use admission::{
    AdmissionConfig, AdmissionControl, AdmissionDecision, Clock, ManualClock, RATE_LIMIT_MESSAGE,
    SystemClock,
};
pub use domain::{
    ChatMessage, CompletionRequest, CompletionResult, DEFAULT_MODEL, DEFAULT_SYSTEM_DIRECTIVE,
    HISTORY_WINDOW, MessageRole, SamplingParams, StreamChunk, Usage, build_conversation,
    parse_history,
};
pub use error::{ErrorKind, ServiceError};
pub use ports::{ChunkResult, ChunkSender, ChunkStream, CompletionPort};
pub use relay::{RelayEvent, RelayState, StreamRelay};
