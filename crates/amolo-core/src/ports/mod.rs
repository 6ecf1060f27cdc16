//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the relay expects from infrastructure. They
//! use only domain types; no `reqwest` or `axum` types appear here.

pub mod completion;

pub use completion::{ChunkResult, ChunkSender, ChunkStream, CompletionPort};
