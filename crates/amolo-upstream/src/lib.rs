//! Upstream client adapter for the AMOLO relay.
//!
//! Implements [`amolo_core::CompletionPort`] against the OpenAI chat
//! completions API:
//!
//! - [`OpenAiClient`]: issues buffered and streamed completions
//! - [`UpstreamConfig`]: base URL, credential and timeouts
//! - [`translate`]: total mapping from provider outcomes to service outcomes
//!
//! A missing credential fails every call before any network traffic.

#![deny(unused_crate_dependencies)]

// Fake provider in tests/ only.
#[cfg(test)]
use axum as _;

mod client;
mod config;
mod sse;
pub mod translate;
mod wire;

pub use client::{API_KEY_VARIABLE, OpenAiClient};
pub use config::UpstreamConfig;
pub use sse::decode_frames;
pub use translate::ProviderOutcome;
