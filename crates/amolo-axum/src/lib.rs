//! Axum web adapter for the AMOLO chat relay.
//!
//! Exposes the relay over HTTP: request routing, the per-client admission
//! gate, JSON error mapping and SSE framing of streamed completions. The
//! composition root in [`bootstrap`] wires the OpenAI client in as the
//! [`CompletionPort`](amolo_core::CompletionPort).

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Dev-only dependencies used from tests/.
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod sse;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, CorsConfig, Environment, ServerConfig, bootstrap, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
