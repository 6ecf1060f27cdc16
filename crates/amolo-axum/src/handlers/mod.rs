//! HTTP request handlers for the Axum web server.
//!
//! Handlers are thin: they validate the body, build the completion request
//! and delegate to the [`CompletionPort`](amolo_core::CompletionPort).

pub mod chat;
