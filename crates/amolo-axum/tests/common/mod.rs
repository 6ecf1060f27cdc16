//! Shared helpers for amolo-axum integration tests.

// Each test binary uses a different subset.
#![allow(dead_code)]

pub mod fake;
pub mod http;
