//! Command-line entry point for the AMOLO chat relay.
//!
//! The `amolo-server` binary parses [`Cli`], initialises logging and hands
//! the resulting configuration to [`amolo_axum::start_server`].

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the main.rs binary
use anyhow as _;
use dotenvy as _;
use tokio as _;
use tokio_util as _;
use tracing as _;
use tracing_subscriber as _;

pub mod parser;

pub use parser::Cli;
