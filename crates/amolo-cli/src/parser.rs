//! Command-line arguments for `amolo-server`.
//!
//! Every flag falls back to an environment variable, so the server can be
//! configured entirely from a `.env` file.

use std::time::Duration;

use clap::Parser;

use amolo_axum::{Environment, ServerConfig};
use amolo_upstream::UpstreamConfig;

/// AMOLO chat relay server.
#[derive(Debug, Parser)]
#[command(name = "amolo-server")]
#[command(about = "Relay chat requests to an OpenAI-compatible completion API")]
#[command(version)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Comma-separated CORS origins (all origins when empty)
    #[arg(long = "allowed-origins", env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Provider API key
    #[arg(long = "api-key", env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Provider API base URL
    #[arg(long = "base-url", env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub base_url: String,

    /// Timeout for buffered completions, in seconds
    #[arg(long = "timeout-secs", env = "OPENAI_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,

    /// Deployment environment (development or production)
    #[arg(long, env = "AMOLO_ENV", default_value = "production")]
    pub environment: Environment,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Server configuration described by these arguments.
    pub fn server_config(&self) -> ServerConfig {
        let origins = self
            .allowed_origins
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        ServerConfig::default()
            .with_host(self.host.clone())
            .with_port(self.port)
            .with_allowed_origins(origins)
            .with_environment(self.environment)
            .with_upstream(
                UpstreamConfig::new()
                    .with_base_url(self.base_url.clone())
                    .with_optional_api_key(self.api_key.clone())
                    .with_timeout(Duration::from_secs(self.timeout_secs)),
            )
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub const fn default_log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
