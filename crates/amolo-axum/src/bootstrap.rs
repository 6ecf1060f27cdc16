//! Axum server bootstrap - the composition root.
//!
//! This module is the only place where the relay is wired together: the
//! OpenAI client is built here and handed to handlers as a
//! [`CompletionPort`] trait object.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use amolo_core::{AdmissionConfig, AdmissionControl, CompletionPort, DEFAULT_SYSTEM_DIRECTIVE};
use amolo_upstream::{OpenAiClient, UpstreamConfig};

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsConfig {
    /// Allow all origins.
    #[default]
    AllowAll,
    /// Allow specific origins.
    AllowOrigins(Vec<String>),
}

/// Deployment environment. Controls how much internal detail error
/// responses reveal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!(
                "unknown environment '{other}' (expected development or production)"
            )),
        }
    }
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port for the HTTP server.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    pub environment: Environment,
    /// Provider client configuration.
    pub upstream: UpstreamConfig,
    /// Per-client request quota.
    pub admission: AdmissionConfig,
    /// System message prepended to every conversation.
    pub system_directive: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors: CorsConfig::default(),
            environment: Environment::default(),
            upstream: UpstreamConfig::default(),
            admission: AdmissionConfig::default(),
            system_directive: DEFAULT_SYSTEM_DIRECTIVE.to_string(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set CORS to allow specific origins. An empty list allows all.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = if origins.is_empty() {
            CorsConfig::AllowAll
        } else {
            CorsConfig::AllowOrigins(origins)
        };
        self
    }

    #[must_use]
    pub const fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn with_upstream(mut self, upstream: UpstreamConfig) -> Self {
        self.upstream = upstream;
        self
    }

    #[must_use]
    pub const fn with_admission(mut self, admission: AdmissionConfig) -> Self {
        self.admission = admission;
        self
    }

    #[must_use]
    pub fn with_system_directive(mut self, directive: impl Into<String>) -> Self {
        self.system_directive = directive.into();
        self
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    /// Completion provider as trait object.
    pub completions: Arc<dyn CompletionPort>,
    /// Per-client admission table.
    pub admission: AdmissionControl,
    pub system_directive: String,
    pub environment: Environment,
}

impl AxumContext {
    /// Assemble a context around an existing completion port.
    #[must_use]
    pub fn new(
        completions: Arc<dyn CompletionPort>,
        admission: AdmissionConfig,
        environment: Environment,
    ) -> Self {
        Self {
            completions,
            admission: AdmissionControl::new(admission),
            system_directive: DEFAULT_SYSTEM_DIRECTIVE.to_string(),
            environment,
        }
    }

    #[must_use]
    pub fn with_system_directive(mut self, directive: impl Into<String>) -> Self {
        self.system_directive = directive.into();
        self
    }

    #[must_use]
    pub fn with_admission_control(mut self, admission: AdmissionControl) -> Self {
        self.admission = admission;
        self
    }
}

impl std::fmt::Debug for AxumContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxumContext")
            .field("admission", &self.admission)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

/// Build the context from configuration.
pub fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    if !config.upstream.has_api_key() {
        warn!(
            "OPENAI_API_KEY is not set; chat requests will fail with a configuration error"
        );
    }

    let client = OpenAiClient::new(config.upstream.clone())
        .context("Failed to build HTTP client for the AI service")?;

    info!(
        environment = ?config.environment,
        max_requests = config.admission.max_requests,
        window_secs = config.admission.window.as_secs(),
        "Relay bootstrapped"
    );

    Ok(
        AxumContext::new(Arc::new(client), config.admission, config.environment)
            .with_system_directive(config.system_directive.clone()),
    )
}

/// Start the web server and run until `cancel` fires.
///
/// In-flight requests are allowed to finish after cancellation; open
/// streams end when their clients disconnect.
pub async fn start_server(config: ServerConfig, cancel: CancellationToken) -> Result<()> {
    let ctx = bootstrap(&config)?;
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("AMOLO relay listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(cancel.cancelled_owned())
    .await
    .context("Server error")?;

    info!("Server stopped");
    Ok(())
}
