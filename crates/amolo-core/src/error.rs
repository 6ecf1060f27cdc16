//! Service error taxonomy.
//!
//! Every failure the relay can report to a client is one variant of
//! [`ServiceError`]. Each variant has exactly one HTTP status, so adapters
//! never have to guess how to surface an error.

use thiserror::Error;

/// Stable discriminant for a [`ServiceError`], useful for logging and matching
/// without caring about the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Configuration,
    Auth,
    RateLimited,
    UpstreamUnavailable,
    Protocol,
    Provider,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// Convert kind to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::Configuration => "configuration_error",
            Self::Auth => "auth_error",
            Self::RateLimited => "rate_limited",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::Protocol => "protocol_error",
            Self::Provider => "provider_error",
            Self::NotFound => "not_found",
            Self::Internal => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the relay to its clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Malformed client input.
    #[error("{0}")]
    Validation(String),

    /// The server is missing required configuration (e.g. the provider credential).
    #[error("{0}")]
    Configuration(String),

    /// The provider rejected our credential.
    #[error("{0}")]
    Auth(String),

    /// Either the local admission gate or the provider refused the request.
    #[error("{0}")]
    RateLimited(String),

    /// Provider unreachable, timed out, or answered with a 5xx.
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// The provider answered with a body we could not interpret.
    #[error("{0}")]
    Protocol(String),

    /// Any other non-success provider answer, relayed with its own status.
    #[error("{message}")]
    Provider { status: u16, message: String },

    /// No route matched.
    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure caught at the outer boundary.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Build the configuration error reported when the provider credential is absent.
    #[must_use]
    pub fn missing_credential(variable: &str) -> Self {
        Self::Configuration(format!(
            "Server configuration error: {variable} is not set"
        ))
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Auth(_) => ErrorKind::Auth,
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Provider { .. } => ErrorKind::Provider,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status this error is reported with.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Auth(_) => 401,
            Self::NotFound(_) => 404,
            Self::RateLimited(_) => 429,
            Self::Provider { status, .. } => *status,
            Self::Configuration(_)
            | Self::UpstreamUnavailable(_)
            | Self::Protocol(_)
            | Self::Internal(_) => 500,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::Configuration(msg)
            | Self::Auth(msg)
            | Self::RateLimited(msg)
            | Self::UpstreamUnavailable(msg)
            | Self::Protocol(msg)
            | Self::NotFound(msg)
            | Self::Internal(msg) => msg,
            Self::Provider { message, .. } => message,
        }
    }
}
