//! Configuration for the OpenAI client.

use std::time::Duration;

/// Configuration for [`OpenAiClient`](crate::OpenAiClient).
///
/// # Example
///
/// ```
/// use amolo_upstream::UpstreamConfig;
/// use std::time::Duration;
///
/// let config = UpstreamConfig::new()
///     .with_api_key("sk-test")
///     .with_timeout(Duration::from_secs(30));
/// ```
#[derive(Clone)]
pub struct UpstreamConfig {
    /// Base URL of the chat completions API, without trailing `/chat/completions`
    pub(crate) base_url: String,
    /// Bearer credential; `None` fails every call before it reaches the network
    pub(crate) api_key: Option<String>,
    /// Deadline for a whole buffered completion
    pub(crate) timeout: Duration,
    /// Deadline for establishing the connection (both modes)
    pub(crate) connect_timeout: Duration,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Chunks buffered between the upstream reader and the relay
    pub(crate) stream_buffer: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("amolo-upstream/", env!("CARGO_PKG_VERSION")).to_string(),
            stream_buffer: 32,
        }
    }
}

impl UpstreamConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL.
    ///
    /// Defaults to `https://api.openai.com/v1`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set an optional credential. Blank keys count as missing.
    #[must_use]
    pub fn with_optional_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Set the buffered request timeout.
    ///
    /// Defaults to 60 seconds. Streams are not bounded by it.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub const fn with_stream_buffer(mut self, chunks: usize) -> Self {
        self.stream_buffer = chunks;
        self
    }

    /// Whether a credential is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .field("stream_buffer", &self.stream_buffer)
            .finish()
    }
}
