//! OpenAI chat completions client.

use std::pin::pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};

use amolo_core::{
    ChunkResult, ChunkSender, ChunkStream, CompletionPort, CompletionRequest, CompletionResult,
    ServiceError,
};

use crate::config::UpstreamConfig;
use crate::sse::decode_frames;
use crate::translate::{ProviderOutcome, translate, translate_failure, transport_error};
use crate::wire::ChatCompletionRequest;

/// Environment variable the credential is read from.
pub const API_KEY_VARIABLE: &str = "OPENAI_API_KEY";

/// [`CompletionPort`] backed by an OpenAI-compatible chat completions API.
///
/// One instance is shared by all requests; the underlying `reqwest::Client`
/// pools connections.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: UpstreamConfig,
    endpoint: String,
}

impl OpenAiClient {
    /// Build a client from configuration.
    pub fn new(config: UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        let endpoint = config.completions_url();

        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    fn request(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::RequestBuilder, ServiceError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ServiceError::missing_credential(API_KEY_VARIABLE))?;

        Ok(self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&ChatCompletionRequest::from_domain(request, stream)))
    }
}

#[async_trait]
impl CompletionPort for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, ServiceError> {
        let builder = self.request(request, false)?.timeout(self.config.timeout);

        info!(
            model = %request.model,
            messages = request.messages.len(),
            "Requesting completion"
        );

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("AI service request failed: {e}");
                return translate(ProviderOutcome::transport(&e));
            }
        };

        let status = response.status().as_u16();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read AI service response: {e}");
                return translate(ProviderOutcome::transport(&e));
            }
        };

        let result = translate(ProviderOutcome::Response {
            status,
            body: &body,
        });
        match &result {
            Ok(completion) => debug!(
                status,
                total_tokens = completion.usage.total_tokens,
                "Completion received"
            ),
            Err(e) => warn!(status, kind = %e.kind(), "AI service returned an error: {e}"),
        }
        result
    }

    async fn open_stream(&self, request: &CompletionRequest) -> Result<ChunkStream, ServiceError> {
        let builder = self.request(request, true)?;

        info!(
            model = %request.model,
            messages = request.messages.len(),
            "Opening completion stream"
        );

        let response = builder.send().await.map_err(|e| {
            warn!("AI service stream request failed: {e}");
            transport_error(e.is_timeout())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let err = translate_failure(status.as_u16(), &body);
            warn!(status = status.as_u16(), kind = %err.kind(), "AI service refused stream: {err}");
            return Err(err);
        }

        let (sender, stream) = ChunkStream::channel(self.config.stream_buffer);
        tokio::spawn(pump(decode_frames(response.bytes_stream()), sender));
        Ok(stream)
    }
}

/// Forward decoded frames to the consumer until the stream ends, an error is
/// sent, or the consumer goes away. Returning drops the upstream response,
/// which closes the provider connection.
async fn pump<S>(frames: S, sender: ChunkSender)
where
    S: Stream<Item = ChunkResult>,
{
    let mut frames = pin!(frames);

    loop {
        let item = tokio::select! {
            () = sender.cancelled() => {
                debug!("Client disconnected, aborting upstream stream");
                return;
            }
            item = frames.next() => item,
        };

        let Some(item) = item else {
            return;
        };
        let terminal = item.as_ref().map_or(true, |chunk| chunk.done);
        if !sender.send(item).await || terminal {
            return;
        }
    }
}
