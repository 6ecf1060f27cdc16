//! Scripted [`CompletionPort`] for route tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use amolo_core::{
    ChunkResult, ChunkStream, CompletionPort, CompletionRequest, CompletionResult, ServiceError,
    StreamChunk, Usage,
};

/// Replays canned results and records every request it receives.
pub struct FakeCompletions {
    reply: Result<CompletionResult, ServiceError>,
    stream: Result<Vec<ChunkResult>, ServiceError>,
    hold_open: bool,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
    /// Signalled when a held-open stream observes its consumer going away.
    pub stream_cancelled: Arc<Notify>,
}

impl FakeCompletions {
    pub fn replying(content: &str) -> Self {
        Self {
            reply: Ok(CompletionResult {
                content: content.to_string(),
                usage: Usage {
                    prompt_tokens: 20,
                    completion_tokens: 3,
                    total_tokens: 23,
                },
            }),
            stream: Ok(vec![
                Ok(StreamChunk::delta(content)),
                Ok(StreamChunk::done()),
            ]),
            hold_open: false,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            stream_cancelled: Arc::new(Notify::new()),
        }
    }

    pub fn failing(err: ServiceError) -> Self {
        Self {
            reply: Err(err.clone()),
            stream: Err(err),
            ..Self::replying("")
        }
    }

    pub fn streaming(items: Vec<ChunkResult>) -> Self {
        Self {
            stream: Ok(items),
            ..Self::replying("")
        }
    }

    /// Keep the stream open after the scripted items until the consumer
    /// disconnects.
    pub fn holding_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> CompletionRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no completion requested")
    }

    fn record(&self, request: &CompletionRequest) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
    }
}

#[async_trait]
impl CompletionPort for FakeCompletions {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, ServiceError> {
        self.record(request);
        self.reply.clone()
    }

    async fn open_stream(&self, request: &CompletionRequest) -> Result<ChunkStream, ServiceError> {
        self.record(request);
        let items = self.stream.clone()?;

        if !self.hold_open {
            return Ok(ChunkStream::from_items(items));
        }

        let (sender, stream) = ChunkStream::channel(items.len() + 1);
        let cancelled = Arc::clone(&self.stream_cancelled);
        tokio::spawn(async move {
            for item in items {
                if !sender.send(item).await {
                    break;
                }
            }
            sender.cancelled().await;
            cancelled.notify_one();
        });
        Ok(stream)
    }
}
