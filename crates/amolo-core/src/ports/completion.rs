//! Completion provider port.
//!
//! [`CompletionPort`] is the seam between the relay and the LLM provider.
//! Streaming results travel through a bounded channel: the adapter pushes
//! chunks through a [`ChunkSender`], the relay pulls them from the paired
//! [`ChunkStream`]. Dropping the `ChunkStream` cancels the sender's token so
//! the producing task can abort the upstream connection.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::domain::{CompletionRequest, CompletionResult, StreamChunk};
use crate::error::ServiceError;

/// One item of a streamed completion.
pub type ChunkResult = Result<StreamChunk, ServiceError>;

/// Port for issuing completions against an LLM provider.
///
/// Implementations perform exactly one upstream call per invocation and
/// never retry.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Issue a buffered completion and wait for the full result.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, ServiceError>;

    /// Open a streamed completion.
    ///
    /// Returns once the provider has accepted the request; failures before
    /// that point are returned as `Err` rather than in-stream.
    async fn open_stream(&self, request: &CompletionRequest) -> Result<ChunkStream, ServiceError>;
}

/// Producer half of a streamed completion.
#[derive(Debug)]
pub struct ChunkSender {
    sender: mpsc::Sender<ChunkResult>,
    cancel: CancellationToken,
}

impl ChunkSender {
    /// Push one item to the consumer.
    ///
    /// Returns `false` once the consumer is gone; the producer should stop.
    pub async fn send(&self, item: ChunkResult) -> bool {
        self.sender.send(item).await.is_ok()
    }

    /// Resolves when the consumer has dropped its [`ChunkStream`].
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Consumer half of a streamed completion.
///
/// Finite and non-restartable: yields items in the order they were sent
/// and ends when the producer is dropped.
#[derive(Debug)]
pub struct ChunkStream {
    receiver: mpsc::Receiver<ChunkResult>,
    _cancel_on_drop: DropGuard,
}

impl ChunkStream {
    /// Create a connected sender/stream pair with the given buffer capacity.
    #[must_use]
    pub fn channel(capacity: usize) -> (ChunkSender, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();
        let stream = Self {
            receiver,
            _cancel_on_drop: cancel.clone().drop_guard(),
        };
        (ChunkSender { sender, cancel }, stream)
    }

    /// Build a stream that replays a fixed sequence of items.
    #[must_use]
    pub fn from_items(items: Vec<ChunkResult>) -> Self {
        let (sender, stream) = Self::channel(items.len());
        for item in items {
            // Capacity equals item count, so this cannot fail.
            let _ = sender.sender.try_send(item);
        }
        stream
    }
}

impl Stream for ChunkStream {
    type Item = ChunkResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
