//! Stream relay state machine.
//!
//! [`StreamRelay`] turns upstream [`ChunkResult`]s into the ordered event
//! sequence delivered to the client:
//!
//! ```text
//! Opening ──first item──▶ Relaying ──done / EOF──▶ Draining ──▶ Closed
//!                            │                                    ▲
//!                            └──────────── error ─────────────────┘
//! ```
//!
//! Empty deltas are skipped, every non-empty delta becomes exactly one
//! [`RelayEvent::Content`], a successful stream ends with one
//! [`RelayEvent::Done`], and a failed one with one [`RelayEvent::Error`].
//! The upstream stream is dropped as soon as the relay closes, which cancels
//! the producer when it is a [`ChunkStream`](crate::ports::ChunkStream).

use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures_util::{Stream, StreamExt};
use tracing::debug;

use crate::ports::ChunkResult;

/// An event delivered downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// One non-empty delta, in arrival order.
    Content(String),
    /// Terminal sentinel after a successful stream.
    Done,
    /// Terminal failure after relaying began.
    Error(String),
}

impl RelayEvent {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Waiting for the first upstream item.
    Opening,
    /// Forwarding deltas.
    Relaying,
    /// Upstream finished; the sentinel is next.
    Draining,
    /// Terminal. No further events.
    Closed,
}

/// Relays an upstream chunk stream as [`RelayEvent`]s.
#[derive(Debug)]
pub struct StreamRelay<S> {
    upstream: Option<S>,
    state: RelayState,
    relayed: usize,
}

impl<S> StreamRelay<S>
where
    S: Stream<Item = ChunkResult> + Unpin,
{
    #[must_use]
    pub const fn new(upstream: S) -> Self {
        Self {
            upstream: Some(upstream),
            state: RelayState::Opening,
            relayed: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> RelayState {
        self.state
    }

    /// Number of content events emitted so far.
    #[must_use]
    pub const fn relayed(&self) -> usize {
        self.relayed
    }

    fn close(&mut self) {
        self.state = RelayState::Closed;
        self.upstream = None;
    }
}

impl<S> Stream for StreamRelay<S>
where
    S: Stream<Item = ChunkResult> + Unpin,
{
    type Item = RelayEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            match this.state {
                RelayState::Closed => return Poll::Ready(None),
                RelayState::Draining => {
                    debug!(relayed = this.relayed, "Upstream stream complete");
                    this.close();
                    return Poll::Ready(Some(RelayEvent::Done));
                }
                RelayState::Opening | RelayState::Relaying => {
                    let Some(upstream) = this.upstream.as_mut() else {
                        this.close();
                        return Poll::Ready(None);
                    };

                    match ready!(upstream.poll_next_unpin(cx)) {
                        Some(Ok(chunk)) => {
                            this.state = if chunk.done {
                                RelayState::Draining
                            } else {
                                RelayState::Relaying
                            };

                            if !chunk.delta_content.is_empty() {
                                this.relayed += 1;
                                return Poll::Ready(Some(RelayEvent::Content(
                                    chunk.delta_content,
                                )));
                            }
                        }
                        Some(Err(e)) => {
                            debug!(relayed = this.relayed, error = %e, "Upstream stream failed");
                            this.close();
                            return Poll::Ready(Some(RelayEvent::Error(e.message().to_string())));
                        }
                        // EOF without a sentinel still counts as completion.
                        None => this.state = RelayState::Draining,
                    }
                }
            }
        }
    }
}
