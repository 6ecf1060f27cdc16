//! Server-sent event framing for relayed completions.
//!
//! Wire format, one event per relay event:
//!
//! ```text
//! data: {"content":"<delta>"}\n\n
//! data: [DONE]\n\n
//! data: {"error":"<message>"}\n\n
//! ```

use std::convert::Infallible;

use axum::http::{HeaderName, HeaderValue, header};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::{Stream, StreamExt};
use serde_json::json;

use amolo_core::{ChunkResult, RelayEvent, StreamRelay};

/// Convert one relay event into an SSE event.
pub fn to_event(event: &RelayEvent) -> Event {
    match event {
        RelayEvent::Content(content) => Event::default().data(json!({ "content": content }).to_string()),
        RelayEvent::Done => Event::default().data("[DONE]"),
        RelayEvent::Error(message) => Event::default().data(json!({ "error": message }).to_string()),
    }
}

/// Build the streaming response for an opened upstream stream.
///
/// The body owns the relay, so a client disconnect drops the upstream stream
/// and cancels its producer.
pub fn relay_response<S>(upstream: S) -> Response
where
    S: Stream<Item = ChunkResult> + Unpin + Send + 'static,
{
    let events = StreamRelay::new(upstream).map(|event| Ok::<_, Infallible>(to_event(&event)));

    (
        [
            (header::CONNECTION, HeaderValue::from_static("keep-alive")),
            // Disable nginx buffering
            (
                HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        Sse::new(events),
    )
        .into_response()
}
