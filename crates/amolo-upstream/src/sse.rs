//! Incremental SSE frame decoder for streamed completions.
//!
//! Upstream bytes arrive in arbitrary slices; frames are only decoded once a
//! full line is buffered. Each `data:` line becomes one [`ChunkResult`]. The
//! decoded stream ends after `[DONE]`, after the first error, or at EOF.

use bytes::{Bytes, BytesMut};
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use tracing::warn;

use amolo_core::{ChunkResult, ServiceError};

use crate::translate::translate_frame;

struct DecodeState<E> {
    stream: BoxStream<'static, Result<Bytes, E>>,
    buf: BytesMut,
    done: bool,
}

/// Decode an SSE byte stream into chunk results.
pub fn decode_frames<S, E>(byte_stream: S) -> impl Stream<Item = ChunkResult>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let state = DecodeState {
        stream: byte_stream.boxed(),
        buf: BytesMut::new(),
        done: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        if st.done {
            return None;
        }

        loop {
            if let Some(line_end) = find_newline(&st.buf) {
                let line = st.buf.split_to(line_end + 1);
                if let Some(item) = decode_line(&line) {
                    st.done = item.as_ref().map_or(true, |chunk| chunk.done);
                    return Some((item, st));
                }
                continue;
            }

            match st.stream.next().await {
                Some(Ok(chunk)) => st.buf.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    warn!("Upstream stream error: {e}");
                    st.done = true;
                    return Some((
                        Err(ServiceError::UpstreamUnavailable(format!(
                            "Stream interrupted: {e}"
                        ))),
                        st,
                    ));
                }
                None => {
                    // A last line without its newline is still a frame.
                    st.done = true;
                    if st.buf.is_empty() {
                        return None;
                    }
                    let rest = st.buf.split();
                    return decode_line(&rest).map(|item| (item, st));
                }
            }
        }
    })
}

/// Decode one SSE line. Blank lines, comments and non-data fields yield `None`.
fn decode_line(line: &[u8]) -> Option<ChunkResult> {
    let text = String::from_utf8_lossy(line);
    let trimmed = text.trim();

    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }

    let data = trimmed.strip_prefix("data:")?.trim();
    Some(translate_frame(data))
}

fn find_newline(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n')
}
