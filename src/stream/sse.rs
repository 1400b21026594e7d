//! Server-Sent Events framing (Bytes -> frames).

use crate::transport::TransportError;
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::{stream, StreamExt};

/// One dispatched SSE event: the optional `event:` name and its joined `data:` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

impl SseFrame {
    /// Parse one frame (the text between blank lines). Comment-only frames yield `None`.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(raw);
        let mut event = None;
        let mut data_lines: Vec<&str> = Vec::new();

        for line in text.split('\n') {
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let (field, value) = match line.find(':') {
                Some(idx) => {
                    let value = &line[idx + 1..];
                    (&line[..idx], value.strip_prefix(' ').unwrap_or(value))
                }
                None => (line, ""),
            };
            match field {
                "event" => event = Some(value.to_string()),
                "data" => data_lines.push(value),
                // id / retry carry nothing the client acts on
                _ => {}
            }
        }

        if event.is_none() && data_lines.is_empty() {
            return None;
        }
        Some(Self {
            event,
            data: data_lines.join("\n"),
        })
    }
}

/// Largest frame buffered while waiting for its terminating blank line.
pub const MAX_FRAME_BYTES: usize = 1 << 20;

/// Incrementally buffer bytes and emit frames split on blank lines.
///
/// Bytes are buffered raw so multi-byte characters split across chunks decode intact.
/// Carriage returns are dropped, which turns CRLF framing into LF framing.
pub fn sse_frames(input: BoxStream<'static, Bytes>) -> BoxStream<'static, SseFrame> {
    sse_frames_with_limit(input, MAX_FRAME_BYTES)
}

/// [`sse_frames`] with a custom frame size limit. A frame over `limit` bytes yields one
/// [`TransportError::FrameTooLarge`] error and ends the stream.
pub fn sse_frames_with_limit(
    input: BoxStream<'static, Bytes>,
    limit: usize,
) -> BoxStream<'static, SseFrame> {
    let state = FrameBuffer {
        input,
        buf: Vec::new(),
        scanned: 0,
        eof: false,
    };
    let frames = stream::unfold(state, move |mut state| async move {
        loop {
            if let Some(idx) = state.next_delimiter() {
                let frame: Vec<u8> = state.buf.drain(..idx + 2).collect();
                state.scanned = 0;
                if let Some(parsed) = SseFrame::parse(&frame[..idx]) {
                    return Some((Ok(parsed), state));
                }
                continue;
            }

            if state.eof {
                // A final frame without its trailing blank line still counts.
                let rest = std::mem::take(&mut state.buf);
                return SseFrame::parse(&rest).map(|parsed| (Ok(parsed), state));
            }

            if state.buf.len() > limit {
                state.buf.clear();
                state.scanned = 0;
                state.eof = true;
                let err = Error::Transport(TransportError::FrameTooLarge { limit });
                return Some((Err(err), state));
            }

            match state.input.next().await {
                Some(Ok(bytes)) => state
                    .buf
                    .extend(bytes.iter().copied().filter(|b| *b != b'\r')),
                Some(Err(e)) => return Some((Err(e), state)),
                None => state.eof = true,
            }
        }
    });
    Box::pin(frames)
}

struct FrameBuffer {
    input: BoxStream<'static, Bytes>,
    buf: Vec<u8>,
    /// Bytes of `buf` already searched for a delimiter.
    scanned: usize,
    eof: bool,
}

impl FrameBuffer {
    /// Position of the next `\n\n`, searching only bytes not seen before (plus one byte of
    /// overlap for a delimiter split across chunks).
    fn next_delimiter(&mut self) -> Option<usize> {
        let from = self.scanned.min(self.buf.len()).saturating_sub(1);
        let found = self.buf[from..]
            .windows(2)
            .position(|w| w == b"\n\n")
            .map(|i| from + i);
        if found.is_none() {
            self.scanned = self.buf.len();
        }
        found
    }
}

/// Collect frames from an in-memory stream; used by tests across the crate.
#[cfg(test)]
pub(crate) fn bytes_stream(chunks: Vec<&'static str>) -> BoxStream<'static, Bytes> {
    Box::pin(stream::iter(
        chunks
            .into_iter()
            .map(|c| Ok::<Bytes, crate::Error>(Bytes::from_static(c.as_bytes()))),
    ))
}
