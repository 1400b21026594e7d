//! Streaming chat decoding: SSE frames mapped onto [`ChatStreamEvent`]s.
//!
//! Mapping rules, in order:
//! - a `[DONE]` payload ends the stream without an event
//! - `event: error`, or a JSON object with an `error` string, is an [`ChatStreamEvent::Error`]
//! - `event: done|end`, or a JSON object with `done: true`, is [`ChatStreamEvent::Done`] and ends the stream
//! - a JSON object with a string `delta`, `token`, `content` or `reply` is a [`ChatStreamEvent::Delta`]
//! - non-JSON text is a delta carrying the raw text
//! - anything else is passed through as [`ChatStreamEvent::Other`]

pub mod sse;

use crate::types::ChatStreamEvent;
use crate::BoxStream;
use bytes::Bytes;
use futures::{stream, StreamExt};
use serde_json::Value;
use sse::SseFrame;

const DONE_SIGNAL: &str = "[DONE]";
const DELTA_FIELDS: &[&str] = &["delta", "token", "content", "reply"];

enum Decoded {
    Event(ChatStreamEvent),
    Skip,
    End,
}

/// Decode a raw event-stream body into chat events.
pub fn chat_events(input: BoxStream<'static, Bytes>) -> BoxStream<'static, ChatStreamEvent> {
    let frames = sse::sse_frames(input);
    let events = stream::unfold((frames, false), |(mut frames, finished)| async move {
        if finished {
            return None;
        }
        loop {
            match frames.next().await? {
                Err(e) => return Some((Err(e), (frames, false))),
                Ok(frame) => match decode_frame(frame) {
                    Decoded::Skip => continue,
                    Decoded::End => return None,
                    Decoded::Event(event) => {
                        let last = event.is_done();
                        return Some((Ok(event), (frames, last)));
                    }
                },
            }
        }
    });
    Box::pin(events)
}

fn decode_frame(frame: SseFrame) -> Decoded {
    let data = frame.data.trim();
    if data == DONE_SIGNAL {
        return Decoded::End;
    }

    let event_name = frame.event.as_deref().map(|e| e.trim().to_ascii_lowercase());
    let is_error = event_name.as_deref() == Some("error");
    let is_done = matches!(event_name.as_deref(), Some("done") | Some("end"));

    let json: Option<Value> = serde_json::from_str(data).ok();

    if is_error {
        let message = json
            .as_ref()
            .and_then(|v| string_field(v, &["error", "message"]))
            .unwrap_or_else(|| data.to_string());
        return Decoded::Event(ChatStreamEvent::Error { message });
    }

    match json {
        Some(Value::Object(ref obj)) => {
            let value = json.as_ref().unwrap_or(&Value::Null);
            if let Some(message) = obj.get("error").and_then(|v| v.as_str()) {
                return Decoded::Event(ChatStreamEvent::Error {
                    message: message.to_string(),
                });
            }
            if is_done || obj.get("done").and_then(|v| v.as_bool()) == Some(true) {
                return Decoded::Event(ChatStreamEvent::Done {
                    reply: string_field(value, &["reply"]),
                    usage: obj.get("usage").and_then(|v| v.as_u64()),
                    limit: obj.get("limit").and_then(|v| v.as_u64()),
                });
            }
            if let Some(content) = string_field(value, DELTA_FIELDS) {
                return Decoded::Event(ChatStreamEvent::Delta { content });
            }
            Decoded::Event(ChatStreamEvent::Other {
                event: frame.event.clone(),
                data: value.clone(),
            })
        }
        _ if is_done => Decoded::Event(ChatStreamEvent::Done {
            reply: None,
            usage: None,
            limit: None,
        }),
        Some(Value::String(content)) => Decoded::Event(ChatStreamEvent::Delta { content }),
        Some(other) => Decoded::Event(ChatStreamEvent::Other {
            event: frame.event.clone(),
            data: other,
        }),
        None if data.is_empty() => Decoded::Skip,
        // Raw text keeps its inner whitespace; only the framing was trimmed.
        None => Decoded::Event(ChatStreamEvent::Delta {
            content: frame.data.clone(),
        }),
    }
}

fn string_field(value: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|f| value.get(*f).and_then(|v| v.as_str()))
        .map(String::from)
}
