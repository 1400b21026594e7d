//! Events yielded by the streaming chat endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum ChatStreamEvent {
    /// Incremental reply text.
    #[serde(rename = "Delta")]
    Delta { content: String },

    /// The server finished the reply. Always the last event of a stream.
    #[serde(rename = "Done")]
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        reply: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u64>,
    },

    /// Error reported in-band by the server. The connection may stay open afterwards.
    #[serde(rename = "Error")]
    Error { message: String },

    /// Any other event, passed through untouched.
    #[serde(rename = "Other")]
    Other {
        #[serde(skip_serializing_if = "Option::is_none")]
        event: Option<String>,
        data: serde_json::Value,
    },
}

impl ChatStreamEvent {
    pub fn as_delta(&self) -> Option<&str> {
        match self {
            ChatStreamEvent::Delta { content } => Some(content),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, ChatStreamEvent::Done { .. })
    }
}
