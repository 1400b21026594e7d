//! Chat completion request and reply bodies.

use super::message::ChatTurn;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/rag/chat`. Absent optional fields are left out of the JSON entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ChatTurn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            history: None,
            system_prompt: None,
        }
    }

    pub fn history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

/// Reply from the chat endpoint, passed through as the server sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    /// Requests used in the current quota window, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}
