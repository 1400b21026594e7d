//! Stateful chat over [`RagClient::rag_chat`] that threads the conversation into each call.

use crate::types::{ChatReply, ChatRequest, ChatTurn};
use crate::Result;
use tracing::debug;

use super::core::RagClient;

/// A conversation with the RAG chat endpoint.
///
/// The session owns its history. A successful [`ChatSession::send_message`] appends the user
/// turn and the assistant reply together; a failed one leaves the history untouched.
/// `send_message` takes `&mut self`, so one session never has two sends in flight.
#[derive(Debug, Clone)]
pub struct ChatSession {
    client: RagClient,
    history: Vec<ChatTurn>,
    system_prompt: String,
}

impl ChatSession {
    pub fn new(client: RagClient, system_prompt: Option<String>) -> Self {
        Self {
            client,
            history: Vec::new(),
            system_prompt: system_prompt.unwrap_or_default(),
        }
    }

    /// Send `text` with the history so far and the current system prompt.
    ///
    /// An empty history or prompt is left out of the request body.
    pub async fn send_message(&mut self, text: impl Into<String>) -> Result<ChatReply> {
        let text = text.into();
        let mut request = ChatRequest::new(text.clone());
        if !self.history.is_empty() {
            request = request.history(self.history.clone());
        }
        if !self.system_prompt.is_empty() {
            request = request.system_prompt(self.system_prompt.clone());
        }

        let reply = self.client.rag_chat(&request).await?;

        self.history.push(ChatTurn::user(text));
        self.history.push(ChatTurn::assistant(reply.reply.clone()));
        debug!(turns = self.history.len(), "chat session history extended");
        Ok(reply)
    }

    /// Copy of the conversation so far, oldest first.
    pub fn history(&self) -> Vec<ChatTurn> {
        self.history.clone()
    }

    /// Drop all turns. The system prompt is kept.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Replace the prompt used by later sends. Turns already sent are unaffected.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Number of turns (two per successful send).
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn client(&self) -> &RagClient {
        &self.client
    }
}
