use crate::transport::ApiPath;
use crate::types::{ChatReply, ChatRequest};
use crate::{Error, ErrorContext, Result};
use reqwest::Method;

use super::core::RagClient;

pub(crate) const CHAT_PATH: &str = "/api/rag/chat";
#[cfg(feature = "streaming")]
pub(crate) const CHAT_STREAM_PATH: &str = "/api/rag/chat/stream";

fn validate_chat_request(request: &ChatRequest, source: &str) -> Result<()> {
    if request.message.is_empty() {
        return Err(Error::validation_with_context(
            "message is required",
            ErrorContext::new()
                .with_field_path("request.message")
                .with_source(source),
        ));
    }
    Ok(())
}

impl RagClient {
    /// Ask the RAG chat endpoint one question.
    ///
    /// The body carries exactly the fields set on `request`. An empty message fails before
    /// any request is sent.
    pub async fn rag_chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        validate_chat_request(request, "rag_chat")?;
        let body = serde_json::to_value(request)?;
        let response = self
            .transport
            .execute(Method::POST, &ApiPath::new(CHAT_PATH), None, Some(&body))
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Open a streaming chat connection.
    ///
    /// The request fields travel as query parameters (`history` as a JSON array string).
    /// Nothing is recorded anywhere: callers keeping a history must append the turns
    /// themselves once the stream completes.
    #[cfg(feature = "streaming")]
    pub async fn rag_chat_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<crate::BoxStream<'static, crate::types::ChatStreamEvent>> {
        validate_chat_request(request, "rag_chat_stream")?;

        let mut query = vec![("message", request.message.clone())];
        if let Some(history) = &request.history {
            query.push(("history", serde_json::to_string(history)?));
        }
        if let Some(prompt) = &request.system_prompt {
            query.push(("system_prompt", prompt.clone()));
        }

        let bytes = self
            .transport
            .open_event_stream(&ApiPath::new(CHAT_STREAM_PATH), &query, None)
            .await?;
        Ok(crate::stream::chat_events(bytes))
    }
}
