use crate::client::session::ChatSession;
use crate::config::ClientConfig;
use crate::transport::{ApiPath, HttpTransport};
use crate::Result;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Client for the RAG chat and knowledge-base items API.
///
/// Cloning is cheap and clones share one live configuration: a credential set through any
/// clone (or through the client behind a [`ChatSession`]) applies to every later request.
#[derive(Clone)]
pub struct RagClient {
    pub(crate) transport: Arc<HttpTransport>,
}

impl RagClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        crate::client::builder::RagClientBuilder::new()
            .config(config)
            .build()
    }

    /// Client configured from `RAG_API_BASE_URL`, `RAG_API_KEY` (or the keyring) and `RAG_PROXY_URL`.
    pub fn from_env() -> Result<Self> {
        crate::client::builder::RagClientBuilder::from_env().build()
    }

    pub fn builder() -> crate::client::builder::RagClientBuilder {
        crate::client::builder::RagClientBuilder::new()
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Arc<ClientConfig> {
        self.transport.config()
    }

    pub fn set_base_url(&self, base_url: impl Into<String>) -> Result<()> {
        let base_url = base_url.into();
        self.transport.update_config(|c| c.base_url = base_url.clone())
    }

    pub fn set_api_key(&self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        self.transport.modify_config(|c| c.api_key = Some(api_key.clone()));
    }

    pub fn clear_api_key(&self) {
        self.transport.modify_config(|c| c.api_key = None);
    }

    /// Replace the whole extra-header map.
    pub fn set_headers(&self, headers: HashMap<String, String>) {
        self.transport.modify_config(|c| {
            c.headers.clear();
            c.extend_headers(headers.clone());
        });
    }

    /// Set one extra header. An existing header with the same name in any case is replaced.
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        self.transport
            .modify_config(|c| c.insert_header(name.as_str(), value.as_str()));
    }

    pub fn remove_header(&self, name: &str) {
        self.transport.modify_config(|c| c.remove_header(name));
    }

    /// Start a chat session with its own empty history.
    pub fn chat_session(&self, system_prompt: Option<String>) -> ChatSession {
        ChatSession::new(self.clone(), system_prompt)
    }

    /// Call an arbitrary endpoint of the same API with the client's configuration.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        headers: Option<&HashMap<String, String>>,
        body: Option<&Value>,
    ) -> Result<Value> {
        self.transport
            .execute(method, &ApiPath::new(path), headers, body)
            .await
    }
}

impl std::fmt::Debug for RagClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let config = self.config();
        f.debug_struct("RagClient")
            .field("base_url", &config.base_url)
            .field("api_key", &config.api_key.as_ref().map(|_| "<redacted>"))
            .field("headers", &config.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}
