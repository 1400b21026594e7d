use crate::client::core::RagClient;
use crate::config::{ClientConfig, ENV_PROXY_URL};
use crate::transport::HttpTransport;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for creating clients with custom configuration.
///
/// Keep this surface area small and predictable.
pub struct RagClientBuilder {
    config: ClientConfig,
    proxy_url: Option<String>,
}

impl RagClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            proxy_url: None,
        }
    }

    /// Start from [`ClientConfig::from_env`]; also picks up `RAG_PROXY_URL`.
    pub fn from_env() -> Self {
        Self {
            config: ClientConfig::from_env(),
            proxy_url: std::env::var(ENV_PROXY_URL).ok(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    /// Add one extra header sent with every request. Header names are case-insensitive.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert_header(name, value);
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.config.extend_headers(headers);
        self
    }

    /// Route all requests through an HTTP(S) proxy.
    pub fn proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// Build the client. Fails on an invalid base URL, proxy URL, or HTTP client setup.
    pub fn build(self) -> Result<RagClient> {
        let transport = HttpTransport::with_proxy(self.config, self.proxy_url.as_deref())?;
        Ok(RagClient {
            transport: Arc::new(transport),
        })
    }
}

impl Default for RagClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
