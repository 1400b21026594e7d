//! Client configuration: base address, credential, extra headers.
//!
//! A [`ClientConfig`] is a plain value. The client keeps the live copy behind an atomic
//! snapshot and replaces it through its setters, so every request sees one consistent
//! configuration.

use crate::{Error, ErrorContext, Result};
use keyring::Entry;
use std::collections::HashMap;
use std::env;
use url::Url;

/// Default base address when neither the caller nor the environment provides one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Header carrying the credential token on every request.
pub const API_KEY_HEADER: &str = "X-API-Key";

pub const ENV_BASE_URL: &str = "RAG_API_BASE_URL";
pub const ENV_API_KEY: &str = "RAG_API_KEY";
pub const ENV_PROXY_URL: &str = "RAG_PROXY_URL";

const KEYRING_SERVICE: &str = "rag-kb-sdk";
const KEYRING_USER: &str = "api-key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Extra headers sent with every request. They override the JSON content-type default.
    pub headers: HashMap<String, String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            headers: HashMap::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    /// Replace all extra headers. Names differing only in case collapse to the last one seen.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.clear();
        self.extend_headers(headers);
        self
    }

    /// Set one extra header, replacing any existing entry whose name matches ignoring case.
    pub fn insert_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove_header(&name);
        self.headers.insert(name, value.into());
    }

    pub fn extend_headers(&mut self, headers: impl IntoIterator<Item = (String, String)>) {
        for (name, value) in headers {
            self.insert_header(name, value);
        }
    }

    /// Remove an extra header, matching the name ignoring case.
    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    }

    /// Load configuration from the environment.
    ///
    /// - `RAG_API_BASE_URL` (default `http://localhost:3000`)
    /// - `RAG_API_KEY`, falling back to the OS keyring entry `rag-kb-sdk` / `api-key`
    pub fn from_env() -> Self {
        let base_url = env::var(ENV_BASE_URL)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = env::var(ENV_API_KEY)
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(keyring_api_key);
        Self {
            base_url,
            api_key,
            headers: HashMap::new(),
        }
    }

    /// Parse and check the base address.
    pub fn parsed_base_url(&self) -> Result<Url> {
        parse_base_url(&self.base_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let ctx = || {
        ErrorContext::new()
            .with_field_path("config.base_url")
            .with_details(raw.to_string())
    };
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::configuration_with_context(format!("invalid base URL: {}", e), ctx()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(Error::configuration_with_context(
            "base URL must be an absolute http(s) address",
            ctx(),
        ));
    }
    Ok(url)
}

fn keyring_api_key() -> Option<String> {
    let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER).ok()?;
    entry.get_password().ok()
}
