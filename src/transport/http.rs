use crate::config::{parse_base_url, ClientConfig, API_KEY_HEADER, ENV_PROXY_URL};
use crate::{Error, ErrorContext, Result};
use arc_swap::ArcSwap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Proxy};
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

#[cfg(feature = "streaming")]
use bytes::Bytes;
#[cfg(feature = "streaming")]
use futures::TryStreamExt;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// A relative API path kept as raw segments.
///
/// Segments are percent-encoded only when resolved against the base URL, so an item
/// id containing `/` or spaces stays a single segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Append the segments to the base URL's own path (a base like `https://host/prefix/` keeps its prefix).
    pub fn resolve(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| Error::configuration("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(self.segments.iter().map(String::as_str));
        Ok(url)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Single-attempt JSON-over-HTTP transport bound to a live [`ClientConfig`].
pub struct HttpTransport {
    client: reqwest::Client,
    config: ArcSwap<ClientConfig>,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let proxy_url = env::var(ENV_PROXY_URL).ok();
        Self::with_proxy(config, proxy_url.as_deref())
    }

    pub fn with_proxy(config: ClientConfig, proxy_url: Option<&str>) -> Result<Self> {
        parse_base_url(&config.base_url)?;

        // No client-level timeout: a call lasts as long as the caller keeps awaiting it.
        let mut builder = reqwest::Client::builder();
        if let Some(proxy_url) = proxy_url.filter(|s| !s.trim().is_empty()) {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy URL: {}", e),
                    ErrorContext::new().with_field_path("proxy_url"),
                )
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| Error::configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: ArcSwap::from_pointee(config),
        })
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<ClientConfig> {
        self.config.load_full()
    }

    /// Apply `f` to a copy of the current configuration and publish it.
    ///
    /// The new base URL is checked first; on error the previous configuration stays live.
    /// Concurrent updates are retried against the latest snapshot, so none is lost; `f` may
    /// therefore run more than once.
    pub fn update_config<F>(&self, f: F) -> Result<()>
    where
        F: Fn(&mut ClientConfig),
    {
        let mut outcome = Ok(());
        self.config.rcu(|current| {
            let mut next = ClientConfig::clone(current);
            f(&mut next);
            match parse_base_url(&next.base_url) {
                Ok(_) => {
                    outcome = Ok(());
                    Arc::new(next)
                }
                Err(e) => {
                    outcome = Err(e);
                    Arc::clone(current)
                }
            }
        });
        outcome
    }

    /// Like [`HttpTransport::update_config`] for changes that leave the base URL alone.
    pub(crate) fn modify_config<F>(&self, f: F)
    where
        F: Fn(&mut ClientConfig),
    {
        self.config.rcu(|current| {
            let mut next = ClientConfig::clone(current);
            f(&mut next);
            next
        });
    }

    /// Send one request and parse the response body as JSON.
    ///
    /// `headers` override the defaults only where names collide (case-insensitively).
    pub async fn execute(
        &self,
        method: Method,
        path: &ApiPath,
        headers: Option<&HashMap<String, String>>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let config = self.config.load_full();
        let url = path.resolve(&parse_base_url(&config.base_url)?)?;
        let header_map = build_headers(&config, headers)?;
        let request_id = request_id_of(&header_map);

        let mut request = self
            .client
            .request(method.clone(), url)
            .headers(header_map);
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        debug!(
            method = %method,
            path = %path,
            request_id = request_id.as_str(),
            "rag-kb-sdk sending request"
        );
        let start = Instant::now();

        let response = request.send().await.map_err(|e| {
            warn!(
                method = %method,
                path = %path,
                request_id = request_id.as_str(),
                error = %e,
                "rag-kb-sdk request got no response"
            );
            Error::Transport(TransportError::Http(e))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        if !status.is_success() {
            info!(
                http_status = status.as_u16(),
                method = %method,
                path = %path,
                request_id = request_id.as_str(),
                duration_ms = start.elapsed().as_millis() as u64,
                "rag-kb-sdk request failed"
            );
            return Err(Error::remote(status.as_u16(), parse_error_body(&text)));
        }

        debug!(
            http_status = status.as_u16(),
            path = %path,
            request_id = request_id.as_str(),
            duration_ms = start.elapsed().as_millis() as u64,
            "rag-kb-sdk request completed"
        );

        serde_json::from_str(&text).map_err(|e| Error::Transport(TransportError::InvalidBody(e)))
    }

    /// Open a `text/event-stream` GET connection and hand back its raw byte stream.
    ///
    /// A non-success status is read and classified like [`HttpTransport::execute`] before any
    /// bytes are yielded. Dropping the stream closes the connection.
    #[cfg(feature = "streaming")]
    pub async fn open_event_stream(
        &self,
        path: &ApiPath,
        query: &[(&str, String)],
        headers: Option<&HashMap<String, String>>,
    ) -> Result<crate::BoxStream<'static, Bytes>> {
        let config = self.config.load_full();
        let mut url = path.resolve(&parse_base_url(&config.base_url)?)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        let mut header_map = build_headers(&config, headers)?;
        header_map.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        let request_id = request_id_of(&header_map);

        debug!(
            path = %path,
            request_id = request_id.as_str(),
            "rag-kb-sdk opening event stream"
        );

        let response = self
            .client
            .get(url)
            .headers(header_map)
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| Error::Transport(TransportError::Http(e)))?;
            info!(
                http_status = status.as_u16(),
                path = %path,
                request_id = request_id.as_str(),
                "rag-kb-sdk event stream rejected"
            );
            return Err(Error::remote(status.as_u16(), parse_error_body(&text)));
        }

        let byte_stream = response
            .bytes_stream()
            .map_err(|e| Error::Transport(TransportError::Http(e)));
        Ok(Box::pin(byte_stream))
    }
}

/// Layer headers: JSON content type, instance extras, credential, per-call, request id.
fn build_headers(
    config: &ClientConfig,
    per_call: Option<&HashMap<String, String>>,
) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in &config.headers {
        insert_header(&mut map, name, value)?;
    }
    if let Some(key) = &config.api_key {
        insert_header(&mut map, API_KEY_HEADER, key)?;
    }
    if let Some(per_call) = per_call {
        for (name, value) in per_call {
            insert_header(&mut map, name, value)?;
        }
    }
    if !map.contains_key(REQUEST_ID_HEADER) {
        insert_header(&mut map, REQUEST_ID_HEADER, &Uuid::new_v4().to_string())?;
    }
    Ok(map)
}

fn insert_header(map: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let ctx = || ErrorContext::new().with_field_path(format!("headers.{}", name));
    let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        Error::configuration_with_context(format!("invalid header name: {}", e), ctx())
    })?;
    let value = HeaderValue::from_str(value).map_err(|e| {
        Error::configuration_with_context(format!("invalid header value: {}", e), ctx())
    })?;
    map.insert(name, value);
    Ok(())
}

fn request_id_of(map: &HeaderMap) -> String {
    map.get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Error bodies are attached whole: parsed JSON, the raw text as a JSON string, or null when empty.
fn parse_error_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON response body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    /// An event-stream frame grew past the buffer limit without a terminating blank line.
    #[error("event-stream frame exceeds {limit} bytes")]
    FrameTooLarge { limit: usize },
}
