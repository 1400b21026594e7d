//! HTTP transport: one request, one parsed JSON response, non-2xx classified as errors.

mod http;

pub use http::{ApiPath, HttpTransport, TransportError};
