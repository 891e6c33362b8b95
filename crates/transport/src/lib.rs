//! HTTP transport abstraction for the LinkedIn clients
//!
//! The auth and API clients never talk to reqwest directly. They build an
//! `HttpRequest`, hand it to a `Transport`, and inspect only the returned
//! body. Status codes are carried through for logging but the clients
//! classify responses by their JSON content, the way the provider does.
//!
//! Connection failures, timeouts and unreadable bodies are reported as
//! `TransportError` so they can never be mistaken for an empty success.

#[cfg(any(test, feature = "test-util"))]
pub mod canned;
pub mod reqwest_transport;

#[cfg(any(test, feature = "test-util"))]
pub use canned::CannedTransport;
pub use reqwest_transport::ReqwestTransport;

pub use reqwest::Method;
pub use reqwest::header;
pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use std::future::Future;
use std::pin::Pin;

/// Errors raised before a response body could be obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid header value for {0}")]
    InvalidHeader(String),
}

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// An outbound request, fully formed by the caller.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Set a header, replacing any previous value for the same name.
    /// Values with control characters are rejected.
    pub fn header(mut self, name: HeaderName, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|_| TransportError::InvalidHeader(name.to_string()))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The raw response: status plus undecoded body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

/// Capability to send one HTTP request and return its body.
///
/// Uses `Pin<Box<dyn Future>>` return types so clients can hold an
/// `Arc<dyn Transport>` and share one connection pool between the auth and
/// API clients.
pub trait Transport: Send + Sync {
    /// Identifier for logging (e.g. "reqwest", "canned")
    fn id(&self) -> &str;

    /// Send the request and return the response body.
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>>;
}
