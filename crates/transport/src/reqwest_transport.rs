//! reqwest-backed transport
//!
//! Sends the request as built, reads the whole body as text, and maps
//! reqwest failures onto `TransportError`. No retry and no timeout policy
//! beyond whatever the supplied `reqwest::Client` was built with.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, warn};

use crate::{HttpRequest, HttpResponse, Result, Transport, TransportError};

/// Default transport over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxy, custom TLS roots, timeouts).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(err.to_string())
    }
}

impl Transport for ReqwestTransport {
    fn id(&self) -> &str {
        "reqwest"
    }

    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>> {
        Box::pin(async move {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;

            let mut builder = self.client.request(method.clone(), &url).headers(headers);
            if let Some(body) = body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                warn!(%method, error = %e, "transport request failed");
                classify(e)
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?;

            debug!(%method, status, bytes = body.len(), "transport response received");
            Ok(HttpResponse { status, body })
        })
    }
}
