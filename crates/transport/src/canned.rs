//! Canned-response transport for tests
//!
//! Responses are served in FIFO order and every request is recorded so
//! tests can assert on the exact URL, headers and body that were sent.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use crate::{HttpRequest, HttpResponse, Result, Transport, TransportError};

#[derive(Debug, Default)]
pub struct CannedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl CannedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with the given body.
    pub fn with_body(self, body: impl Into<String>) -> Self {
        self.push(Ok(HttpResponse::ok(body)));
        self
    }

    /// Queue a transport failure.
    pub fn with_error(self, err: TransportError) -> Self {
        self.push(Err(err));
        self
    }

    pub fn push(&self, response: Result<HttpResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// All requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for CannedTransport {
    fn id(&self) -> &str {
        "canned"
    }

    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>> {
        self.requests.lock().unwrap().push(request);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no canned response queued".into())));
        Box::pin(async move { next })
    }
}
