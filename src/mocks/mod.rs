//! Mock implementations for testing.
//!
//! [`MockTransport`] stands in for the network: it answers from a queue of
//! canned responses and records every request it receives, so endpoint code
//! can be exercised without making real API calls.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::transport::{
    HttpMethod, HttpTransport, RequestDescriptor, ResponseEnvelope, TransportError,
};

/// Mock HTTP transport for testing.
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<MockResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    default_response: Mutex<Option<MockResponse>>,
}

/// A recorded request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Bytes>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

impl RecordedRequest {
    /// Looks up a header, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decodes the body as JSON, if there is one.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }

    /// Returns the body as UTF-8 text, if there is one.
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_deref()
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }
}

impl From<&RequestDescriptor> for RecordedRequest {
    fn from(request: &RequestDescriptor) -> Self {
        Self {
            method: request.method,
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
            timeout: request.timeout,
        }
    }
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

impl MockResponse {
    /// Creates a response with the given status, no headers and the given body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Creates a successful JSON response.
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self::new(200, body).with_header("content-type", "application/json")
    }

    /// Creates an error response in the API's error shape.
    pub fn error(status: u16, message: &str) -> Self {
        let error = serde_json::json!({
            "message": message,
            "type": "api_error"
        });
        let body = serde_json::to_vec(&error).unwrap_or_default();
        Self::new(status, body).with_header("content-type", "application/json")
    }

    /// Creates a response with an empty body.
    pub fn empty(status: u16) -> Self {
        Self::new(status, Bytes::new())
    }

    /// Creates a binary response.
    pub fn bytes(status: u16, content_type: &str, body: impl Into<Bytes>) -> Self {
        Self::new(status, body).with_header("content-type", content_type)
    }

    /// Creates a response with custom status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

impl From<MockResponse> for ResponseEnvelope {
    fn from(response: MockResponse) -> Self {
        ResponseEnvelope {
            status: response.status,
            headers: response.headers,
            body: response.body,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_response: Mutex::new(None),
        }
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        lock(&self.responses).push_back(Ok(response));
    }

    /// Queues a JSON response.
    pub fn queue_json<T: serde::Serialize + ?Sized>(&self, value: &T) {
        self.queue(MockResponse::json(value));
    }

    /// Queues an error response.
    pub fn queue_error(&self, status: u16, message: &str) {
        self.queue(MockResponse::error(status, message));
    }

    /// Queues a response with a raw status, headers and body.
    pub fn queue_status(&self, status: u16, headers: &[(&str, &str)], body: &str) {
        let response = headers
            .iter()
            .fold(MockResponse::new(status, body.to_string()), |response, (name, value)| {
                response.with_header(name, value)
            });
        self.queue(response);
    }

    /// Queues a network failure.
    pub fn queue_failure(&self, message: impl Into<String>) {
        lock(&self.responses).push_back(Err(TransportError::Connection {
            message: message.into(),
        }));
    }

    /// Queues a timeout.
    pub fn queue_timeout(&self, timeout: Duration) {
        lock(&self.responses).push_back(Err(TransportError::Timeout { timeout }));
    }

    /// Sets the response returned once the queue is empty.
    pub fn set_default(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Clears recorded requests.
    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn next_response(&self) -> Result<MockResponse, TransportError> {
        if let Some(next) = lock(&self.responses).pop_front() {
            return next;
        }
        Ok(lock(&self.default_response)
            .clone()
            .unwrap_or_else(|| MockResponse::error(500, "No mock response configured")))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<ResponseEnvelope, TransportError> {
        lock(&self.requests).push(RecordedRequest::from(&request));
        self.next_response().map(ResponseEnvelope::from)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("queued", &lock(&self.responses).len())
            .field("request_count", &self.request_count())
            .finish()
    }
}

/// Canned API payloads.
pub mod fixtures {
    use serde_json::{json, Value};

    /// An account object as returned by `GET /account`.
    pub fn account() -> Value {
        json!({
            "id": "awa6ltos76vz5hvphkp8k17nt",
            "object": "account",
            "account_id": "awa6ltos76vz5hvphkp8k17nt",
            "name": "Ben Bitdiddle",
            "email_address": "benbitdiddle@gmail.com",
            "provider": "gmail",
            "organization_unit": "label",
            "sync_state": "running",
            "linked_at": 1_470_231_381
        })
    }

    /// A short thread listing as returned by `GET /threads`.
    pub fn threads() -> Value {
        json!([
            {
                "id": "evh5uy0shhpm5d0le89goor17",
                "object": "thread",
                "account_id": "awa6ltos76vz5hvphkp8k17nt",
                "subject": "Dinner Party on Friday",
                "unread": false,
                "starred": false,
                "message_ids": ["251r594smznew6yhiocht2v29"]
            }
        ])
    }

    /// An error body in the API's error shape.
    pub fn error(error_type: &str, message: &str) -> Value {
        json!({
            "message": message,
            "type": error_type
        })
    }
}
