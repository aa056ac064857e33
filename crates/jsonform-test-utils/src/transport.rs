//! Scripted transport with request recording.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::Method;
use serde_json::Value;

use jsonform_controller::{HttpRequest, HttpResponse, Transport, TransportError};

/// In-memory [`Transport`] returning scripted responses.
///
/// Responses are keyed by method and URL exactly as the controller sends them. Requests
/// without a scripted response get a `404` with an empty body. Every request is recorded,
/// scripted or not.
#[derive(Debug, Clone, Default)]
pub struct StubTransport {
    responses: Arc<Mutex<HashMap<(Method, String), Scripted>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Response(HttpResponse),
    Failure(String),
}

impl StubTransport {
    /// Creates a transport with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a response for `method url`.
    #[must_use]
    pub fn respond(self, method: Method, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.responses.lock().expect("lock").insert(
            (method, url.into()),
            Scripted::Response(HttpResponse {
                status,
                body: body.into(),
            }),
        );
        self
    }

    /// Scripts a `200` JSON response for `GET url`.
    #[must_use]
    pub fn respond_json(self, url: impl Into<String>, body: &Value) -> Self {
        self.respond(Method::GET, url, 200, body.to_string())
    }

    /// Scripts a transport failure (no response at all) for `method url`.
    #[must_use]
    pub fn fail(self, method: Method, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .expect("lock")
            .insert((method, url.into()), Scripted::Failure(message.into()));
        self
    }

    /// Returns all recorded requests in send order.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("lock").clone()
    }

    /// Returns the number of recorded requests.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("lock").len()
    }

    /// Returns `METHOD url` for every recorded request.
    #[must_use]
    pub fn request_lines(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("lock")
            .iter()
            .map(|r| format!("{} {}", r.method, r.url))
            .collect()
    }

    /// Clears recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().expect("lock").clear();
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = (request.method.clone(), request.url.clone());
        self.requests.lock().expect("lock").push(request);

        let scripted = self.responses.lock().expect("lock").get(&key).cloned();
        match scripted {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Failure(message)) => Err(TransportError::Request { url: key.1, message }),
            None => {
                tracing::debug!(method = %key.0, url = %key.1, "no scripted response");
                Ok(HttpResponse {
                    status: 404,
                    body: String::new(),
                })
            }
        }
    }
}
