//! HTTP transport used for schema, value and submit exchanges.

use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::error::TransportError;

/// Content type sent with JSON request bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A single outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, or a URL relative to the transport's base.
    pub url: String,
    /// JSON body, sent with [`JSON_CONTENT_TYPE`].
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Creates a body-less `GET`.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: None,
        }
    }

    /// Creates a request carrying a JSON body.
    #[must_use]
    pub fn json(method: Method, url: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            url: url.into(),
            body: Some(body),
        }
    }
}

/// A completed exchange: any status, including error statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response status code.
    pub status: u16,
    /// Raw response text.
    pub body: String,
}

/// Performs HTTP exchanges for the controller.
///
/// Implementations return `Ok` for every response that arrived, whatever its status;
/// `Err` means there is no response at all.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and waits for the complete response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
///
/// Relative URLs are resolved against the base URL the same way a browser resolves them
/// against the page location. No timeout is applied unless one is configured.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl ReqwestTransport {
    /// Creates a transport with an optional base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute URL.
    pub fn new(base_url: Option<&str>) -> Result<Self, TransportError> {
        Self::build(base_url, None)
    }

    /// Creates a transport that gives up on requests after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute URL or the client cannot be
    /// constructed.
    pub fn with_timeout(base_url: Option<&str>, timeout: Duration) -> Result<Self, TransportError> {
        Self::build(base_url, Some(timeout))
    }

    fn build(base_url: Option<&str>, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let base_url = base_url
            .map(|raw| {
                Url::parse(raw).map_err(|e| TransportError::InvalidUrl {
                    url: raw.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| TransportError::Request {
            url: base_url.as_ref().map(Url::to_string).unwrap_or_default(),
            message: format!("failed to create HTTP client: {e}"),
        })?;

        Ok(Self { client, base_url })
    }

    /// Resolves a possibly relative URL against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is relative and there is no base, or if it cannot
    /// be joined.
    pub fn resolve(&self, url: &str) -> Result<Url, TransportError> {
        let invalid = |message: String| TransportError::InvalidUrl {
            url: url.to_string(),
            message,
        };

        if let Ok(absolute) = Url::parse(url) {
            return Ok(absolute);
        }
        match &self.base_url {
            Some(base) => base.join(url).map_err(|e| invalid(e.to_string())),
            None => Err(invalid("relative URL without a base URL".to_string())),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.resolve(&request.url)?;
        let failed = |message: String| TransportError::Request {
            url: url.to_string(),
            message,
        };

        let mut builder = self.client.request(request.method.clone(), url.clone());
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(|e| failed(e.to_string()))?;
            builder = builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(bytes);
        }

        let response = builder.send().await.map_err(|e| failed(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| failed(e.to_string()))?;

        tracing::debug!(
            method = %request.method,
            url = %url,
            status,
            "request finished"
        );

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, put};
    use serde_json::json;

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/forms/user-schema.json", get(|| async { "{\"schema\":{}}" }))
            .route(
                "/user/1.json",
                put(|headers: HeaderMap, body: String| async move {
                    let content_type = headers
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    (StatusCode::ACCEPTED, format!("{content_type}|{body}"))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        format!("http://{addr}")
    }

    #[test]
    fn relative_urls_resolve_like_a_browser() {
        let transport =
            ReqwestTransport::new(Some("http://localhost:8011/json-form/form.html")).unwrap();
        assert_eq!(
            transport.resolve("user-schema.json").unwrap().as_str(),
            "http://localhost:8011/json-form/user-schema.json"
        );
        assert_eq!(
            transport.resolve("/users").unwrap().as_str(),
            "http://localhost:8011/users"
        );
        assert_eq!(
            transport.resolve("https://example.com/x").unwrap().as_str(),
            "https://example.com/x"
        );
    }

    #[test]
    fn relative_url_without_base_is_rejected() {
        let transport = ReqwestTransport::new(None).unwrap();
        assert!(matches!(
            transport.resolve("user-schema.json"),
            Err(TransportError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn get_returns_body_and_status() {
        let base = spawn_server().await;
        let transport = ReqwestTransport::new(Some(&format!("{base}/forms/"))).unwrap();

        let response = transport
            .send(HttpRequest::get("user-schema.json"))
            .await
            .expect("response");
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "{\"schema\":{}}");
    }

    #[tokio::test]
    async fn json_body_is_sent_with_content_type() {
        let base = spawn_server().await;
        let transport = ReqwestTransport::new(Some(&base)).unwrap();

        let response = transport
            .send(HttpRequest::json(
                Method::PUT,
                "/user/1.json",
                json!({"firstName": "John"}),
            ))
            .await
            .expect("response");
        assert_eq!(response.status, 202);
        assert_eq!(
            response.body,
            "application/json; charset=utf-8|{\"firstName\":\"John\"}"
        );
    }

    #[tokio::test]
    async fn error_statuses_are_responses_not_errors() {
        let base = spawn_server().await;
        let transport = ReqwestTransport::new(Some(&base)).unwrap();

        let response = transport
            .send(HttpRequest::get("/missing"))
            .await
            .expect("response");
        assert_eq!(response.status, 404);
    }
}
