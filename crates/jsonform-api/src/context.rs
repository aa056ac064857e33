//! Request context extraction and request-id middleware.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::header::HeaderName;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use ulid::Ulid;

/// Header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request context.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request ID for tracing/correlation; echoed from the client or generated.
    pub request_id: String,
}

impl RequestContext {
    fn from_headers(headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map_or_else(|| Ulid::new().to_string(), str::to_string);
        Self { request_id }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<Self>() {
            return Ok(existing.clone());
        }

        let ctx = Self::from_headers(&parts.headers);
        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

/// Request-id middleware.
///
/// Injects a [`RequestContext`] into request extensions and echoes its request ID on
/// the response.
pub async fn request_id_middleware(req: Request<Body>, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();
    let ctx = RequestContext::from_headers(&parts.headers);
    let request_id = ctx.request_id.clone();
    parts.extensions.insert(ctx);

    let mut response = next.run(Request::from_parts(parts, body)).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_is_echoed_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-42"));
        assert_eq!(RequestContext::from_headers(&headers).request_id, "req-42");
    }

    #[test]
    fn request_id_is_generated_when_missing() {
        let ctx = RequestContext::from_headers(&HeaderMap::new());
        assert!(ctx.request_id.parse::<Ulid>().is_ok());
    }
}
