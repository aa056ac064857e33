//! Schema server.
//!
//! Serves registered schemas and form pages under the configured prefix, plus a
//! health endpoint at the root. Applications can merge their own routes (the demo's
//! user CRUD, for instance) with [`ServerBuilder::routes`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::OriginalUri;
use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use jsonform_core::{Error, Result};

use crate::config::{Config, CorsConfig};
use crate::context::{REQUEST_ID_HEADER, request_id_middleware};
use crate::error::ApiError;
use crate::page::Page;
use crate::repository::Repository;

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
}

/// Shared application state for all request handlers.
#[derive(Debug)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Registered schemas.
    pub repository: Arc<Repository>,
    /// Chrome for the query-configured form page.
    pub page: Page,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn not_found(method: Method, uri: OriginalUri) -> ApiError {
    ApiError::not_found(format!("no route for {method} {}", uri.0.path()))
}

async fn method_not_allowed(method: Method, uri: OriginalUri) -> ApiError {
    ApiError::method_not_allowed(format!("{method} is not allowed on {}", uri.0.path()))
}

async fn handle_timeout_error(_err: tower::BoxError) -> ApiError {
    ApiError::service_unavailable("request timed out")
}

/// The schema server.
pub struct Server {
    config: Config,
    repository: Arc<Repository>,
    page: Page,
    routes: Router,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("repository", &self.repository)
            .field("page", &self.page)
            .field("routes", &"<Router>")
            .finish()
    }
}

impl Server {
    /// Creates a server with an empty repository honoring `config.strict`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let repository = Arc::new(Repository::with_strict(config.strict));
        Self {
            config,
            repository,
            page: Page::default(),
            routes: Router::new(),
        }
    }

    /// Creates a new `ServerBuilder`.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the schema repository.
    #[must_use]
    pub fn repository(&self) -> &Arc<Repository> {
        &self.repository
    }

    fn create_router(&self) -> Router {
        let state = Arc::new(AppState {
            config: self.config.clone(),
            repository: Arc::clone(&self.repository),
            page: self.page.clone(),
        });

        let prefixed = crate::routes::prefixed_routes().with_state(Arc::clone(&state));
        let prefix = state.config.prefix.trim_end_matches('/');

        let router = Router::new().route("/health", get(health));
        let router = if prefix.is_empty() {
            router.merge(prefixed)
        } else {
            router.nest(prefix, prefixed)
        };

        let router = router
            .merge(self.routes.clone())
            .method_not_allowed_fallback(method_not_allowed)
            .fallback(not_found)
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(self.build_cors_layer());

        match state.config.request_timeout {
            Some(timeout) => router.layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_timeout_error))
                    .layer(TimeoutLayer::new(timeout)),
            ),
            None => router,
        }
    }

    fn build_cors_layer(&self) -> CorsLayer {
        let cors_config = &self.config.cors;
        let cors = Self::build_cors_base(cors_config);
        Self::apply_cors_allowed_origins(cors, cors_config)
    }

    fn build_cors_base(cors_config: &CorsConfig) -> CorsLayer {
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::HEAD,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::HeaderName::from_static(REQUEST_ID_HEADER),
            ])
            .expose_headers([
                header::CONTENT_TYPE,
                header::CONTENT_LENGTH,
                header::HeaderName::from_static(REQUEST_ID_HEADER),
            ])
            .max_age(Duration::from_secs(cors_config.max_age_seconds))
    }

    fn apply_cors_allowed_origins(cors: CorsLayer, cors_config: &CorsConfig) -> CorsLayer {
        if cors_config.allowed_origins.is_empty() {
            return cors;
        }

        if cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*" {
            return cors.allow_origin(Any);
        }

        let mut allowed = Vec::new();
        for origin in &cors_config.allowed_origins {
            match HeaderValue::from_str(origin) {
                Ok(value) if origin != "*" => allowed.push(value),
                _ => tracing::error!(origin = %origin, "invalid CORS origin ignored"),
            }
        }

        if allowed.is_empty() {
            tracing::warn!("all configured CORS origins were invalid; disabling CORS");
            cors
        } else {
            tracing::info!(origins = ?cors_config.allowed_origins, "CORS configured");
            cors.allow_origin(AllowOrigin::list(allowed))
        }
    }

    /// Starts the server and blocks until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the port cannot be bound.
    pub async fn serve(&self) -> Result<()> {
        self.config.validate()?;

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let router = self.create_router();

        tracing::info!(
            http_port = self.config.http_port,
            prefix = %self.config.prefix,
            strict = self.config.strict,
            schemas = ?self.repository.names()?,
            "starting schema server"
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Internal {
                message: format!("failed to bind to {addr}: {e}"),
            })?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal {
                message: format!("server error: {e}"),
            })?;

        Ok(())
    }

    /// Creates the router without binding to a port.
    #[doc(hidden)]
    pub fn test_router(&self) -> Router {
        self.create_router()
    }
}

/// Builder for constructing a server.
#[derive(Default)]
pub struct ServerBuilder {
    config: Config,
    repository: Option<Arc<Repository>>,
    page: Page,
    routes: Router,
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("config", &self.config)
            .field("repository", &self.repository)
            .field("page", &self.page)
            .field("routes", &"<Router>")
            .finish()
    }
}

impl ServerBuilder {
    /// Creates a new server builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the HTTP port.
    #[must_use]
    pub fn http_port(mut self, port: u16) -> Self {
        self.config.http_port = port;
        self
    }

    /// Sets the path prefix; it is normalized to start and end with `/`.
    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.config.prefix = crate::config::normalize_prefix(prefix);
        self
    }

    /// Enables debug mode.
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Uses an existing repository; its strictness wins over the configuration.
    #[must_use]
    pub fn repository(mut self, repository: Arc<Repository>) -> Self {
        self.config.strict = repository.is_strict();
        self.repository = Some(repository);
        self
    }

    /// Sets the chrome of the query-configured form page.
    #[must_use]
    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    /// Merges application routes at the root.
    #[must_use]
    pub fn routes(mut self, routes: Router) -> Self {
        self.routes = self.routes.merge(routes);
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(Repository::with_strict(self.config.strict)));
        Server {
            config: self.config,
            repository,
            page: self.page,
            routes: self.routes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_is_served_outside_the_prefix() {
        let router = Server::new(Config::default()).test_router();
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn unknown_paths_are_json_not_found() {
        let router = Server::new(Config::default()).test_router();
        let response = router
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn root_prefix_mounts_without_nesting() {
        let router = Server::builder().prefix("/").build().test_router();
        let response = router
            .oneshot(Request::get("/schemas").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn builder_takes_strictness_from_repository() {
        let server = Server::builder()
            .repository(Arc::new(Repository::with_strict(true)))
            .build();
        assert!(server.config().strict);
        assert!(server.repository().is_strict());
    }

    #[test]
    fn router_builds_with_timeout_and_cors() {
        let mut config = Config::default();
        config.request_timeout = Some(Duration::from_secs(5));
        config.cors.allowed_origins = vec!["http://localhost:3000".to_string()];
        let _router = Server::builder().config(config).build().test_router();
    }
}
