//! HTTP route handlers.

pub mod form;
pub mod schemas;

use std::sync::Arc;

use axum::Router;

use crate::server::AppState;

/// Routes mounted under the configured prefix.
pub fn prefixed_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(schemas::routes())
        .merge(form::routes())
}
