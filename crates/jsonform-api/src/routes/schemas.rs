//! Schema routes.
//!
//! ## Routes
//!
//! - `GET {prefix}{name}-schema.json` - Schema document by name
//! - `GET {prefix}schemas` - Registered schema names

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use jsonform_core::FormSchema;
use jsonform_core::params::SCHEMA_URL_SUFFIX;

use crate::context::RequestContext;
use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

/// Registered schema names.
#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaListResponse {
    /// Names, sorted.
    pub names: Vec<String>,
}

/// Creates schema routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/schemas", get(list_schemas))
        .route("/:file", get(get_schema))
}

/// Lists registered schema names.
pub(crate) async fn list_schemas(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SchemaListResponse>> {
    let names = state
        .repository
        .names()
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(SchemaListResponse { names }))
}

/// Returns the schema document named by `<name>-schema.json`.
pub(crate) async fn get_schema(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> ApiResult<Json<FormSchema>> {
    let not_found = || {
        ApiError::not_found(format!("schema not found: {file}"))
            .with_request_id(ctx.request_id.clone())
    };

    let Some(name) = file.strip_suffix(SCHEMA_URL_SUFFIX) else {
        return Err(not_found());
    };

    let schema = state
        .repository
        .schema_by_name(name)
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;

    match schema {
        Some(schema) => {
            tracing::debug!(name, request_id = %ctx.request_id, "serving schema");
            Ok(Json(schema))
        }
        None => Err(not_found()),
    }
}
