//! Form page route.
//!
//! `GET {prefix}form.html?<query>` serves a page hosting one form configured by the
//! query string.

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::routing::get;
use axum::Router;
use maud::Markup;

use jsonform_core::parse_query;

use crate::context::RequestContext;
use crate::error::{ApiError, ApiResult};
use crate::page::render_query_page;
use crate::server::AppState;

/// Creates form page routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/form.html", get(form_page))
}

async fn form_page(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> ApiResult<Markup> {
    let params = parse_query(query.as_deref().unwrap_or_default());
    render_query_page(&state.page, &params)
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id))
}
