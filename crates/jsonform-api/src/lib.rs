//! # jsonform-api
//!
//! HTTP schema server for JSON forms.
//!
//! Rust types deriving [`schemars::JsonSchema`] are reflected into form schemas by the
//! [`repository::Repository`] and served by name, so that a form controller can fetch
//! them with nothing more than a `schemaName` parameter.
//!
//! ## Endpoints
//!
//! ```text
//! GET  /health                      - Health check
//! GET  {prefix}{name}-schema.json   - Schema document
//! GET  {prefix}schemas              - Registered schema names
//! GET  {prefix}form.html?<params>   - Form page configured by query string
//! ```
//!
//! The prefix defaults to `/json-form/`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use jsonform_api::prelude::*;
//!
//! let server = Server::builder().http_port(8011).build();
//! server.repository().add_named::<User>("user")?;
//! server.serve().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod context;
pub mod error;
pub mod page;
pub mod repository;
pub mod routes;
pub mod server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::context::RequestContext;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::page::{Form, Page, render_page};
    pub use crate::repository::Repository;
    pub use crate::server::Server;
}
