//! # jsonform-core
//!
//! Pure building blocks shared by every jsonform component.
//!
//! This crate provides:
//!
//! - **Form parameters**: the flat configuration a form is built from, and its
//!   validated ([`ResolvedParams`]) form
//! - **Query strings**: parsing a page query string into configuration
//! - **Schema documents**: [`FormSchema`] and [`FormItem`] as served by the schema server
//! - **Status rules**: the submit success decision ([`SuccessStatus`])
//! - **Diagnostics**: the user-facing messages for load and submit failures
//! - **Error Types**: shared error definitions and result types
//!
//! ## Crate Boundary
//!
//! Nothing in this crate performs I/O. Fetching, rendering and page binding live in
//! `jsonform-controller`; serving schemas lives in `jsonform-api`.
//!
//! ## Example
//!
//! ```rust
//! use jsonform_core::prelude::*;
//!
//! let query = parse_query("schemaName=user&submitUrl=%2Fusers");
//! let params = FormParams::from_query(&query);
//! let resolved = params.resolve().expect("valid configuration");
//!
//! assert_eq!(resolved.submit_url, "/users");
//! assert_eq!(resolved.success_status, SuccessStatus::default());
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod diagnostics;
pub mod error;
pub mod observability;
pub mod params;
pub mod query;
pub mod schema;
pub mod status;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ConfigError, Error, Result};
    pub use crate::params::{FormParams, ResolvedParams, SchemaSource, ValueSource};
    pub use crate::query::{QueryParams, parse_query};
    pub use crate::schema::{FormItem, FormSchema, SchemaDocument};
    pub use crate::status::{StatusCheck, SuccessStatus};
}

pub use error::{ConfigError, Error, Result};
pub use observability::{LogFormat, init_logging, init_logging_with};
pub use params::{FormParams, ResolvedParams, SchemaSource, ValueSource};
pub use query::{QueryParams, parse_query};
pub use schema::{FormItem, FormSchema, SchemaDocument};
pub use status::{StatusCheck, SuccessStatus};
