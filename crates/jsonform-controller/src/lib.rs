//! # jsonform-controller
//!
//! Drives a single form from configuration to submission.
//!
//! A [`FormController`] resolves its configuration, fetches the schema document and the
//! initial value when they are not supplied inline, hands both to a [`FormRenderer`],
//! and submits the collected values, reporting the outcome into the page's result
//! sink.
//!
//! ## Collaborators
//!
//! Every side effect goes through an injected trait object:
//!
//! - [`Transport`] performs HTTP exchanges ([`ReqwestTransport`] in production)
//! - [`Page`] is the document the form lives in ([`MemoryPage`] for headless use)
//! - [`FormRenderer`] turns the schema into interactive UI
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jsonform_controller::{FormController, Handlers, MemoryPage, ReqwestTransport};
//!
//! let transport = Arc::new(ReqwestTransport::new(Some("http://localhost:8011/json-form/"))?);
//! let page = MemoryPage::standard("http://localhost:8011/json-form/form.html?schemaName=user&submitUrl=/users");
//! let mut form = FormController::new(transport, Box::new(page), Box::new(renderer));
//! form.configure_from_query(Handlers::default()).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod controller;
pub mod error;
pub mod handlers;
pub mod page;
pub mod renderer;
pub mod transport;

pub use controller::{FormController, SubmitOutcome};
pub use error::{FormError, TransportError};
pub use handlers::{
    FinishedHook, Handlers, HookContext, MessageHook, ResponseHook, ValuesHook,
};
pub use page::{Elements, MemoryPage, Page};
pub use renderer::{FormRenderer, RenderError, RenderRequest, ValidationError};
pub use transport::{HttpRequest, HttpResponse, JSON_CONTENT_TYPE, ReqwestTransport, Transport};
