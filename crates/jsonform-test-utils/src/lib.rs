//! Shared test utilities for jsonform crates.
//!
//! This crate provides:
//! - [`StubTransport`]: scripted HTTP responses with request recording
//! - [`RecordingRenderer`]: a form renderer that records what it was asked to render
//! - [`spawn_server`]: runs an axum router on an ephemeral port
//! - Fixture builders and assertion helpers for forms
//!
//! # Example
//!
//! ```rust,ignore
//! use jsonform_test_utils::{StubTransport, RecordingRenderer, user_schema};
//!
//! #[tokio::test]
//! async fn renders_inline_schema() {
//!     let transport = StubTransport::new();
//!     let renderer = RecordingRenderer::new();
//!     // ... build a FormController over them ...
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
// Test utilities use expect/unwrap for cleaner test code - panics are acceptable in tests
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

pub mod assertions;
pub mod fixtures;
pub mod renderer;
pub mod server;
pub mod transport;

pub use assertions::*;
pub use fixtures::*;
pub use renderer::*;
pub use server::*;
pub use transport::*;

/// Initialize test logging (call once per test module).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("jsonform=debug".parse().expect("valid directive")),
        )
        .with_test_writer()
        .try_init();
}
