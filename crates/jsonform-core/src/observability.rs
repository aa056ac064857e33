//! Logging setup and the form span.
//!
//! Binaries install a subscriber once at startup. The controller wraps each render and
//! submit in a [`form_span`] so fetches and submits log under the schema they belong to.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Filter used by servers when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// How log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Multi-line, human readable.
    #[default]
    Pretty,
    /// Single line without targets, for terminal tools.
    Compact,
}

/// Installs the global subscriber with [`DEFAULT_FILTER`].
///
/// Only the first call in a process has an effect.
///
/// ```rust
/// use jsonform_core::observability::{init_logging, LogFormat};
///
/// init_logging(LogFormat::Pretty);
/// ```
pub fn init_logging(format: LogFormat) {
    init_logging_with(format, DEFAULT_FILTER);
}

/// Installs the global subscriber; `RUST_LOG` overrides `default_filter`.
///
/// An unparsable `default_filter` falls back to [`DEFAULT_FILTER`].
pub fn init_logging_with(format: LogFormat, default_filter: &str) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let registry = tracing_subscriber::registry().with(env_filter);

        match format {
            LogFormat::Json => registry.with(fmt::layer().json()).init(),
            LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
            LogFormat::Compact => registry
                .with(fmt::layer().compact().with_target(false))
                .init(),
        }
    });
}

/// Span for one controller operation (`render`, `submit`) on a schema.
///
/// `schema` is the schema name, or `inline` for a schema passed with the parameters.
#[must_use]
pub fn form_span(operation: &str, schema: &str, submit_url: &str) -> Span {
    tracing::info_span!("form", op = operation, schema, submit_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_ignored() {
        init_logging_with(LogFormat::Compact, "jsonform=debug");
        init_logging(LogFormat::Json);
    }

    #[test]
    fn form_span_carries_operation_fields() {
        let span = form_span("submit", "user", "/users");
        let _entered = span.enter();
        tracing::debug!("inside form span");
    }
}
