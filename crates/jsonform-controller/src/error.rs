//! Controller error types.

use jsonform_core::{ConfigError, SuccessStatus};

/// Errors returned by [`crate::FormController`] operations.
///
/// By the time one of these is returned it has already been reported to the user
/// through the error handler, except [`FormError::UnexpectedStatus`], which is what a
/// submit surfaces when no fail handler is installed.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A schema or value fetch returned a non-success status.
    #[error("failed to load {what} from {url}: status {status}")]
    Load {
        /// `schema` or `value`.
        what: &'static str,
        /// URL that was fetched.
        url: String,
        /// Response status.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A fetched document could not be parsed.
    #[error("invalid {what} document from {url}: {message}")]
    InvalidDocument {
        /// `schema` or `value`.
        what: &'static str,
        /// URL that was fetched.
        url: String,
        /// Parser message.
        message: String,
    },

    /// No HTTP response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A submit response did not match the expected status and no fail handler exists.
    #[error("unexpected response status {actual} from {url}, expected {expected}")]
    UnexpectedStatus {
        /// Submit URL.
        url: String,
        /// Expected status.
        expected: SuccessStatus,
        /// Actual status.
        actual: u16,
        /// Raw response body.
        body: String,
    },

    /// The form renderer rejected the schema document.
    #[error("failed to render form: {0}")]
    Render(String),
}

/// Errors raised by a [`crate::Transport`] when no response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The URL could not be resolved to an absolute URL.
    #[error("invalid URL {url}: {message}")]
    InvalidUrl {
        /// URL as configured.
        url: String,
        /// Description of the problem.
        message: String,
    },

    /// The request could not be completed.
    #[error("request to {url} failed: {message}")]
    Request {
        /// Absolute request URL.
        url: String,
        /// Description of the failure.
        message: String,
    },
}
