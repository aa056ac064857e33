//! Error types and result aliases for jsonform.
//!
//! [`Error`] is the general error shared by the server and the tooling.
//! [`ConfigError`] is the narrower error produced while resolving form parameters;
//! its messages are shown to end users, so they are kept short and stable.

/// The result type used throughout jsonform.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in jsonform operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// A named schema is already registered.
    #[error("schema for {name} ({type_name}) is already added")]
    DuplicateSchema {
        /// Registered schema name.
        name: String,
        /// Rust type the second registration came from.
        type_name: &'static str,
    },

    /// The requested resource was not found.
    #[error("not found: {resource_type} {id}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// Form configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a new serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a new resource not found error.
    #[must_use]
    pub fn resource_not_found(resource_type: &'static str, id: impl std::fmt::Display) -> Self {
        Self::ResourceNotFound {
            resource_type,
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// A form configuration problem.
///
/// Every variant halts initialization; the page has to be reloaded with corrected
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Neither an inline schema, a schema URL nor a schema name was given.
    #[error("Missing schemaName parameter in URL")]
    MissingSchema,

    /// No submit URL was given.
    #[error("Missing submitUrl parameter in URL")]
    MissingSubmitUrl,

    /// The destination form element is not bound or not present on the page.
    #[error("Missing destination form element, did you call setFormElement?")]
    MissingFormElement,

    /// The submit method is not a valid HTTP method token.
    #[error("Invalid submitMethod parameter: {0}")]
    InvalidSubmitMethod(String),

    /// The success status is not a number in `0..=999`.
    #[error("Invalid successStatus parameter: {0}")]
    InvalidSuccessStatus(String),
}
