//! The form renderer seam.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything a renderer needs to build the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRequest {
    /// JSON Schema of the value.
    pub schema: Value,
    /// Form layout.
    pub form: Value,
    /// Initial value, when one was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A per-field validation error reported by a renderer on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field key.
    pub key: String,
    /// Human readable message.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error.
    #[must_use]
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// The renderer refused to build the form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RenderError(pub String);

/// Turns a schema document and value into an interactive form.
///
/// The renderer owns value collection and field validation. When the user submits,
/// the host passes the collected values and any validation errors to
/// [`crate::FormController::on_submit`].
pub trait FormRenderer: Send {
    /// Builds the form inside the element matching `element`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be rendered.
    fn render(&mut self, element: &str, request: RenderRequest) -> Result<(), RenderError>;
}
