//! Terminal form renderer.
//!
//! Prints the form layout instead of building widgets, and validates submitted values
//! against the required fields of the last rendered schema.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};

use jsonform_controller::{FormRenderer, RenderError, RenderRequest, ValidationError};

/// [`FormRenderer`] for headless use.
///
/// Clones share the rendered document, so the caller can validate values after the
/// controller took ownership of its copy.
#[derive(Debug, Clone, Default)]
pub struct TerminalRenderer {
    rendered: Arc<Mutex<Option<RenderRequest>>>,
    quiet: bool,
}

impl TerminalRenderer {
    /// Creates a renderer that prints the layout to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer that prints nothing.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    /// The last rendered document.
    #[must_use]
    pub fn rendered(&self) -> Option<RenderRequest> {
        self.rendered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Checks `values` against the required fields of the rendered schema.
    ///
    /// Nothing is required before a document was rendered.
    #[must_use]
    pub fn validate(&self, values: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(request) = self.rendered() {
            required_errors(&request.schema, values, "", &mut errors);
        }
        errors
    }
}

impl FormRenderer for TerminalRenderer {
    fn render(&mut self, element: &str, request: RenderRequest) -> Result<(), RenderError> {
        if !request.schema.is_object() {
            return Err(RenderError("schema is not an object".to_string()));
        }

        if !self.quiet {
            for line in describe(&request) {
                println!("{line}");
            }
        }
        tracing::debug!(element, "form rendered");

        *self
            .rendered
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(request);
        Ok(())
    }
}

/// One line per top-level form item: key, title and a `*` for required fields.
#[must_use]
pub fn describe(request: &RenderRequest) -> Vec<String> {
    let properties = request.schema.get("properties").and_then(Value::as_object);
    let mut lines = Vec::new();

    if let Some(title) = request.schema.get("title").and_then(Value::as_str) {
        lines.push(format!("# {title}"));
    }

    for item in request.form.as_array().into_iter().flatten() {
        let Some(key) = item.get("key").and_then(Value::as_str) else {
            continue;
        };
        let property = properties.and_then(|p| lookup(p, key));
        let title = property
            .and_then(|p| p.get("title"))
            .and_then(Value::as_str)
            .unwrap_or(key);
        let required = property.is_some_and(|p| p.get("required") == Some(&Value::Bool(true)));
        let marker = if required { " *" } else { "" };
        lines.push(format!("  {key}: {title}{marker}"));
    }

    lines
}

/// Resolves a dot-joined key (`user.firstName`) to its property schema.
fn lookup<'a>(properties: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut current = properties.get(parts.next()?)?;
    for part in parts {
        current = current.get("properties")?.get(part)?;
    }
    Some(current)
}

/// Collects errors for missing required fields.
///
/// Both the Draft 3 `"required": true` flag on a property and the Draft 4 `required`
/// list on an object are honored.
fn required_errors(schema: &Value, value: &Value, prefix: &str, errors: &mut Vec<ValidationError>) {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };
    let listed: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    for (name, property) in properties {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        let field = value.get(name);
        let required = property.get("required") == Some(&Value::Bool(true))
            || listed.contains(&name.as_str());

        if required && is_blank(field) {
            let title = property
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or(name);
            errors.push(ValidationError::new(key, format!("{title} is required")));
            continue;
        }

        if let Some(field) = field.filter(|f| f.is_object()) {
            required_errors(property, field, &key, errors);
        }
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}
