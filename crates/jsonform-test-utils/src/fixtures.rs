//! Pre-built fixtures for form tests.
//!
//! Provides factory functions for schema documents, pages and controllers.

use std::sync::Arc;

use serde_json::{Value, json};

use jsonform_controller::{FormController, MemoryPage};
use jsonform_core::{FormItem, FormSchema};

use crate::renderer::RecordingRenderer;
use crate::transport::StubTransport;

/// Location the demo form page is served at.
pub const FORM_PAGE_URL: &str = "http://localhost:8011/json-form/form.html";

/// Schema document for a user record, titled `User`.
#[must_use]
pub fn user_schema() -> FormSchema {
    FormSchema {
        form: vec![
            FormItem::key("firstName"),
            FormItem::key("lastName"),
            FormItem::key("locale"),
        ],
        schema: user_json_schema(),
    }
}

/// JSON Schema of a user record.
#[must_use]
pub fn user_json_schema() -> Value {
    json!({
        "title": "User",
        "type": "object",
        "properties": {
            "firstName": {"type": "string", "title": "First name", "required": true},
            "lastName": {"type": "string", "title": "Last name"},
            "locale": {"type": "string", "enum": ["en-US", "ru-RU"]}
        }
    })
}

/// A user record matching [`user_schema`].
#[must_use]
pub fn user_value() -> Value {
    json!({"firstName": "John", "lastName": "Doe", "locale": "en-US"})
}

/// Standard form page with `query` as its query string.
#[must_use]
pub fn form_page(query: &str) -> MemoryPage {
    if query.is_empty() {
        MemoryPage::standard(FORM_PAGE_URL)
    } else {
        MemoryPage::standard(format!("{FORM_PAGE_URL}?{query}"))
    }
}

/// Controller over a stub transport, a recording renderer and `page`.
///
/// Returns the transport and renderer handles alongside the controller.
#[must_use]
pub fn form_controller(
    transport: StubTransport,
    page: MemoryPage,
) -> (FormController, StubTransport, RecordingRenderer) {
    let renderer = RecordingRenderer::new();
    let controller = FormController::new(
        Arc::new(transport.clone()),
        Box::new(page),
        Box::new(renderer.clone()),
    );
    (controller, transport, renderer)
}
