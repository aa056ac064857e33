//! Schema documents: a JSON Schema plus the UI layout consumed by the form renderer.
//!
//! [`FormSchema`] is the typed document the schema server reflects and serves.
//! [`SchemaDocument`] is what a form controller loads: its layout stays raw JSON so
//! renderer shorthands (`"*"`) and keys unknown to [`FormItem`] reach the renderer intact.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Form item rendering parameters.
///
/// Empty fields are omitted on the wire so a bare item is just `{"key": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormItem {
    /// Dotted path of the field (`user.firstName`, `neighbors[].age`).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,

    /// Widget type (`textarea`, `password`, `array`, `section`, ...).
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub form_type: String,

    /// Title override.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,

    /// Child items for arrays, sections and fieldsets.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<FormItem>,

    /// Renders the field read-only.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub readonly: bool,

    /// Text before the input.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub prepend: String,

    /// Text after the input.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub append: String,

    /// Hides the title.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub notitle: bool,

    /// CSS class of the item container.
    #[serde(rename = "htmlClass", skip_serializing_if = "String::is_empty")]
    pub html_class: String,

    /// Extra attributes of the item container.
    #[serde(rename = "htmlMetaData", skip_serializing_if = "BTreeMap::is_empty")]
    pub html_meta_data: BTreeMap<String, String>,

    /// CSS class of the input itself.
    #[serde(rename = "fieldHtmlClass", skip_serializing_if = "String::is_empty")]
    pub field_html_class: String,

    /// Input placeholder.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub placeholder: String,

    /// Inline title for checkboxes.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub inlinetitle: String,

    /// Title mapping for enum values.
    #[serde(rename = "titleMap", skip_serializing_if = "BTreeMap::is_empty")]
    pub title_map: BTreeMap<String, String>,

    /// Button mode for radio buttons.
    #[serde(rename = "activeClass", skip_serializing_if = "String::is_empty")]
    pub active_class: String,

    /// Content of `help` items.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub helpvalue: String,
}

impl FormItem {
    /// Creates an item for a field key.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Creates a keyless `section` grouping the given items.
    #[must_use]
    pub fn section(items: Vec<FormItem>) -> Self {
        Self {
            form_type: "section".to_string(),
            items,
            ..Self::default()
        }
    }
}

/// A JSON Schema together with its form layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    /// Form layout; empty means "render every schema property".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form: Vec<FormItem>,

    /// The JSON Schema of the form value.
    pub schema: Value,
}

impl FormSchema {
    /// Returns the schema title, if it has one.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.schema.get("title").and_then(Value::as_str)
    }

    /// Returns the layout as a JSON value.
    #[must_use]
    pub fn form_value(&self) -> Value {
        serde_json::to_value(&self.form).unwrap_or_else(|_| empty_form())
    }
}

/// A schema document as loaded by a form controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Form layout, passed to the renderer untouched.
    #[serde(default = "empty_form")]
    pub form: Value,

    /// The JSON Schema of the form value.
    pub schema: Value,
}

impl SchemaDocument {
    /// Returns the schema title, if it has one.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.schema.get("title").and_then(Value::as_str)
    }
}

impl Default for SchemaDocument {
    fn default() -> Self {
        Self {
            form: empty_form(),
            schema: Value::Null,
        }
    }
}

impl From<FormSchema> for SchemaDocument {
    fn from(schema: FormSchema) -> Self {
        Self {
            form: schema.form_value(),
            schema: schema.schema,
        }
    }
}

fn empty_form() -> Value {
    Value::Array(Vec::new())
}
