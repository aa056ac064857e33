//! Schema repository.
//!
//! Reflects Rust types into [`FormSchema`] documents with `schemars` and serves them by
//! name. The layout is derived from the reflected properties:
//!
//! - nested objects are flattened into dot-joined keys (`user.firstName`)
//! - arrays of objects become an `array` item holding one `section` whose children are
//!   keyed `parent[].child`
//! - arrays of scalars and plain scalars become a bare `{"key": ...}` item
//!
//! Per-field layout overrides are read from an `x-jsonform` schema extension, which is
//! removed from the served schema:
//!
//! ```rust,ignore
//! #[derive(JsonSchema)]
//! struct User {
//!     #[schemars(extend("x-jsonform" = {"type": "textarea"}))]
//!     bio: String,
//! }
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use schemars::JsonSchema;
use schemars::generate::SchemaSettings;
use serde_json::{Map, Value};

use jsonform_core::{Error, FormItem, FormSchema, Result};

/// Schema extension carrying per-field [`FormItem`] overrides.
pub const LAYOUT_EXTENSION: &str = "x-jsonform";

fn poison_err<T>(_: PoisonError<T>) -> Error {
    Error::Internal {
        message: "schema repository lock poisoned".to_string(),
    }
}

#[derive(Debug, Default)]
struct Registry {
    schemas_by_name: HashMap<String, FormSchema>,
    names_by_type: HashMap<TypeId, String>,
}

impl Registry {
    fn insert<T: JsonSchema + 'static>(&mut self, name: String) -> Result<&FormSchema> {
        if self.schemas_by_name.contains_key(&name) {
            return Err(Error::DuplicateSchema {
                name,
                type_name: short_type_name::<T>(),
            });
        }

        let schema = reflect::<T>()?;
        tracing::debug!(name = %name, items = schema.form.len(), "schema added");

        self.names_by_type.insert(TypeId::of::<T>(), name.clone());
        Ok(self.schemas_by_name.entry(name).or_insert(schema))
    }
}

/// Named form schemas reflected from Rust types.
#[derive(Debug, Default)]
pub struct Repository {
    strict: bool,
    registry: RwLock<Registry>,
}

impl Repository {
    /// Creates an empty, non-strict repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository; a strict one only serves schemas added in advance.
    #[must_use]
    pub fn with_strict(strict: bool) -> Self {
        Self {
            strict,
            registry: RwLock::default(),
        }
    }

    /// Returns true if schemas must be added in advance.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Registers the schema of `T` under its default name and returns that name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSchema`] if the name is taken, or an error if the type
    /// cannot be reflected.
    pub fn add<T: JsonSchema + 'static>(&self) -> Result<String> {
        let name = self.name_of::<T>();
        self.add_named::<T>(name.clone())?;
        Ok(name)
    }

    /// Registers the schema of `T` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSchema`] if the name is taken, or an error if the type
    /// cannot be reflected.
    pub fn add_named<T: JsonSchema + 'static>(&self, name: impl Into<String>) -> Result<()> {
        let mut registry = self.registry.write().map_err(poison_err)?;
        registry.insert::<T>(name.into())?;
        Ok(())
    }

    /// Returns the name `T` is registered under, or its default name: the lower-cased
    /// schema name of the type.
    #[must_use]
    pub fn name_of<T: JsonSchema + 'static>(&self) -> String {
        let registered = self
            .registry
            .read()
            .ok()
            .and_then(|registry| registry.names_by_type.get(&TypeId::of::<T>()).cloned());
        registered.unwrap_or_else(|| T::schema_name().to_lowercase())
    }

    /// Returns the schema of `T`.
    ///
    /// A non-strict repository registers unknown types on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] for an unknown type in a strict repository.
    pub fn schema<T: JsonSchema + 'static>(&self) -> Result<FormSchema> {
        let name = self.name_of::<T>();
        if let Some(schema) = self.schema_by_name(&name)? {
            return Ok(schema);
        }
        if self.strict {
            return Err(Error::resource_not_found("schema", name));
        }

        let mut registry = self.registry.write().map_err(poison_err)?;
        if let Some(schema) = registry
            .names_by_type
            .get(&TypeId::of::<T>())
            .and_then(|registered| registry.schemas_by_name.get(registered))
        {
            return Ok(schema.clone());
        }
        registry.insert::<T>(name).cloned()
    }

    /// Returns a registered schema by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry lock is poisoned.
    pub fn schema_by_name(&self, name: &str) -> Result<Option<FormSchema>> {
        let registry = self.registry.read().map_err(poison_err)?;
        Ok(registry.schemas_by_name.get(name).cloned())
    }

    /// Returns registered names, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry lock is poisoned.
    pub fn names(&self) -> Result<Vec<String>> {
        let registry = self.registry.read().map_err(poison_err)?;
        let mut names: Vec<String> = registry.schemas_by_name.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

/// Reflects `T` into a schema document.
///
/// # Errors
///
/// Returns an error if an `x-jsonform` extension is not a valid form item.
pub fn reflect<T: JsonSchema>() -> Result<FormSchema> {
    let mut settings = SchemaSettings::draft07();
    settings.inline_subschemas = true;
    settings.meta_schema = None;

    let mut schema = settings.into_generator().into_root_schema_for::<T>().to_value();

    let form = match schema.get_mut("properties").and_then(Value::as_object_mut) {
        Some(properties) => layout(properties, "")?,
        None => Vec::new(),
    };
    required_to_properties(&mut schema);

    Ok(FormSchema { form, schema })
}

fn layout(properties: &mut Map<String, Value>, prefix: &str) -> Result<Vec<FormItem>> {
    let mut items = Vec::new();

    for (name, property) in properties.iter_mut() {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };

        let overrides = take_overrides(property, &key)?;
        let property = non_null_variant(property);

        if has_type(property, "object") {
            if let Some(children) = property.get_mut("properties").and_then(Value::as_object_mut) {
                items.extend(layout(children, &key)?);
            }
            continue;
        }

        let mut item = overrides.unwrap_or_default();
        item.key.clone_from(&key);

        if has_type(property, "array") {
            let children = property
                .get_mut("items")
                .map(non_null_variant)
                .and_then(|items| items.get_mut("properties"))
                .and_then(Value::as_object_mut);
            if let Some(children) = children {
                item.form_type = "array".to_string();
                item.items = vec![FormItem::section(layout(children, &format!("{key}[]"))?)];
            }
        }

        items.push(item);
    }

    Ok(items)
}

fn take_overrides(property: &mut Value, key: &str) -> Result<Option<FormItem>> {
    let Some(raw) = property
        .as_object_mut()
        .and_then(|object| object.remove(LAYOUT_EXTENSION))
    else {
        return Ok(None);
    };
    serde_json::from_value(raw)
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("invalid {LAYOUT_EXTENSION} for {key}: {e}")))
}

/// Unwraps `anyOf: [X, {"type": "null"}]`, the shape `Option<X>` reflects to.
fn non_null_variant(schema: &mut Value) -> &mut Value {
    let index = schema
        .get("anyOf")
        .and_then(Value::as_array)
        .and_then(|variants| {
            let mut non_null = variants
                .iter()
                .enumerate()
                .filter(|(_, variant)| variant.get("type") != Some(&Value::from("null")));
            match (non_null.next(), non_null.next()) {
                (Some((index, _)), None) => Some(index),
                _ => None,
            }
        });

    match index {
        Some(index) => &mut schema["anyOf"][index],
        None => schema,
    }
}

fn has_type(schema: &Value, expected: &str) -> bool {
    match schema.get("type") {
        Some(Value::String(t)) => t == expected,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(expected)),
        _ => false,
    }
}

/// Moves the root `required` list onto the properties as `"required": true`, the
/// Draft 3 form the renderer understands. Object properties keep their own
/// `required` list.
fn required_to_properties(schema: &mut Value) {
    let Some(root) = schema.as_object_mut() else {
        return;
    };
    let Some(Value::Array(required)) = root.remove("required") else {
        return;
    };
    let Some(properties) = root.get_mut("properties").and_then(Value::as_object_mut) else {
        return;
    };

    for name in required.iter().filter_map(Value::as_str) {
        if let Some(Value::Object(property)) = properties.get_mut(name) {
            property
                .entry("required")
                .or_insert(Value::Bool(true));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Serialize, Deserialize, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    struct Contact {
        email: String,
        #[schemars(extend("x-jsonform" = {"type": "textarea", "placeholder": "Anything else?"}))]
        notes: Option<String>,
    }

    #[derive(Serialize, Deserialize, JsonSchema)]
    struct Tagged {
        tags: Vec<String>,
    }

    #[test]
    fn extension_overrides_layout_and_is_removed() {
        let schema = reflect::<Contact>().unwrap();
        assert_eq!(
            serde_json::to_value(&schema.form).unwrap(),
            json!([
                {"key": "email"},
                {"key": "notes", "type": "textarea", "placeholder": "Anything else?"}
            ])
        );
        assert!(schema.schema["properties"]["notes"].get(LAYOUT_EXTENSION).is_none());
    }

    #[test]
    fn root_required_moves_onto_properties() {
        let schema = reflect::<Contact>().unwrap();
        assert!(schema.schema.get("required").is_none());
        assert_eq!(schema.schema["properties"]["email"]["required"], json!(true));
        assert!(schema.schema["properties"]["notes"].get("required").is_none());
        assert!(schema.schema.get("$schema").is_none());
    }

    #[test]
    fn scalar_arrays_are_plain_keys() {
        let schema = reflect::<Tagged>().unwrap();
        assert_eq!(schema.form, vec![FormItem::key("tags")]);
    }

    #[test]
    fn default_name_is_lowercased_type_name() {
        let repo = Repository::new();
        assert_eq!(repo.name_of::<Contact>(), "contact");
        assert_eq!(repo.add::<Contact>().unwrap(), "contact");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let repo = Repository::new();
        repo.add_named::<Contact>("person").unwrap();
        let err = repo.add_named::<Tagged>("person").unwrap_err();
        assert_eq!(err.to_string(), "schema for person (Tagged) is already added");
        assert_eq!(repo.names().unwrap(), ["person"]);
    }

    #[test]
    fn registered_name_is_used_for_type_lookups() {
        let repo = Repository::new();
        repo.add_named::<Contact>("person").unwrap();
        assert_eq!(repo.name_of::<Contact>(), "person");
        assert!(repo.schema::<Contact>().is_ok());
        assert_eq!(repo.names().unwrap(), ["person"]);
    }

    #[test]
    fn strict_repository_does_not_add_on_lookup() {
        let strict = Repository::with_strict(true);
        assert!(matches!(
            strict.schema::<Tagged>(),
            Err(Error::ResourceNotFound { .. })
        ));

        let lenient = Repository::new();
        assert!(lenient.schema::<Tagged>().is_ok());
        assert_eq!(lenient.names().unwrap(), ["tagged"]);
    }

    #[test]
    fn concurrent_first_lookups_share_one_registration() {
        let repo = std::sync::Arc::new(Repository::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = std::sync::Arc::clone(&repo);
                std::thread::spawn(move || repo.schema::<Contact>())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert_eq!(repo.names().unwrap(), ["contact"]);
    }

    #[test]
    fn lookup_after_registration_reuses_the_entry() {
        let repo = Repository::new();
        let first = repo.schema::<Contact>().unwrap();
        let second = repo.schema::<Contact>().unwrap();
        assert_eq!(first, second);
        assert_eq!(repo.names().unwrap(), ["contact"]);
    }

    #[test]
    fn unknown_names_are_absent() {
        let repo = Repository::new();
        assert_eq!(repo.schema_by_name("nope").unwrap(), None);
    }
}
