//! Form parameters and their resolution.
//!
//! [`FormParams`] is the flat, loosely-typed configuration a form is described by,
//! either parsed from a page query string or supplied by the caller. [`FormParams::resolve`]
//! validates it into [`ResolvedParams`], which is what the controller works with.

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::query::QueryParams;
use crate::schema::SchemaDocument;
use crate::status::SuccessStatus;

/// Suffix appended to a schema name to build its URL.
pub const SCHEMA_URL_SUFFIX: &str = "-schema.json";

/// Returns the relative URL a named schema is served under.
#[must_use]
pub fn schema_url_for(name: &str) -> String {
    format!("{name}{SCHEMA_URL_SUFFIX}")
}

/// Flat form configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormParams {
    /// Title of the form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description of the form (HTML).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Schema name, served as `<name>-schema.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// Explicit schema URL; takes precedence over `schema_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_url: Option<String>,
    /// Inline schema document; takes precedence over any schema URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaDocument>,
    /// URL to fetch the initial value from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_url: Option<String>,
    /// Inline initial value; takes precedence over `value_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// URL to submit the form to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_url: Option<String>,
    /// HTTP method used on submit (default `POST`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_method: Option<String>,
    /// Status a submit response must have to count as success (default 200, 0 disables).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_status: Option<u16>,
}

impl FormParams {
    /// Builds parameters from parsed query-string pairs.
    ///
    /// Unknown keys are ignored. A `successStatus` that is not a number in
    /// `0..=999` is kept out of the parameters and reported by [`FormParams::from_query_strict`].
    #[must_use]
    pub fn from_query(query: &QueryParams) -> Self {
        let get = |key: &str| query.get(key).cloned();
        Self {
            title: get("title"),
            description: get("description"),
            schema_name: get("schemaName"),
            schema_url: get("schemaUrl"),
            schema: None,
            value_url: get("valueUrl"),
            value: None,
            submit_url: get("submitUrl"),
            submit_method: get("submitMethod"),
            success_status: query
                .get("successStatus")
                .and_then(|raw| SuccessStatus::parse(raw))
                .map(SuccessStatus::code),
        }
    }

    /// Like [`FormParams::from_query`], but rejects an unparsable `successStatus`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSuccessStatus`] when `successStatus` is present but
    /// not a number in `0..=999`.
    pub fn from_query_strict(query: &QueryParams) -> Result<Self, ConfigError> {
        if let Some(raw) = query.get("successStatus") {
            if SuccessStatus::parse(raw).is_none() {
                return Err(ConfigError::InvalidSuccessStatus(raw.clone()));
            }
        }
        Ok(Self::from_query(query))
    }

    /// Validates the parameters.
    ///
    /// Blank strings count as absent. The schema is checked before the submit URL.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first missing or invalid field.
    pub fn resolve(&self) -> Result<ResolvedParams, ConfigError> {
        let schema = if let Some(schema) = &self.schema {
            SchemaSource::Inline(schema.clone())
        } else if let Some(url) = non_blank(self.schema_url.as_ref()) {
            SchemaSource::Remote {
                name: non_blank(self.schema_name.as_ref()).map(str::to_string),
                url: url.to_string(),
            }
        } else if let Some(name) = non_blank(self.schema_name.as_ref()) {
            SchemaSource::Remote {
                name: Some(name.to_string()),
                url: schema_url_for(name),
            }
        } else {
            return Err(ConfigError::MissingSchema);
        };

        let submit_url = non_blank(self.submit_url.as_ref())
            .ok_or(ConfigError::MissingSubmitUrl)?
            .to_string();

        let submit_method = match non_blank(self.submit_method.as_ref()) {
            Some(raw) => parse_method(raw)?,
            None => Method::POST,
        };

        let success_status = match self.success_status {
            Some(code) if code > SuccessStatus::MAX => {
                return Err(ConfigError::InvalidSuccessStatus(code.to_string()));
            }
            Some(code) => SuccessStatus::new(code),
            None => SuccessStatus::default(),
        };

        let value = match (&self.value, non_blank(self.value_url.as_ref())) {
            (Some(value), _) => ValueSource::Inline(value.clone()),
            (None, Some(url)) => ValueSource::Remote(url.to_string()),
            (None, None) => ValueSource::None,
        };

        Ok(ResolvedParams {
            title: non_blank(self.title.as_ref()).map(str::to_string),
            description: non_blank(self.description.as_ref()).map(str::to_string),
            schema,
            value,
            submit_url,
            submit_method,
            success_status,
        })
    }
}

/// Where the schema document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    /// Supplied by the caller.
    Inline(SchemaDocument),
    /// Fetched over HTTP.
    Remote {
        /// Schema name, when the URL was derived from one.
        name: Option<String>,
        /// URL to fetch.
        url: String,
    },
}

impl SchemaSource {
    /// Returns a short label for logs: the schema name, URL, or `inline`.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Inline(_) => "inline",
            Self::Remote {
                name: Some(name), ..
            } => name,
            Self::Remote { url, .. } => url,
        }
    }
}

/// Where the initial value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// Supplied by the caller.
    Inline(Value),
    /// Fetched over HTTP.
    Remote(String),
    /// The form starts empty.
    None,
}

/// Validated form configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    /// Title of the form.
    pub title: Option<String>,
    /// Description of the form (HTML).
    pub description: Option<String>,
    /// Schema document source.
    pub schema: SchemaSource,
    /// Initial value source.
    pub value: ValueSource,
    /// URL to submit to.
    pub submit_url: String,
    /// HTTP method used on submit.
    pub submit_method: Method,
    /// Expected submit response status.
    pub success_status: SuccessStatus,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_method(raw: &str) -> Result<Method, ConfigError> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map_err(|_| ConfigError::InvalidSubmitMethod(raw.to_string()))
}
