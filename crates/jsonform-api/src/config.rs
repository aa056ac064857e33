//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use jsonform_core::{Error, Result};

/// Default HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 8011;

/// Default path prefix schema routes and form pages are mounted under.
pub const DEFAULT_PREFIX: &str = "/json-form/";

/// Schema server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP port to listen on.
    pub http_port: u16,
    /// Path prefix for schema routes and form pages; always starts and ends with `/`.
    pub prefix: String,
    /// Debug mode: pretty logs and permissive CORS checks.
    pub debug: bool,
    /// Only serve schemas registered before startup.
    pub strict: bool,
    /// CORS settings.
    pub cors: CorsConfig,
    /// Per-request timeout; none by default.
    pub request_timeout: Option<Duration>,
}

/// CORS configuration for browser-based access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Use `["*"]` to allow all origins (development only).
    /// Empty list disables CORS entirely.
    pub allowed_origins: Vec<String>,

    /// Max age for preflight cache (seconds).
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            prefix: DEFAULT_PREFIX.to_string(),
            debug: false,
            strict: false,
            cors: CorsConfig::default(),
            request_timeout: None,
        }
    }
}

impl Config {
    /// Loads configuration from `JSONFORM_*` environment variables.
    ///
    /// Unset or blank variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value of the wrong type.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = env_u16("JSONFORM_HTTP_PORT")? {
            config.http_port = port;
        }
        if let Some(prefix) = env_string("JSONFORM_PREFIX") {
            config.prefix = normalize_prefix(&prefix);
        }
        if let Some(debug) = env_bool("JSONFORM_DEBUG")? {
            config.debug = debug;
        }
        if let Some(strict) = env_bool("JSONFORM_STRICT")? {
            config.strict = strict;
        }
        if let Some(origins) = env_string("JSONFORM_CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = parse_cors_allowed_origins(&origins);
        }
        if let Some(max_age) = env_u64("JSONFORM_CORS_MAX_AGE_SECONDS")? {
            config.cors.max_age_seconds = max_age;
        }
        if let Some(secs) = env_u64("JSONFORM_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Validates settings that cannot be checked per variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the CORS wildcard is mixed with explicit origins, or used
    /// outside debug mode.
    pub fn validate(&self) -> Result<()> {
        let has_wildcard = self.cors.allowed_origins.iter().any(|o| o == "*");
        if has_wildcard && self.cors.allowed_origins.len() > 1 {
            return Err(Error::InvalidInput(
                "JSONFORM_CORS_ALLOWED_ORIGINS: '*' must be the only allowed origin".to_string(),
            ));
        }
        if has_wildcard && !self.debug {
            return Err(Error::InvalidInput(
                "JSONFORM_CORS_ALLOWED_ORIGINS cannot include '*' when JSONFORM_DEBUG=false"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Ensures the prefix starts and ends with a slash.
#[must_use]
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_u16(name: &str) -> Result<Option<u16>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u16>()
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("{name} must be a u16: {e}")))
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u64>()
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("{name} must be a u64: {e}")))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    let value = value.trim().to_ascii_lowercase();
    match value.as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(Error::InvalidInput(format!(
            "{name} must be a boolean (true/false/1/0)"
        ))),
    }
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    parse_bool(name, &v).map(Some)
}

fn parse_cors_allowed_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
