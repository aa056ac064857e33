//! HTTP client for the schema server.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use jsonform_core::FormSchema;
use jsonform_core::params::schema_url_for;

use crate::Config;

/// Registered schema names, as listed by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaList {
    /// Names, sorted.
    pub names: Vec<String>,
}

/// API client for schema server endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: Config,
}

impl ApiClient {
    /// Creates a new API client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetches a schema document by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn schema(&self, name: &str) -> Result<FormSchema> {
        self.get_json(&self.config.url(&schema_url_for(name))).await
    }

    /// Lists registered schema names.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn schemas(&self) -> Result<SchemaList> {
        self.get_json(&self.config.url("schemas")).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        if response.status().is_success() {
            response.json().await.context("Failed to parse response")
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({status}): {body}")
        }
    }
}
