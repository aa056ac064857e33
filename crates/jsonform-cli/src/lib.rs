//! # jsonform-cli
//!
//! Command-line client for JSON forms.
//!
//! ## Commands
//!
//! - `jsonform fill` - Load a form configured by a query string and submit values
//! - `jsonform schema` - Show the layout of a schema served by name
//! - `jsonform schemas` - List the schemas a server serves
//!
//! ## Configuration
//!
//! - `JSONFORM_BASE_URL` - Schema prefix URL (default: `http://localhost:8011/json-form/`)

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

pub mod client;
pub mod commands;
pub mod renderer;

use clap::{Parser, Subcommand};

/// Default schema prefix URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8011/json-form/";

/// JSON forms from the terminal.
#[derive(Debug, Parser)]
#[command(name = "jsonform")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// URL the schema server's routes are mounted under.
    #[arg(long, env = "JSONFORM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Output format.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the effective configuration.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            base_url: normalize_base_url(&self.base_url),
            format: self.format.clone(),
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load a form and submit values to it.
    Fill(commands::fill::FillArgs),
    /// Show the layout of a schema.
    Schema(commands::schema::SchemaArgs),
    /// List registered schemas.
    Schemas,
}

/// Output format.
#[derive(Debug, Clone, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// Table output.
    Table,
}

/// CLI configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Schema prefix URL, always ending with `/`.
    pub base_url: String,
    /// Output format.
    pub format: OutputFormat,
}

impl Config {
    /// Absolute URL of a path under the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_config_from_flags() {
        let cli = Cli::parse_from([
            "jsonform",
            "--base-url",
            "https://forms.example.com/json-form",
            "--format",
            "json",
            "schema",
            "user",
        ]);

        let config = cli.config();
        assert_eq!(config.base_url, "https://forms.example.com/json-form/");
        assert!(matches!(config.format, OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Schema(ref args) if args.name == "user"));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["jsonform", "schemas"]);
        // JSONFORM_BASE_URL may be set in the environment; only check the shape.
        assert!(cli.config().base_url.ends_with('/'));
        assert!(matches!(cli.format, OutputFormat::Text));
        assert!(matches!(cli.command, Commands::Schemas));
    }

    #[test]
    fn test_config_url_joins_paths() {
        let config = Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            format: OutputFormat::Text,
        };
        assert_eq!(
            config.url("user-schema.json"),
            "http://localhost:8011/json-form/user-schema.json"
        );
        assert_eq!(
            config.url("/form.html?a=1"),
            "http://localhost:8011/json-form/form.html?a=1"
        );
    }
}
