//! `jsonform-api` binary entrypoint.
//!
//! Loads configuration from environment variables and serves an empty schema
//! repository. Applications embedding schemas build their own binary on
//! [`jsonform_api::server::Server`], as `jsonform-demo` does.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use anyhow::Result;

use jsonform_api::config::Config;
use jsonform_api::server::Server;
use jsonform_core::observability::{LogFormat, init_logging};

fn choose_log_format(config: &Config) -> LogFormat {
    if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    config.validate()?;

    init_logging(choose_log_format(&config));

    if config.strict {
        tracing::warn!("strict mode with no registered schemas; every schema lookup will 404");
    }

    Server::new(config).serve().await?;
    Ok(())
}
