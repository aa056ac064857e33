//! The `jsonform` CLI binary.

use anyhow::Result;
use clap::Parser;

use jsonform_cli::{Cli, Commands};
use jsonform_core::observability::{LogFormat, init_logging_with};

fn main() -> Result<()> {
    init_logging_with(LogFormat::Compact, "warn");

    let cli = Cli::parse();
    let config = cli.config();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Fill(args) => jsonform_cli::commands::fill::execute(args, &config).await,
            Commands::Schema(args) => jsonform_cli::commands::schema::execute(args, &config).await,
            Commands::Schemas => jsonform_cli::commands::schema::execute_list(&config).await,
        }
    })
}
