//! Prezzario CLI
//!
//! Match free-text construction activity descriptions against Italian
//! regional price catalogs.

use anyhow::Result;
use clap::Parser;
use prezzario_core::{error::exit_codes, Config, PrezzarioError};

mod app;
mod commands;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let code = err
            .downcast_ref::<PrezzarioError>()
            .map(PrezzarioError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        eprintln!("error: {:#}", err);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Build(args) => commands::build::run(args, &config).await,
        Commands::Search(args) => commands::search::run(args, &config, cli.format).await,
        Commands::Status => commands::status::run(&config, cli.format).await,
    }
}
