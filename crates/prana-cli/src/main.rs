//! prana - safety-aware yoga and wellness assistant
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::float_cmp,
        clippy::missing_panics_doc,
        reason = "Allow for tests"
    )
)]

use anyhow::Result;
use clap::Parser as _;
use cli::{Cli, Commands};

mod cli;
mod handlers;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    handlers::init_tracing();
    let config = handlers::load_config(cli.config)?;

    match cli.command {
        Commands::Build { force } => handlers::handle_build(&config, force).await,
        Commands::Ask { question, session } => {
            handlers::handle_ask(&config, &question, session.as_deref()).await
        }
        Commands::Search {
            query,
            top_k,
            threshold,
        } => handlers::handle_search(&config, &query, top_k, threshold).await,
        Commands::Classify { text, pose } => handlers::handle_classify(&text, pose.as_deref()),
        Commands::Status => handlers::handle_status(&config).await,
        Commands::Stats { recent } => handlers::handle_stats(&config, recent).await,
    }
}
