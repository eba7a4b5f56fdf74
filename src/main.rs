#![warn(clippy::pedantic)]

use anyhow::Result;
use clap::Parser;

mod analysis;
mod classify;
mod cli;
mod config;
mod constants;
mod error;
mod event;
#[cfg(test)]
mod fixtures;
mod git;
mod pipeline;
mod repo_cache;
mod server;
mod signature;
mod tracker;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine, the environment may already be set up.
    let _ = dotenvy::dotenv();
    cli::init_tracing();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Commands::Serve(args) => {
            server::serve(args).await?;
        }
    }
    Ok(())
}
