//! Schemagate CLI - brings an application's database schema up to date
//! before the application is allowed to serve traffic

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{exec, setup, status, upgrade};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Status(args) => status::execute(args, &cli.global).await,
        cli::Commands::Setup(args) => setup::execute(args, &cli.global).await,
        cli::Commands::Upgrade(args) => upgrade::execute(args, &cli.global).await,
        cli::Commands::Exec(args) => exec::execute(args, &cli.global).await,
    }
}

/// Install the log backend; `RUST_LOG` overrides the default filter.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
