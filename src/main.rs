mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use dailytally::config::Config;
use dailytally::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    observability::init_tracing();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    commands::apply_store_override(&mut config, cli.store);

    match cli.command {
        Commands::Poll(args) => commands::poll(config, args).await?,
        Commands::Export(args) => commands::export(config, args)?,
    }

    Ok(())
}
