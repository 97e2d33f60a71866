use clap::{Parser, Subcommand};
use std::path::PathBuf;

use dailytally::config::HumanDuration;

#[derive(Parser, Debug)]
#[command(name = "dailytally")]
#[command(about = "Counts timeline posts per author per day", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config/dailytally.toml or $DAILYTALLY_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store directory (overrides store.path)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the timeline and count posts until interrupted
    Poll(PollArgs),
    /// Dump every daily counter as CSV
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct PollArgs {
    /// Sleep between cycles, e.g. "5m" (overrides poll.interval)
    #[arg(long)]
    pub interval: Option<HumanDuration>,

    /// Bearer token for the timeline API
    #[arg(long, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Write CSV to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}
