use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use dailytally::config::Config;
use dailytally::export::Exporter;
use dailytally::ledger::DurableStore;
use dailytally::worker::{HttpTimeline, PollLoop, WorkerConfig};
use tracing::{info, warn};

use crate::cli::{ExportArgs, PollArgs};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn poll(mut config: Config, args: PollArgs) -> Result<(), AnyError> {
    if let Some(interval) = args.interval {
        config.poll.interval = interval;
    }
    if let Some(token) = args.bearer_token {
        config.timeline.bearer_token = Some(token);
    }
    config.validate()?;

    if config.timeline.bearer_token.is_none() {
        warn!("No bearer token configured, timeline requests will be unauthenticated");
    }

    let store = DurableStore::open(&config.store.path)?;
    let source = HttpTimeline::new(&config.timeline)?;
    info!(endpoint = source.endpoint(), "Timeline source ready");

    let worker = PollLoop::new(store, source, WorkerConfig::from(&config.poll));
    worker.run(shutdown_signal()).await;

    Ok(())
}

pub fn export(config: Config, args: ExportArgs) -> Result<(), AnyError> {
    let store = DurableStore::open(&config.store.path)?;
    let exporter = Exporter::new(&store);

    let rows = match args.output {
        Some(path) => {
            let file = File::create(&path)?;
            let rows = exporter.write_csv(BufWriter::new(file))?;
            info!(path = %path.display(), rows, "CSV written");
            rows
        }
        None => exporter.write_csv(BufWriter::new(io::stdout().lock()))?,
    };

    info!(rows, "Export finished");
    Ok(())
}

/// Store path from the CLI wins over configuration
pub fn apply_store_override(config: &mut Config, store: Option<PathBuf>) {
    if let Some(path) = store {
        config.store.path = path;
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
