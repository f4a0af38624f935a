use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

mod config;
mod pipeline;
mod server;
mod sofascore;
mod store;

use config::Config;
use pipeline::{run_once, run_pipeline, FeedContext, FeedPipeline};
use server::AppState;
use sofascore::{SofascoreClient, SportsApi};
use store::SnapshotStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let client = SofascoreClient::new(
        &config.api_base_url,
        &config.user_agent,
        config.request_timeout(),
    )?;
    let api: Arc<dyn SportsApi> = Arc::new(client);
    let store = SnapshotStore::new(&config.output_dir);
    info!(
        "Publishing {:?} snapshots to {} ({} upstream, match source {:?})",
        config.pipelines,
        config.output_dir.display(),
        api.name(),
        config.match_source
    );

    let ctx = Arc::new(FeedContext {
        api,
        store: store.clone(),
        source: config.match_source,
        max_concurrent: config.max_concurrent_requests,
    });
    let pipelines: Vec<FeedPipeline> = config
        .pipelines
        .iter()
        .map(|kind| FeedPipeline::new(*kind, ctx.clone()))
        .collect();

    if config.once {
        let failed = run_once(&pipelines).await;
        if failed > 0 {
            anyhow::bail!("{} of {} passes failed", failed, pipelines.len());
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut workers = Vec::with_capacity(pipelines.len());
    for p in pipelines {
        let interval = config.interval(p.kind());
        workers.push(tokio::spawn(run_pipeline(p, interval, shutdown_rx.clone())));
    }

    if config.no_server {
        shutdown_signal().await;
    } else {
        let app = server::router(AppState { store });
        let addr: SocketAddr = config.listen_addr.parse()?;
        info!("Query server listening on http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    }

    info!("Shutting down pipelines");
    if shutdown_tx.send(true).is_err() {
        warn!("All pipelines already stopped");
    }
    for worker in workers {
        if let Err(e) = worker.await {
            error!("Pipeline task panicked: {}", e);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
