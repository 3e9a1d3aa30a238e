//! Serve mode: opens the record store and runs the HTTP listener until
//! Ctrl-C.

use anyhow::Context;
use hostdir_core::HostdirConfig;
use hostdir_store::{RecordStore, StoreOptions};
use tracing::{info, warn};

pub async fn run(config: HostdirConfig) -> anyhow::Result<()> {
    info!("hostdir daemon starting");

    // The store must load before anything is served.
    let store_path = config.store_path();
    let options = StoreOptions {
        atomic_writes: config.store.atomic_writes,
    };
    let store = RecordStore::open_with(&store_path, options)
        .with_context(|| format!("opening record store {}", store_path.display()))?;
    info!(path = ?store_path, records = store.len(), "record store opened");

    let router = hostdir_api::build_router(store, &config.web);
    let addr = config.server.listen;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, web_root = ?config.web.resolved_root(), "API server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("hostdir daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
