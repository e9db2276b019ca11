use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

pub mod api;
pub mod config;
pub mod error;
pub mod storage;

use config::Config;
use storage::{LiveDataStore, PgStore};

/// Shared across every request; holds nothing but the storage handle.
pub struct AppState {
    pub store: Arc<dyn LiveDataStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn LiveDataStore>) -> Self {
        Self { store }
    }
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let store = PgStore::connect(&config.database_url, config.max_connections)
        .await
        .context("could not connect to the live data backend")?;
    // doubles as the startup connectivity check
    store.ensure_schema().await.context("could not create livedata table")?;

    let state = Arc::new(AppState::new(Arc::new(store)));
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;

    // broadcast channel for shutdown signaling
    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);
    let mut server = tokio::spawn(api::http::run(state, listener, shutdown_rx));

    tokio::select! {
        res = &mut server => return res?,
        sig = tokio::signal::ctrl_c() => sig?,
    }

    tracing::info!("Shutting down");
    let _ = shutdown_tx.send(());
    server.await??;
    Ok(())
}
