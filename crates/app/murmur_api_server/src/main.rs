//! Murmur REST API server binary.
//!
//! Opens the document store once, runs migrations and unique-index setup,
//! serves the API, and closes the store after a graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use murmur_api::AppState;
use murmur_api::config::{ApiConfig, DEFAULT_BIND_ADDR, DEFAULT_DATABASE_URL};
use murmur_core::SharedStore;
use murmur_core::store::{MemoryStore, PgDocumentStore, StoreKind, ensure_indexes};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "murmur_api_server", about = "Murmur REST API server", version)]
struct Args {
    /// Address to listen on.
    #[arg(long = "bind", env = "BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    bind_addr: String,

    /// Document store backend (`postgres` or `memory`).
    #[arg(long, env = "MURMUR_STORE", default_value = "postgres")]
    store: StoreKind,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// Seconds a request may wait for a pooled connection.
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 30)]
    acquire_timeout_secs: u64,
}

impl Args {
    fn into_config(self) -> ApiConfig {
        ApiConfig {
            bind_addr: self.bind_addr,
            store: self.store,
            database_url: self.database_url,
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
        }
    }
}

async fn open_store(config: &ApiConfig) -> Result<SharedStore, Box<dyn std::error::Error>> {
    match config.store {
        StoreKind::Postgres => {
            info!(
                max_connections = config.max_connections,
                acquire_timeout = ?config.acquire_timeout,
                "configuring connection pool"
            );
            let store = PgDocumentStore::connect(
                &config.database_url,
                config.max_connections,
                config.acquire_timeout,
            )
            .await?;

            info!("running database migrations");
            murmur_core::migrate::migrate(store.pool()).await?;
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            warn!("using the in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {e}");
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
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,murmur_api=debug,murmur_core=debug,tower_http=debug")
        }))
        .init();

    let config = Args::parse().into_config();
    info!(store = %config.store, bind_addr = %config.bind_addr, "starting murmur_api_server");

    let store = open_store(&config).await?;
    ensure_indexes(store.as_ref()).await?;

    let app = murmur_api::router(AppState::new(store.clone(), config.clone()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    info!("store closed, exiting");

    served?;
    Ok(())
}
