//! CloudVault server.
//!
//! Loads configuration, wires the stores and services together, and serves
//! the HTTP API until Ctrl+C or SIGTERM.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use cloudvault_api::{AppState, Backends, build_router};
use cloudvault_auth::JwtIdentityProvider;
use cloudvault_core::config::{AppConfig, LogFormat, MetadataBackend};
use cloudvault_core::error::AppError;
use cloudvault_database::migration::run_migrations;
use cloudvault_database::{DatabasePool, MemoryStore};
use cloudvault_service::LogNotificationSink;
use cloudvault_storage::build_object_store;

#[tokio::main]
async fn main() {
    let env = std::env::var("CLOUDVAULT_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing; `RUST_LOG` overrides `logging.level`.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CloudVault v{}", env!("CARGO_PKG_VERSION"));

    let objects = build_object_store(&config.storage).await?;
    tracing::info!(provider = objects.provider_type(), "Object store ready");

    let identity = Arc::new(JwtIdentityProvider::new(&config.auth));
    let notifications = Arc::new(LogNotificationSink);

    let mut db = None;
    let backends = match config.database.backend {
        MetadataBackend::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            run_migrations(pool.pool()).await?;
            let backends = Backends::postgres(&pool, objects, notifications, identity);
            db = Some(pool);
            backends
        }
        MetadataBackend::Memory => {
            tracing::warn!("Using in-memory metadata store; data is lost on restart");
            Backends::memory(&MemoryStore::new(), objects, notifications, identity)
        }
    };

    let addr = config.server.bind_address();
    let app = build_router(AppState::new(config, backends));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(address = %addr, "CloudVault listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(pool) = db {
        pool.close().await;
    }
    tracing::info!("CloudVault shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
    tracing::info!("Shutdown signal received");
}
