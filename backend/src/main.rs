mod app;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod schema;
mod store;

use crate::config::{Config, LogFormat};
use crate::store::{ItemStore, MemoryItemStore, PgItemStore};
use anyhow::Context;
use clap::Parser;
use std::{fs::OpenOptions, sync::Arc, sync::Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present, before the environment is read
    dotenvy::dotenv().ok();

    let config = Config::parse();
    init_tracing(&config)?;

    if config.dev_mode {
        tracing::warn!("DEV MODE ENABLED: items are kept in memory only");
    }

    let store = build_store(&config)?;
    let app_state = Arc::new(app::AppState::new(store));
    let app = app::router(app_state, config.request_timeout());

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server_addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited");
    Ok(())
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.default_log_directive())
            .with_context(|| format!("Invalid LOG_LEVEL {:?}", config.log_level))?,
    };

    let stdout = match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    let file = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file)
        .init();
    Ok(())
}

fn build_store(config: &Config) -> anyhow::Result<Arc<dyn ItemStore>> {
    let Some(database_url) = config.database_url()? else {
        return Ok(Arc::new(MemoryItemStore::new()));
    };

    let pool = db::create_pool(config, database_url)?;
    tracing::info!("Connected to database");

    tracing::info!("Running database migrations...");
    match db::run_migrations(&pool) {
        Ok(applied) => {
            if applied.is_empty() {
                tracing::info!("Database is up to date");
            } else {
                for m in &applied {
                    tracing::info!("Applied migration: {}", m);
                }
            }
        }
        Err(e) => {
            tracing::error!("Failed to run migrations: {}", e);
            return Err(e);
        }
    }

    Ok(Arc::new(PgItemStore::new(pool, config.statement_timeout())))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
