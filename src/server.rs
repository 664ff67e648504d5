//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, codec construction, and the Axum server lifecycle.

use crate::application::services::LinkInputProcessor;
use crate::config::Config;
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::infrastructure::hash_id::HarshCodec;
use crate::infrastructure::persistence::{
    InMemoryLinkRepository, InMemoryUserRepository, PgLinkRepository, PgUserRepository,
};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::url_normalizer::HttpsUrlNormalizer;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Opens a PostgreSQL pool with the configured limits and applies migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn connect_database(config: &Config, database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(pool)
}

/// Builds the input processor: codec salted with the base URL host, HTTPS normalizer.
///
/// # Errors
///
/// Returns an error if the base URL is invalid or the codec cannot be built.
pub fn build_processor(config: &Config) -> Result<LinkInputProcessor> {
    let base_url = config.parsed_base_url()?;
    let codec = HarshCodec::new(base_url.host(), config.hash_min_length)?;

    Ok(LinkInputProcessor::new(
        Arc::new(codec),
        Arc::new(HttpsUrlNormalizer),
        base_url,
        config.hash_min_length,
    ))
}

/// Builds the application state over PostgreSQL or, without a database URL,
/// over in-memory storage.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the processor cannot be built.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let processor = Arc::new(build_processor(config)?);

    let (link_repository, user_repository): (Arc<dyn LinkRepository>, Arc<dyn UserRepository>) =
        match config.database_url.as_deref() {
            Some(database_url) => {
                let pool = Arc::new(connect_database(config, database_url).await?);
                (
                    Arc::new(PgLinkRepository::new(pool.clone())),
                    Arc::new(PgUserRepository::new(pool)),
                )
            }
            None => {
                tracing::warn!("No database configured, links are kept in memory");
                (
                    Arc::new(InMemoryLinkRepository::new()),
                    Arc::new(InMemoryUserRepository::new()),
                )
            }
        };

    Ok(AppState::new(link_repository, user_repository, processor))
}

/// Runs the HTTP server with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - State construction fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;

    let app = app_router(state, config.rate_limit);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Terminate signal received, starting graceful shutdown");
}
