//! Biogas dashboard HTTP server binary.
//!
//! Initializes the record store and the civil timezone, sets up the HTTP
//! router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with local (in-memory) repository (default)
//! cargo run --bin biogas-server
//!
//! # Run against the hosted store
//! SUPABASE_URL=https://project.supabase.co SUPABASE_KEY=... \
//!   cargo run --bin biogas-server --features rest-repo
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `APP_TIMEZONE`: IANA zone for entry and display (default: Europe/Kiev);
//!   overrides the `[timezone]` section of `repository.toml`
//! - `DISPLAY_FORMAT`: strftime pattern for displayed timestamps
//! - `REPOSITORY_TYPE`: `local` or `rest`; `repository.toml` is used when present
//! - `RUST_LOG`: Log filter (default: info)

use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use biogas_backend::config::AppConfig;
use biogas_backend::db::{RepositoryConfig, RepositoryFactory};
use biogas_backend::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting biogas dashboard server");

    // repository.toml is optional; a file that exists but cannot be loaded is fatal
    let file = RepositoryConfig::load_default().context("Invalid repository.toml")?;
    let config =
        AppConfig::from_env_over_file(file.as_ref()).context("Invalid server configuration")?;
    let normalizer = config.normalizer()?;

    let repository = match &file {
        Some(file) => {
            info!("Using repository.toml ({})", file.repository.repo_type);
            RepositoryFactory::from_repository_config(file)?
        }
        None => RepositoryFactory::from_env()?,
    };
    info!(
        "Repository initialized; timezone {}",
        normalizer.zone_name()
    );

    let state = AppState::new(repository, normalizer);
    let app = create_router(state);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
