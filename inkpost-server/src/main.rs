//! inkpost-server - Content publishing service
//!
//! Serves the article/comment/like API over a single SQLite database.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use inkpost_common::config::{load_config, ConfigOverrides};
use inkpost_common::db::init_database;
use inkpost_server::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "inkpost-server", about = "Content publishing service")]
struct Args {
    /// Path to the TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Address to bind, e.g. 127.0.0.1:8080
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting inkpost-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let overrides = ConfigOverrides {
        config_file: args.config,
        database_path: args.database,
        bind_addr: args.bind,
    };
    let config = load_config(&overrides)?;

    info!("Database path: {}", config.database_path.display());
    let pool = init_database(&config.database_path).await?;

    if config.owner_open_id.is_some() {
        info!("Owner identity token configured (admin role granted on sign-in)");
    }
    if config.storage.is_none() {
        info!("Object storage not configured; image uploads will be rejected");
    }

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("inkpost-server listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
