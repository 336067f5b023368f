//! inkpost-server library
//!
//! The HTTP service for the inkpost publishing platform: router assembly,
//! request handlers, authorization policy, and the object-storage client.

use axum::{middleware, Router};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use inkpost_common::config::ServerConfig;

pub mod api;
pub mod error;
pub mod policy;
pub mod storage;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, opened at startup and injected everywhere
    pub db: SqlitePool,
    pub config: Arc<ServerConfig>,
    pub storage: storage::StorageClient,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: ServerConfig) -> Self {
        let storage = storage::StorageClient::new(config.storage.clone());
        AppState {
            db,
            config: Arc::new(config),
            storage,
            startup_time: Utc::now(),
        }
    }
}

/// Build the application router.
///
/// Every route passes through the actor-identification middleware; handlers
/// that require an actor enforce it through the `CurrentUser` extractor.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health::routes())
        .merge(api::auth::routes())
        .merge(api::categories::routes())
        .merge(api::articles::routes())
        .merge(api::comments::routes())
        .merge(api::likes::routes())
        .merge(api::users::routes())
        .merge(api::upload::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::identify,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
