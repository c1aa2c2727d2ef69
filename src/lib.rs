pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod floor_plan;
pub mod gateway;
pub mod models;
pub mod services;
pub mod storage;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use storage::{MemoryStorage, PgStorage, Storage};

// Shared state для всех обработчиков
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: config::Config,
}

impl AppState {
    /// Postgres, если задан `DATABASE_URL`, иначе хранилище в памяти.
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let storage: Arc<dyn Storage> = match &config.database.url {
            Some(url) => {
                let db = database::Database::new(url, config.database.pool_size).await?;
                info!("Using Postgres storage");
                Arc::new(PgStorage::new(db))
            }
            None if config.features.seed_demo_data => {
                info!("DATABASE_URL not set, using seeded in-memory storage");
                Arc::new(MemoryStorage::seeded())
            }
            None => {
                info!("DATABASE_URL not set, using empty in-memory storage");
                Arc::new(MemoryStorage::new())
            }
        };
        Ok(Self::with_storage(storage, config))
    }

    pub fn with_storage(storage: Arc<dyn Storage>, config: config::Config) -> Arc<Self> {
        Arc::new(Self { storage, config })
    }
}

/// HTTP-приложение целиком: баннер, health check и `/api`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Floor plan API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
