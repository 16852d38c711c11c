pub mod config;
pub mod database;
pub mod redis_client;
pub mod error;
pub mod models;
pub mod store;
pub mod services;
pub mod controllers;
pub mod middleware;
pub mod cache;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{Config, StorageConfig};
use crate::store::{CinemaStore, MemoryStore, PgStore};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CinemaStore>,
    pub cache: cache::CacheService,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn CinemaStore> = match &config.storage {
            StorageConfig::Postgres(db_config) => {
                let db = database::Database::connect(db_config).await?;
                db.run_migrations().await?;
                Arc::new(PgStore::new(db))
            }
            StorageConfig::Memory => {
                warn!("Using in-memory storage, data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        // Redis не обязателен: без него кеш просто выключен
        let redis = match config.redis.url.as_deref() {
            Some(url) => match redis_client::RedisClient::new(url).await {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!("Redis unavailable, cache disabled: {:?}", e);
                    None
                }
            },
            None => {
                info!("REDIS_URL not set, cache disabled");
                None
            }
        };
        let cache = cache::CacheService::new(redis, config.redis.ttl_seconds);

        Ok(Arc::new(Self { store, cache, config }))
    }

    pub fn with_store(store: Arc<dyn CinemaStore>, config: Config) -> Arc<Self> {
        Arc::new(Self {
            store,
            cache: cache::CacheService::disabled(),
            config,
        })
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Cinema booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
