use crate::config::PageTreeConfig;
use crate::database::sqlite::SqliteRepository;
use crate::services::{BlockInteractor, PageManager, SnapshotManager};
use axum::Router;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod database;
pub mod db;
pub mod domain;
pub mod error;
pub mod features;
pub mod services;

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub pages: Arc<PageManager>,
    pub blocks: Arc<BlockInteractor>,
    pub snapshots: Arc<SnapshotManager>,
    pub config: Arc<PageTreeConfig>,
}

impl AppState {
    /// Wires every manager to the SQLite store behind `pool`.
    pub fn new(pool: Pool<Sqlite>, config: Arc<PageTreeConfig>) -> Self {
        let repo = SqliteRepository::new(pool);

        Self {
            pages: Arc::new(PageManager::new(
                Box::new(repo.clone()),
                config.page_defaults.clone(),
            )),
            blocks: Arc::new(BlockInteractor::new(Box::new(repo.clone()))),
            snapshots: Arc::new(SnapshotManager::new(
                Box::new(repo),
                config.snapshot_retention,
            )),
            config,
        }
    }
}

/// The HTTP application, every feature nested under `/api`.
pub fn app(state: AppState) -> Router {
    let api_router = Router::new()
        .merge(features::pages::pages_router())
        .merge(features::blocks::blocks_router())
        .merge(features::snapshots::snapshots_router());

    Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
