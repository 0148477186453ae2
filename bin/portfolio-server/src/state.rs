//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::query::QueryBuilder;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Task, project and blog persistence.
    pub store: Arc<SqliteStore>,
    /// Plans `GET /api/tasks` queries with the configured page size.
    pub queries: QueryBuilder,
}

impl AppState {
    pub fn new(config: Config, store: SqliteStore) -> Self {
        let queries = QueryBuilder::new(config.default_page_size);
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            queries,
        }
    }
}
