//! Persistence layer.
//!
//! [`TaskStore`], [`ProjectStore`] and [`BlogStore`] define the interfaces the
//! handlers depend on. The default implementation is [`SqliteStore`]. To
//! swap to another database, implement the traits for your new type and
//! change the concrete type in [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures so no extra
//! `async-trait` crate is required.

pub mod blog;
pub mod dao;
pub mod project;
pub mod task;

pub use blog::BlogStore;
pub use project::ProjectStore;
pub use task::TaskStore;

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://portfolio.db"` or `"sqlite::memory:"` for tests. An
    /// in-memory database lives only as long as its connection, so pools for
    /// it must keep exactly one connection open forever.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if url.contains(":memory:") {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Round-trip a trivial query; used by the health endpoint.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[cfg(test)]
    pub async fn in_memory() -> Self {
        Self::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory sqlite")
    }
}

// ── row helpers ──────────────────────────────────────────────────────────────

/// Canonical timestamp text. Fixed width so string order equals time order.
pub(crate) fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_ts(raw: &str, column: &'static str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        tracing::warn!(raw = %raw, column, error = %e, "failed to parse timestamp; using now");
        Utc::now()
    })
}

pub(crate) fn parse_opt_ts(raw: Option<String>, column: &'static str) -> Option<DateTime<Utc>> {
    raw.map(|r| parse_ts(&r, column))
}

/// Decode an embedded JSON collection, falling back to its default.
pub(crate) fn parse_json<T: DeserializeOwned + Default>(raw: &str, column: &'static str) -> T {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(column, error = %e, "failed to decode embedded json; using default");
        T::default()
    })
}

/// Decode a stored enum label, falling back to its default.
pub(crate) fn parse_label<T: FromStr + Default>(raw: &str, column: &'static str) -> T {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(raw = %raw, column, "unknown stored label; using default");
        T::default()
    })
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, sqlx::Error> {
    serde_json::to_string(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn timestamps_sort_lexicographically() {
        let a: DateTime<Utc> = "2026-01-01T09:00:00Z".parse().unwrap();
        let b: DateTime<Utc> = "2026-01-01T10:00:00.5Z".parse().unwrap();
        assert_eq!(ts(&a), "2026-01-01T09:00:00.000Z");
        assert!(ts(&a) < ts(&b));
        assert_eq!(parse_ts(&ts(&b), "t"), b);
    }

    #[test]
    fn broken_json_falls_back_to_default() {
        let tags: Vec<String> = parse_json("not json", "tags");
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn in_memory_store_runs_migrations() {
        let store = SqliteStore::in_memory().await;
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(n, 0);
    }
}
