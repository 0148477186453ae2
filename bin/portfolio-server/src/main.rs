//! portfolio-server: task, project and blog API for a personal portfolio.
//!
//! Boot sequence: read `PORTFOLIO_*` settings, install the tracing
//! subscriber, open SQLite (migrations run on connect), then serve the
//! router until ctrl-c or SIGTERM.

mod config;
mod entities;
mod error;
mod extract;
mod middleware;
mod query;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(&config);
    info!(version = env!("CARGO_PKG_VERSION"), "portfolio-server starting");

    let store = SqliteStore::connect(&config.database_url, config.database_max_connections)
        .await
        .with_context(|| format!("opening database {}", config.database_url))?;
    info!(database_url = %config.database_url, "database ready");

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("invalid PORTFOLIO_BIND '{}'", config.bind_address))?;
    let app = routes::build(Arc::new(AppState::new(config, store)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;
    info!("portfolio-server stopped");
    Ok(())
}

/// `RUST_LOG` takes precedence over `PORTFOLIO_LOG`; a bad filter means `info`.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|e| {
            eprintln!("PORTFOLIO_LOG='{}' rejected ({e}); using 'info'", config.log_level);
            EnvFilter::new("info")
        })
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn wait_for_shutdown() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
            warn!("SIGTERM handler unavailable");
            return std::future::pending::<()>().await;
        };
        sigterm.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => info!("interrupt received"),
        () = terminate => info!("SIGTERM received"),
    }
    info!("draining connections before exit");
}
