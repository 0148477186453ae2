//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for portfolio-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:5000"`).
    pub bind_address: String,

    /// sqlx SQLite URL (default: `"sqlite://portfolio.db"`). The file is
    /// created on first start.
    pub database_url: String,

    /// Upper bound on pooled SQLite connections.
    pub database_max_connections: u32,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Page size used by list endpoints when `limit` is absent or invalid.
    pub default_page_size: u32,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("PORTFOLIO_BIND", "0.0.0.0:5000"),
            database_url: env_or("PORTFOLIO_DATABASE_URL", "sqlite://portfolio.db"),
            database_max_connections: parse_env("PORTFOLIO_DB_MAX_CONNECTIONS", 5),
            log_level: env_or("PORTFOLIO_LOG", "info"),
            log_json: std::env::var("PORTFOLIO_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            cors_allowed_origins: std::env::var("PORTFOLIO_CORS_ORIGINS")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            default_page_size: parse_env("PORTFOLIO_DEFAULT_PAGE_SIZE", 20).max(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_owned(),
            database_url: "sqlite://portfolio.db".to_owned(),
            database_max_connections: 5,
            log_level: "info".to_owned(),
            log_json: false,
            cors_allowed_origins: None,
            default_page_size: 20,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
