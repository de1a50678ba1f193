//! Connection-pool construction. The pool is built once at startup and
//! injected into services; nothing here holds ambient global state.
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Build a pool from a validated database config.
pub async fn connect_with_config(cfg: &configs::DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opts).await?;
    Ok(db)
}

/// Convenience connect from `config.toml` / environment.
pub async fn connect() -> anyhow::Result<DatabaseConnection> {
    let _ = dotenvy::dotenv();
    let cfg = configs::AppConfig::load_and_validate()?;
    connect_with_config(&cfg.database).await
}
