#![cfg(test)]
//! Shared helpers for tests that need a live Postgres. When no database
//! is reachable the tests skip themselves instead of failing, so the
//! pure-logic suite stays green on machines without one.

use migration::MigratorTrait;
use models::db::connect_with_config;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Run migrations at most once per test process.
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_db_config() -> Option<configs::DatabaseConfig> {
    dotenvy::dotenv().ok();
    let mut cfg = configs::load_default()
        .map(|app| app.database)
        .unwrap_or_default();
    cfg.normalize_from_env();
    if cfg.validate().is_err() {
        return None;
    }
    cfg.max_connections = cfg.max_connections.max(10);
    cfg.min_connections = cfg.min_connections.clamp(1, cfg.max_connections);
    cfg.connect_timeout_secs = 2;
    cfg.acquire_timeout_secs = 10;
    Some(cfg)
}

/// Connect to the test database, or `None` to skip the calling test.
pub async fn try_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let Some(cfg) = test_db_config() else {
        eprintln!("skipping db test: no usable database configuration");
        return None;
    };

    let usable = MIGRATED
        .get_or_init(|| async {
            match connect_with_config(&cfg).await {
                Ok(db) => match migration::Migrator::up(&db, None).await {
                    Ok(()) => true,
                    Err(e) => {
                        eprintln!("skipping db tests: migration failed: {e}");
                        false
                    }
                },
                Err(e) => {
                    eprintln!("skipping db tests: connect failed: {e}");
                    false
                }
            }
        })
        .await;
    if !*usable {
        return None;
    }

    match connect_with_config(&cfg).await {
        Ok(db) => Some(db),
        Err(e) => {
            eprintln!("skipping db test: connect failed: {e}");
            None
        }
    }
}
