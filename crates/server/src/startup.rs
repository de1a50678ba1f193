use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, auth};

fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &configs::ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.host, cfg.port).parse()?)
}

/// Public entry: load configuration, migrate, build the app and serve.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = configs::AppConfig::load_and_validate()?;
    let db = models::db::connect_with_config(&cfg.database).await?;

    // Schema is brought up to date on boot; no separate migrate step.
    migration::Migrator::up(&db, None).await?;

    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig {
            jwt_secret: cfg.auth.jwt_secret.clone(),
            token_ttl_hours: cfg.auth.token_ttl_hours,
        },
    };
    let app: Router = routes::build_router(build_cors(), state);

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
