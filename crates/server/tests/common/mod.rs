#![allow(dead_code)]
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes::{self, auth};

pub const TEST_SECRET: &str = "test-secret";

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

/// Build the app against the configured test database, or `None` to
/// skip the calling test when no database is reachable.
pub async fn try_app() -> Option<(Router, DatabaseConnection)> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    dotenvy::dotenv().ok();
    let mut cfg = configs::load_default().map(|c| c.database).unwrap_or_default();
    cfg.normalize_from_env();
    cfg.connect_timeout_secs = 2;
    if cfg.validate().is_err() {
        eprintln!("skipping: no usable database configuration");
        return None;
    }
    let db = match models::db::connect_with_config(&cfg).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skipping: connect failed: {e}");
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skipping: migration failed: {e}");
        return None;
    }
    let state = auth::ServerState {
        db: db.clone(),
        auth: auth::ServerAuthConfig { jwt_secret: TEST_SECRET.into(), token_ttl_hours: 1 },
    };
    Some((routes::build_router(cors(), state), db))
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(v).expect("serialize body"))
        }
        None => Body::empty(),
    };
    builder.body(body).expect("build request")
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Register a fresh user, returning its bearer token and id.
pub async fn register_user(app: &Router, email: &str) -> (String, uuid::Uuid) {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            Some(&json!({ "email": email, "password": "hunter22", "name": "Tester" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    let token = body["token"].as_str().expect("token").to_string();
    let id = body["user"]["id"].as_str().expect("user id").parse().expect("uuid");
    (token, id)
}

/// Flip a registered user's role to ADMIN, then log in again so the new
/// role lands in the token claims.
pub async fn admin_token(app: &Router, db: &DatabaseConnection, email: &str) -> String {
    use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

    let (_, _) = register_user(app, email).await;
    let user = models::user::Entity::find()
        .filter(models::user::Column::Email.eq(email))
        .one(db)
        .await
        .expect("query user")
        .expect("user exists");
    let mut am: models::user::ActiveModel = user.into();
    am.role = Set(models::user::ROLE_ADMIN.to_string());
    am.update(db).await.expect("promote user");

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(&json!({ "email": email, "password": "hunter22" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
    body["token"].as_str().expect("token").to_string()
}
