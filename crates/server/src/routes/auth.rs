use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::user::ROLE_ADMIN;
use service::auth::domain::{
    AuthSession, AuthUser, ChangePasswordInput, LoginInput, RegisterInput, UpdateProfileInput,
};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::{verify_token, AuthService, AuthTokenConfig};

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
}

/// Verified token identity, injected by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthClaims {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
}

impl AuthClaims {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

fn auth_service(state: &ServerState) -> AuthService<SeaOrmAuthRepository> {
    AuthService::new(
        Arc::new(SeaOrmAuthRepository { db: state.db.clone() }),
        AuthTokenConfig {
            jwt_secret: state.auth.jwt_secret.clone(),
            token_ttl_hours: state.auth.token_ttl_hours,
        },
    )
}

#[utoipa::path(post, path = "/api/auth/register", tag = "auth",
    request_body = crate::openapi::RegisterRequest,
    responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<AuthSession>), JsonApiError> {
    let session = auth_service(&state).register(input).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthSession>, JsonApiError> {
    let session = auth_service(&state).login(input).await?;
    Ok(Json(session))
}

#[utoipa::path(get, path = "/api/auth/profile", tag = "auth",
    responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized")))]
pub async fn profile(
    State(state): State<ServerState>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<AuthUser>, JsonApiError> {
    let user = auth_service(&state).profile(claims.user_id).await?;
    Ok(Json(user))
}

#[utoipa::path(put, path = "/api/auth/profile", tag = "auth",
    responses((status = 200, description = "Updated user"), (status = 401, description = "Unauthorized")))]
pub async fn update_profile(
    State(state): State<ServerState>,
    Extension(claims): Extension<AuthClaims>,
    Json(input): Json<UpdateProfileInput>,
) -> Result<Json<AuthUser>, JsonApiError> {
    let user = auth_service(&state).update_profile(claims.user_id, input).await?;
    Ok(Json(user))
}

#[utoipa::path(put, path = "/api/auth/change-password", tag = "auth",
    responses((status = 200, description = "Password changed"), (status = 401, description = "Unauthorized")))]
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(claims): Extension<AuthClaims>,
    Json(input): Json<ChangePasswordInput>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    auth_service(&state).change_password(claims.user_id, input).await?;
    Ok(Json(serde_json::json!({ "message": "password updated" })))
}

fn is_whitelisted(path: &str, method: &axum::http::Method) -> bool {
    path == "/health"
        || path == "/api/health"
        || path == "/api/auth/login"
        || path == "/api/auth/register"
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
        || *method == axum::http::Method::OPTIONS
}

/// Global middleware: outside the whitelist, every request must carry
/// `Authorization: Bearer <token>`. The verified claims are made
/// available to handlers as a request extension.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    if is_whitelisted(&path, req.method()) {
        return Ok(next.run(req).await);
    }

    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = match header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) if !t.is_empty() => t,
        _ => {
            tracing::warn!(path = %path, "missing or malformed Authorization header");
            return Err(JsonApiError::new(StatusCode::UNAUTHORIZED, "authentication required"));
        }
    };

    let claims = verify_token(&state.auth.jwt_secret, token)
        .map_err(|_| JsonApiError::new(StatusCode::UNAUTHORIZED, "invalid or expired token"))?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| JsonApiError::new(StatusCode::UNAUTHORIZED, "invalid or expired token"))?;

    req.extensions_mut().insert(AuthClaims { user_id, email: claims.email, role: claims.role });
    Ok(next.run(req).await)
}

/// Route-level middleware for admin-only operations. Runs after the
/// bearer check, so the claims extension is always present.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, JsonApiError> {
    let is_admin = req
        .extensions()
        .get::<AuthClaims>()
        .map(AuthClaims::is_admin)
        .unwrap_or(false);
    if !is_admin {
        return Err(JsonApiError::new(StatusCode::FORBIDDEN, "admin access required"));
    }
    Ok(next.run(req).await)
}
