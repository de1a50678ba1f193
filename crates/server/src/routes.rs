use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

pub mod auth;
pub mod clients;
pub mod export;
pub mod import;
pub mod providers;

use auth::ServerState;

#[utoipa::path(get, path = "/api/health", tag = "health",
    responses((status = 200, description = "Service is up")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "OK" })
}

/// Build the full application router: public health and docs, the
/// authenticated `/api` surface, and admin-only provider mutations.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/profile", get(auth::profile).put(auth::update_profile))
        .route("/auth/change-password", put(auth::change_password))
        .route("/clients", get(clients::list).post(clients::create))
        .route("/clients/delete-multiple", post(clients::bulk_delete))
        .route(
            "/clients/:id",
            get(clients::get).put(clients::update).delete(clients::delete),
        )
        .route("/export", get(export::export))
        .route("/import", post(import::import))
        .route("/providers", get(providers::list))
        .route("/providers/:id", get(providers::get))
        .merge(
            // Mutating the provider registry is admin-only.
            Router::new()
                .route("/providers", post(providers::create))
                .route(
                    "/providers/:id",
                    put(providers::update).delete(providers::delete),
                )
                .route_layer(middleware::from_fn(auth::require_admin)),
        );

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .merge(
            SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi()),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token_state,
        ))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
