use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use models::provider as provider_model;
use service::provider::{self, ProviderDetail, ProviderInput, ProviderWithCount};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(get, path = "/api/providers", tag = "providers",
    responses((status = 200, description = "Providers with client counts"), (status = 401, description = "Unauthorized")))]
pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ProviderWithCount>>, JsonApiError> {
    let providers = provider::list_providers(&state.db).await?;
    Ok(Json(providers))
}

#[utoipa::path(get, path = "/api/providers/{id}", tag = "providers",
    params(("id" = Uuid, Path, description = "Provider id")),
    responses((status = 200, description = "Provider with clients"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProviderDetail>, JsonApiError> {
    let detail = provider::get_provider(&state.db, id).await?;
    Ok(Json(detail))
}

#[utoipa::path(post, path = "/api/providers", tag = "providers",
    request_body = crate::openapi::ProviderRequest,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")))]
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<ProviderInput>,
) -> Result<(StatusCode, Json<provider_model::Model>), JsonApiError> {
    let created = provider::create_provider(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/providers/{id}", tag = "providers",
    params(("id" = Uuid, Path, description = "Provider id")),
    request_body = crate::openapi::ProviderRequest,
    responses((status = 200, description = "Updated"), (status = 404, description = "Not Found"), (status = 403, description = "Forbidden")))]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ProviderInput>,
) -> Result<Json<provider_model::Model>, JsonApiError> {
    let updated = provider::update_provider(&state.db, id, input).await?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/api/providers/{id}", tag = "providers",
    params(("id" = Uuid, Path, description = "Provider id")),
    responses((status = 200, description = "Deleted"), (status = 400, description = "Still referenced"), (status = 403, description = "Forbidden")))]
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    provider::delete_provider(&state.db, id).await?;
    Ok(Json(serde_json::json!({ "message": "provider deleted" })))
}
