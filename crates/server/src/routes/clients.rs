use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use service::client::{
    self, ClientFilter, ClientPage, ClientWithProvider, CreateClientInput, RawClientFilter,
    UpdateClientInput,
};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(get, path = "/api/clients", tag = "clients",
    responses((status = 200, description = "Paginated client list"), (status = 401, description = "Unauthorized")))]
pub async fn list(
    State(state): State<ServerState>,
    Query(raw): Query<RawClientFilter>,
) -> Result<Json<ClientPage>, JsonApiError> {
    let filter = ClientFilter::from_raw(&raw);
    let pagination = ClientFilter::pagination(&raw);
    let page = client::list_clients(&state.db, &filter, pagination).await?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/api/clients/{id}", tag = "clients",
    params(("id" = Uuid, Path, description = "Client id")),
    responses((status = 200, description = "Client with provider"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientWithProvider>, JsonApiError> {
    let found = client::get_client_by_id(&state.db, id).await?;
    Ok(Json(found))
}

#[utoipa::path(post, path = "/api/clients", tag = "clients",
    request_body = crate::openapi::CreateClientRequest,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request")))]
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<CreateClientInput>,
) -> Result<(StatusCode, Json<ClientWithProvider>), JsonApiError> {
    let created = client::create_client(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/clients/{id}", tag = "clients",
    params(("id" = Uuid, Path, description = "Client id")),
    request_body = crate::openapi::UpdateClientRequest,
    responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateClientInput>,
) -> Result<Json<ClientWithProvider>, JsonApiError> {
    let updated = client::update_client(&state.db, id, input).await?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/api/clients/{id}", tag = "clients",
    params(("id" = Uuid, Path, description = "Client id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    client::delete_client(&state.db, id).await?;
    Ok(Json(serde_json::json!({ "message": "client deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteInput {
    pub ids: Vec<Uuid>,
}

#[utoipa::path(post, path = "/api/clients/delete-multiple", tag = "clients",
    request_body = crate::openapi::BulkDeleteRequest,
    responses((status = 200, description = "Deleted count"), (status = 400, description = "Bad Request")))]
pub async fn bulk_delete(
    State(state): State<ServerState>,
    Json(input): Json<BulkDeleteInput>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    if input.ids.is_empty() {
        return Err(JsonApiError::new(StatusCode::BAD_REQUEST, "ids must not be empty"));
    }
    let count = client::delete_many_clients(&state.db, &input.ids).await?;
    Ok(Json(serde_json::json!({ "message": "clients deleted", "count": count })))
}
