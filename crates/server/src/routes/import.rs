use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use service::import::{import_clients, ImportReport};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(post, path = "/api/import", tag = "clients",
    responses(
        (status = 200, description = "Per-row import report"),
        (status = 400, description = "Missing or unreadable file")))]
pub async fn import(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>, JsonApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| JsonApiError::new(StatusCode::BAD_REQUEST, "file part has no filename"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) = upload
        .ok_or_else(|| JsonApiError::new(StatusCode::BAD_REQUEST, "no file uploaded"))?;
    let report = import_clients(&state.db, &filename, bytes).await?;
    Ok(Json(report))
}
