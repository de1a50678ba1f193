use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};

use service::client::{ClientFilter, RawClientFilter};
use service::export::{export_clients, ExportFormat};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(get, path = "/api/export", tag = "clients",
    responses(
        (status = 200, description = "Export document (xlsx, csv or html report)"),
        (status = 401, description = "Unauthorized")))]
pub async fn export(
    State(state): State<ServerState>,
    Query(raw): Query<RawClientFilter>,
) -> Result<Response, JsonApiError> {
    let filter = ClientFilter::from_raw(&raw);
    let format = ExportFormat::parse(raw.format.as_deref());
    let payload = export_clients(&state.db, &filter, format, raw.fields.as_deref()).await?;

    let headers = [
        (header::CONTENT_TYPE, payload.content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", payload.filename),
        ),
    ];
    Ok((headers, payload.bytes).into_response())
}
