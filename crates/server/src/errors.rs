use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use models::errors::ModelError;
use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// Uniform error body: `{ "error": "..." }`. Internal detail is logged,
/// never sent to the client.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    fn internal(context: &str, detail: String) -> Self {
        error!(context, detail = %detail, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) | ServiceError::Model(ModelError::Validation(msg)) => {
                Self::new(StatusCode::BAD_REQUEST, msg)
            }
            // Conflicts come back as 400, matching the established API
            // contract rather than 409.
            ServiceError::Conflict(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            ServiceError::Db(detail) | ServiceError::Model(ModelError::Db(detail)) => {
                Self::internal("database", detail)
            }
            ServiceError::Render(detail) => Self::internal("render", detail),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::Conflict => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            AuthError::NotFound => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            AuthError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, err.to_string()),
            AuthError::HashError(d) | AuthError::TokenError(d) | AuthError::Repository(d) => {
                Self::internal("auth", format!("code={} {}", err.code(), d))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_expected_statuses() {
        let cases = [
            (ServiceError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Conflict("dup".into()), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("client"), StatusCode::NOT_FOUND),
            (ServiceError::Db("secret detail".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let api: JsonApiError = err.into();
            assert_eq!(api.status, status);
        }
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let api: JsonApiError = ServiceError::Db("password=hunter2".into()).into();
        assert!(!api.message.contains("hunter2"));
    }

    #[test]
    fn auth_unauthorized_is_401() {
        let api: JsonApiError = AuthError::Unauthorized.into();
        assert_eq!(api.status, StatusCode::UNAUTHORIZED);
    }
}
