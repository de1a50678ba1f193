use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<String>,
    #[schema(value_type = String)]
    pub provider_id: Uuid,
    pub price: Option<f64>,
    pub date: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<String>,
    #[schema(value_type = Option<String>)]
    pub provider_id: Option<Uuid>,
    pub price: Option<f64>,
    pub date: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
pub struct BulkDeleteRequest {
    #[schema(value_type = Vec<String>)]
    pub ids: Vec<Uuid>,
}

#[derive(ToSchema)]
pub struct ProviderRequest {
    pub name: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::profile,
        crate::routes::auth::update_profile,
        crate::routes::auth::change_password,
        crate::routes::clients::list,
        crate::routes::clients::get,
        crate::routes::clients::create,
        crate::routes::clients::update,
        crate::routes::clients::delete,
        crate::routes::clients::bulk_delete,
        crate::routes::export::export,
        crate::routes::import::import,
        crate::routes::providers::list,
        crate::routes::providers::get,
        crate::routes::providers::create,
        crate::routes::providers::update,
        crate::routes::providers::delete,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            CreateClientRequest,
            UpdateClientRequest,
            BulkDeleteRequest,
            ProviderRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "clients"),
        (name = "providers")
    )
)]
pub struct ApiDoc;
