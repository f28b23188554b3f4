use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_handler,
        crate::api::handlers::health::detailed_health_handler,
        crate::api::handlers::secrets::create_secret_handler,
        crate::api::handlers::secrets::get_secret_handler,
        crate::api::handlers::secrets::update_secret_handler,
        crate::api::handlers::secrets::delete_secret_handler
    ),
    components(
        schemas(
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::secrets::CreateSecretRequest,
            crate::api::handlers::secrets::UpdateSecretRequest,
            crate::api::handlers::secrets::CreateSecretResponse,
            crate::api::handlers::secrets::SecretValueResponse,
            crate::api::handlers::secrets::MessageResponse
        )
    ),
    tags(
        (name = "health", description = "Service health and readiness probes"),
        (name = "secrets", description = "Encrypted secret storage and retrieval")
    )
)]
pub struct ApiDoc;

pub fn docs_router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}
