use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::config::{MasterKey, ServerConfig};
use crate::observability::sanitize_log_message;
use crate::services::SecretService;
use crate::storage::DbPool;

use super::{
    docs,
    handlers::{
        create_secret_handler, delete_secret_handler, detailed_health_handler,
        get_secret_handler, health_handler, update_secret_handler,
    },
};

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<SecretService>,
    pub master_key: MasterKey,
    pub pool: DbPool,
}

pub fn build_router(state: ApiState, server: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/secrets", post(create_secret_handler))
        .route("/secrets/{query}", get(get_secret_handler))
        .route("/secrets/{query}", put(update_secret_handler))
        .route("/secrets/{query}", delete(delete_secret_handler))
        .route("/healthz", get(health_handler))
        .route("/healthz/detailed", get(detailed_health_handler))
        .with_state(state)
        .merge(docs::docs_router())
        .layer(middleware::from_fn(set_security_headers))
        .layer(middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(server) {
        router = router.layer(cors);
    }

    router
}

/// Response headers applied to every route. Secret values pass through these
/// responses, so caching is disabled outright.
async fn set_security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=63072000; includeSubDomains"),
    );
    response
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().to_string();
    debug!("Request: {} {}", method, sanitize_log_message(&uri));
    next.run(request).await
}

fn build_cors_layer(config: &ServerConfig) -> Option<CorsLayer> {
    if !config.enable_cors {
        return None;
    }

    let cors = if config.cors_origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Some(cors.allow_methods(Any).allow_headers(Any))
}
