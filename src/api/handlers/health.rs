//! Health check endpoints for monitoring and readiness probes

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::api::routes::ApiState;
use crate::storage::{check_connection, get_pool_stats};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status ("ok" or "degraded")
    #[schema(example = "ok")]
    pub status: String,

    /// Failure details, or "none" when healthy
    #[schema(example = "none")]
    pub details: String,

    /// Time the check ran
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            details: "none".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn degraded(details: &str) -> Self {
        Self {
            status: "degraded".to_string(),
            details: details.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Liveness check
///
/// Returns 200 OK when the API server is operational.
/// This endpoint is unauthenticated and suitable for:
/// - Kubernetes liveness/readiness probes
/// - Docker healthchecks
/// - Load balancer health checks
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_handler() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse::ok()))
}

/// Readiness check including database connectivity
#[utoipa::path(
    get,
    path = "/healthz/detailed",
    tag = "health",
    responses(
        (status = 200, description = "Service and database are healthy", body = HealthResponse),
        (status = 500, description = "Database is unreachable", body = HealthResponse)
    )
)]
pub async fn detailed_health_handler(
    State(state): State<ApiState>,
) -> (StatusCode, Json<HealthResponse>) {
    match check_connection(&state.pool).await {
        Ok(()) => {
            let stats = get_pool_stats(&state.pool);
            debug!(pool_size = stats.size, idle = stats.idle, "Database pool status");
            (StatusCode::OK, Json(HealthResponse::ok()))
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse::degraded("Database connection failed")),
        ),
    }
}
