// Index views: status, stats and the error probes

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common::{ApiError, ErrorResponse};
use crate::app::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "OK")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    /// Number of registered users
    pub users: usize,
}

/// Index routes, relative to /api/v1
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(status))
        .route("/stats", get(stats))
        .route("/unauthorized", get(unauthorized))
        .route("/forbidden", get(forbidden))
}

/// GET /api/v1/status - Liveness probe
#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses((status = 200, description = "API is up", body = StatusResponse)),
    tag = "index"
)]
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "OK".to_string(),
    })
}

/// GET /api/v1/stats - Object counts
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Object counts", body = StatsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "index"
)]
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        users: state.db.count_users().await,
    })
}

/// GET /api/v1/unauthorized - Always answers 401
#[utoipa::path(
    get,
    path = "/api/v1/unauthorized",
    responses((status = 401, description = "Unauthorized", body = ErrorResponse)),
    tag = "index"
)]
pub async fn unauthorized() -> ApiError {
    ApiError::Unauthorized
}

/// GET /api/v1/forbidden - Always answers 403
#[utoipa::path(
    get,
    path = "/api/v1/forbidden",
    responses((status = 403, description = "Forbidden", body = ErrorResponse)),
    tag = "index"
)]
pub async fn forbidden() -> ApiError {
    ApiError::Forbidden
}

/// Fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

