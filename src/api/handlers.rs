//! Request Handlers

use super::{
    errors::ApiError,
    middleware::RequestId,
    models::*,
    monitoring::MetricsRegistry,
};
use crate::games::provider::RandomnessProvider;
use axum::{
    extract::State,
    http::{header, Uri},
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;
use tracing::debug;

/// Shared application state
pub struct AppState {
    pub provider: Arc<dyn RandomnessProvider>,
    pub metrics: Arc<MetricsRegistry>,
}

/// Health check handler
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
    })
}

/// Roll one die
/// GET /roll-dice
pub async fn roll_dice_handler(State(state): State<Arc<AppState>>) -> Json<RollDiceResponse> {
    let face = state.provider.roll();
    state.metrics.record_roll(face);
    debug!("Rolled {}", face);

    Json(RollDiceResponse { dice: face.into() })
}

/// Prometheus text exposition
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.to_prometheus_format(),
    )
}

/// Fallback for unknown routes
pub async fn not_found_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> ApiError {
    state.metrics.record_error();
    ApiError::not_found(request_id.0, format!("No route for {}", uri.path()))
}
