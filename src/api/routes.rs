//! Route Definitions

use super::handlers::*;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Build the API router
pub fn create_router(state: Arc<AppState>, enable_metrics: bool) -> Router {
    let router: Router<Arc<AppState>> = Router::new()
        .route("/health", get(health_handler))
        .route("/roll-dice", get(roll_dice_handler));

    let router = if enable_metrics {
        router.route("/metrics", get(metrics_handler))
    } else {
        router
    };

    router.fallback(not_found_handler).with_state(state)
}
