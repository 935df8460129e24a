use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use amora_shared::types::HealthResponse;

use crate::AppState;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        "amora-matching",
        env!("CARGO_PKG_VERSION"),
    ))
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
