use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub store: &'static str,
}

/// `200` while the store answers, `503` otherwise.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.store.kind().as_str();
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { ok: true, store })),
        Err(e) => {
            warn!(error = %e, store, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(HealthResponse { ok: false, store }))
        }
    }
}
