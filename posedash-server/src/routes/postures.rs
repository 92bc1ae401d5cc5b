use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use crate::{app::AppState, data::Posture, errors::ErrorResponse};

pub async fn list_postures_handler(State(state): State<AppState>) -> Result<Json<Vec<Posture>>, ErrorResponse> {
    Ok(Json(state.store.postures().await?))
}

/// Posture ids are the lowercase semaphore letter names, but lookups ignore case.
#[instrument(skip_all, fields(%id))]
pub async fn get_posture_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Posture>, ErrorResponse> {
    state
        .store
        .find_posture(&id.to_lowercase())
        .await?
        .map(Json)
        .ok_or_else(|| ErrorResponse::not_found("Posture with id not found"))
}
