use axum::{
    extract::{Path, State},
    Json,
};
use rand::seq::IndexedRandom;
use tracing::instrument;

use crate::{app::AppState, data::Frame, errors::ErrorResponse};

fn level_does_not_exist() -> ErrorResponse {
    ErrorResponse::not_found("Level does not exist")
}

/// Frames referencing the level, or 404 when none do.
async fn frames_for(state: &AppState, level_id: &str) -> Result<Vec<Frame>, ErrorResponse> {
    let level_id: i32 = level_id.parse().map_err(|_| level_does_not_exist())?;
    let frames = state.store.frames_for_level(level_id).await?;
    if frames.is_empty() {
        return Err(level_does_not_exist());
    }
    Ok(frames)
}

pub async fn list_frames_handler(State(state): State<AppState>) -> Result<Json<Vec<Frame>>, ErrorResponse> {
    Ok(Json(state.store.frames().await?))
}

#[instrument(skip_all, fields(%id))]
pub async fn get_frame_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Frame>, ErrorResponse> {
    let not_found = || ErrorResponse::not_found("Frame with id not found");
    let id: i64 = id.parse().map_err(|_| not_found())?;
    state.store.find_frame(id).await?.map(Json).ok_or_else(not_found)
}

#[instrument(skip_all, fields(%level_id))]
pub async fn level_frames_handler(
    State(state): State<AppState>,
    Path(level_id): Path<String>,
) -> Result<Json<Vec<Frame>>, ErrorResponse> {
    Ok(Json(frames_for(&state, &level_id).await?))
}

#[instrument(skip_all, fields(%level_id))]
pub async fn random_level_frame_handler(
    State(state): State<AppState>,
    Path(level_id): Path<String>,
) -> Result<Json<Frame>, ErrorResponse> {
    let frames = frames_for(&state, &level_id).await?;
    frames
        .choose(&mut rand::rng())
        .cloned()
        .map(Json)
        .ok_or_else(level_does_not_exist)
}
