use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use crate::{app::AppState, data::Level, errors::ErrorResponse};

pub async fn list_levels_handler(State(state): State<AppState>) -> Result<Json<Vec<Level>>, ErrorResponse> {
    Ok(Json(state.store.levels().await?))
}

#[instrument(skip_all, fields(%id))]
pub async fn get_level_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Level>, ErrorResponse> {
    let not_found = || ErrorResponse::not_found("Level with id not found");
    let id: i32 = id.parse().map_err(|_| not_found())?;
    state.store.find_level(id).await?.map(Json).ok_or_else(not_found)
}
