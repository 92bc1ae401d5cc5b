use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use posedash_common::GameplaySubmission;
use tracing::{info, instrument};

use crate::{app::AppState, auth::CurrentUser, data::Gameplay, errors::ErrorResponse, routes::LeaderboardQuery};

#[instrument(skip_all, fields(player = %user.username))]
pub async fn save_gameplay_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<GameplaySubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<Gameplay>), ErrorResponse> {
    let Json(submission) = payload?;
    submission
        .validate()
        .map_err(|e| ErrorResponse::bad_request(e.to_string()))?;

    let gameplay = state.store.save_gameplay(&user.username, submission).await?;
    info!(id = gameplay.id, score = gameplay.score, "Saved gameplay");
    Ok((StatusCode::CREATED, Json(gameplay)))
}

#[instrument(skip_all, fields(limit = query.limit()))]
pub async fn leaderboard_handler(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<Gameplay>>, ErrorResponse> {
    Ok(Json(state.store.top_gameplays(query.limit()).await?))
}

#[instrument(skip_all, fields(%id))]
pub async fn get_gameplay_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Gameplay>, ErrorResponse> {
    let not_found = || ErrorResponse::not_found("Gameplay not found");
    let id: i64 = id.parse().map_err(|_| not_found())?;
    state.store.find_gameplay(id).await?.map(Json).ok_or_else(not_found)
}

#[instrument(skip_all, fields(%username))]
pub async fn player_gameplays_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Gameplay>>, ErrorResponse> {
    if state.store.find_user(&username).await?.is_none() {
        return Err(ErrorResponse::not_found("User not found"));
    }
    Ok(Json(state.store.gameplays_by_player(&username).await?))
}
