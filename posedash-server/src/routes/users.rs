use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    app::AppState,
    auth::CurrentUser,
    data::{NewUser, Role, User, UserUpdate},
    errors::ErrorResponse,
    password::{hash_password, verify_password, MIN_PASSWORD_LENGTH},
    routes::LeaderboardQuery,
    session,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub age: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Trims a required text field, treating blank as missing.
fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// `201` with the user as body and a fresh session cookie.
fn signed_in(state: &AppState, user: &User) -> Result<Response, ErrorResponse> {
    let mut response = (StatusCode::CREATED, Json(user)).into_response();
    session::append_cookie(&mut response, &state.issue_session(&user.username)?)?;
    Ok(response)
}

#[instrument(skip_all)]
pub async fn register_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, ErrorResponse> {
    let Json(request) = payload?;
    let (Some(username), Some(name), Some(password)) = (
        required(request.username),
        required(request.name),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ErrorResponse::bad_request("Missing required fields"));
    };

    if state.store.find_user(&username).await?.is_some() {
        return Err(ErrorResponse::bad_request("User already exists"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ErrorResponse::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if request.age.is_some_and(|age| age < 0) {
        return Err(ErrorResponse::bad_request("Age must not be negative"));
    }

    let password_hash = hash_password(password, state.config.bcrypt_cost).await?;
    let user = state
        .store
        .create_user(NewUser {
            name,
            username,
            password_hash,
            age: request.age,
            role: request.role.unwrap_or_default(),
        })
        .await?;

    info!(username = %user.username, role = ?user.role, "Registered user");
    signed_in(&state, &user)
}

#[instrument(skip_all)]
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ErrorResponse> {
    let Json(request) = payload?;
    let invalid = || ErrorResponse::bad_request("Invalid credentials");

    let (Some(username), Some(password)) = (required(request.username), request.password) else {
        return Err(invalid());
    };
    let Some(user) = state.store.find_user(&username).await? else {
        debug!(%username, "Login for unknown user");
        return Err(invalid());
    };
    if !verify_password(password, user.password_hash.clone()).await? {
        debug!(%username, "Login with wrong password");
        return Err(invalid());
    }

    info!(%username, "Logged in");
    signed_in(&state, &user)
}

#[instrument(skip_all)]
pub async fn logout_handler(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
) -> Result<Response, ErrorResponse> {
    let Some(CurrentUser(user)) = user else {
        return Err(ErrorResponse::bad_request("There is no logged in user"));
    };

    let mut response = (
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User logged out!",
        }),
    )
        .into_response();
    session::append_cookie(&mut response, &session::removal_cookie(state.config.secure_cookies))?;

    info!(username = %user.username, "Logged out");
    Ok(response)
}

pub async fn current_user_handler(user: Option<CurrentUser>) -> Json<Option<User>> {
    Json(user.map(|CurrentUser(user)| user))
}

#[instrument(skip_all, fields(limit = query.limit()))]
pub async fn leaderboard_handler(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<User>>, ErrorResponse> {
    Ok(Json(state.store.top_users(query.limit()).await?))
}

#[instrument(skip_all, fields(%username))]
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<User>, ErrorResponse> {
    state
        .store
        .find_user(&username)
        .await?
        .map(Json)
        .ok_or_else(|| ErrorResponse::not_found("User not found"))
}

#[instrument(skip_all, fields(%username))]
pub async fn update_user_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    user: Option<CurrentUser>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<User>, ErrorResponse> {
    if user.as_ref().map(|CurrentUser(u)| u.username.as_str()) != Some(username.as_str()) {
        return Err(ErrorResponse::forbidden("You do not have permission to update this user"));
    }

    let Json(update) = payload?;
    if update.age.is_some_and(|age| age < 0) {
        return Err(ErrorResponse::bad_request("Age must not be negative"));
    }
    if update.current_level.is_some_and(|level| level < 1) {
        return Err(ErrorResponse::bad_request("Current level must be at least 1"));
    }
    if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(ErrorResponse::bad_request("Name must not be empty"));
    }

    let updated = state
        .store
        .update_user(&username, update)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("User not found"))?;
    info!("Updated user");
    Ok(Json(updated))
}
