//! Resolves the `token` cookie into the requesting [`User`].

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::{app::AppState, data::User, errors::ErrorResponse, session};

/// The logged-in user, placed in the request extensions by [`authenticate`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ErrorResponse::unauthorized("You must be logged in"))
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned())
    }
}

fn reject(state: &AppState, msg: &str) -> Response {
    let mut response = ErrorResponse::forbidden(msg).into_response();
    if let Err(e) = session::append_cookie(&mut response, &session::removal_cookie(state.config.secure_cookies)) {
        warn!(error = %e, "Failed to clear session cookie");
    }
    response
}

/// Middleware run on every request.
///
/// Without a validly signed cookie the request continues anonymously. A signed cookie holding
/// a bad JWT, or naming a user that no longer exists, is cleared and the request refused.
/// Otherwise the session is renewed on the response.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(token) = session::read_token(request.headers(), &state.cookie_key) else {
        return next.run(request).await;
    };

    let Some(claims) = session::decode_token(&token, &state.jwt_decoding_key) else {
        return reject(&state, "Invalid token");
    };

    let user = match state.store.find_user(&claims.username).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!(username = %claims.username, "Session names an unknown user");
            return reject(&state, "Unknown user");
        }
        Err(e) => return ErrorResponse::from(e).into_response(),
    };

    let username = user.username.clone();
    request.extensions_mut().insert(CurrentUser(user));
    let mut response = next.run(request).await;

    // Login and logout set the cookie themselves
    if !session::sets_token(&response) {
        if let Err(e) = state.issue_session(&username).and_then(|cookie| session::append_cookie(&mut response, &cookie)) {
            warn!(error = %e, "Failed to renew session cookie");
        }
    }
    response
}
