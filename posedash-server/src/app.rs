use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use cookie::{Cookie, Key};
use jsonwebtoken::{DecodingKey, EncodingKey};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth,
    config::Config,
    data::Store,
    routes::{frames, gameplays, health, levels, postures, users},
    session::{self, SessionError},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
    pub jwt_encoding_key: Arc<EncodingKey>,
    pub jwt_decoding_key: Arc<DecodingKey>,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        let jwt_secret = config.jwt_secret.clone();
        let cookie_key = session::cookie_key(&config.cookie_secret);

        Self {
            config: Arc::new(config),
            store,
            jwt_encoding_key: Arc::new(EncodingKey::from_secret(jwt_secret.as_bytes())),
            jwt_decoding_key: Arc::new(DecodingKey::from_secret(jwt_secret.as_bytes())),
            cookie_key,
        }
    }

    /// A freshly signed session cookie for `username`.
    pub fn issue_session(&self, username: &str) -> Result<Cookie<'static>, SessionError> {
        let jwt = session::create_token(username, &self.jwt_encoding_key)?;
        session::signed_cookie(jwt, &self.cookie_key, self.config.secure_cookies)
    }
}

pub fn create_router(state: AppState) -> Router {
    let users = Router::new()
        .route("/register", post(users::register_handler))
        .route("/login", post(users::login_handler))
        .route("/logout", post(users::logout_handler))
        .route("/current", get(users::current_user_handler))
        .route("/leaderboards", get(users::leaderboard_handler))
        .route("/{username}", get(users::get_user_handler).put(users::update_user_handler));

    let gameplays = Router::new()
        .route("/", post(gameplays::save_gameplay_handler))
        .route("/leaderboards", get(gameplays::leaderboard_handler))
        .route("/{id}", get(gameplays::get_gameplay_handler))
        .route("/player/{username}", get(gameplays::player_gameplays_handler));

    let levels = Router::new()
        .route("/", get(levels::list_levels_handler))
        .route("/{id}", get(levels::get_level_handler));

    let frames = Router::new()
        .route("/", get(frames::list_frames_handler))
        .route("/{id}", get(frames::get_frame_handler))
        .route("/level/{level_id}", get(frames::level_frames_handler))
        .route("/level/{level_id}/random", get(frames::random_level_frame_handler));

    let postures = Router::new()
        .route("/", get(postures::list_postures_handler))
        .route("/{id}", get(postures::get_posture_handler));

    Router::new()
        .route("/api/health", get(health::health_handler))
        // Submitting clients post to the collection with a trailing slash
        .route("/api/v1/gameplays/", post(gameplays::save_gameplay_handler))
        .nest("/api/v1/users", users)
        .nest("/api/v1/gameplays", gameplays)
        .nest("/api/v1/levels", levels)
        .nest("/api/v1/frames", frames)
        .nest("/api/v1/postures", postures)
        .layer(middleware::from_fn_with_state(state.clone(), auth::authenticate))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
