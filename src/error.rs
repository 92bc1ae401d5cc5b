//! Centralized error types for the game core.
//!
//! Systems never panic on a broken invariant; they write a [`GameError`] event instead,
//! which the owning [`crate::game::Game`] drains and logs after every frame.

use bevy_ecs::event::Event;
use posedash_common::ValidationError;

/// Main error type for the game core.
#[derive(thiserror::Error, Debug, Event)]
pub enum GameError {
    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    #[error("Invalid block result: {0}")]
    BlockResult(#[from] ValidationError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Errors related to entity queries.
#[derive(thiserror::Error, Debug)]
pub enum EntityError {
    #[error("Player entity not found")]
    PlayerNotFound,

    #[error("More than one player entity exists")]
    MultiplePlayers,
}

impl From<bevy_ecs::query::QuerySingleError> for EntityError {
    fn from(error: bevy_ecs::query::QuerySingleError) -> Self {
        match error {
            bevy_ecs::query::QuerySingleError::NoEntities(_) => EntityError::PlayerNotFound,
            bevy_ecs::query::QuerySingleError::MultipleEntities(_) => EntityError::MultiplePlayers,
        }
    }
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
