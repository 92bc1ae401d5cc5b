//! Posedash game core: a headless pose-matching obstacle runner.

pub mod constants;
pub mod error;
pub mod events;
pub mod game;
pub mod input;
pub mod systems;
