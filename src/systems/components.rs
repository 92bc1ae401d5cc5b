use bevy_ecs::{bundle::Bundle, component::Component, resource::Resource};
use glam::Vec3;
use posedash_common::PostureAngles;
use rand::{rngs::SmallRng, SeedableRng};

use crate::{
    constants::{DEFAULT_GAME_SPEED, PLAYER_Z},
    systems::{
        player::{Animator, JumpState, Levitation},
        pose::ArmPose,
    },
};

/// A tag component for the runner.
#[derive(Default, Component)]
pub struct Player;

/// World-space position of a track entity.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec3);

impl Position {
    pub fn at_z(z: f32) -> Self {
        Self(Vec3::new(0.0, 0.0, z))
    }

    /// How far along z this position still is from the player. Negative once past it.
    pub fn distance_to_player(&self) -> f32 {
        PLAYER_Z - self.0.z
    }
}

/// One of the two ground segments that loop under the player.
#[derive(Component, Debug, Clone, Copy)]
pub struct GroundSegment;

#[derive(Component, Debug, Clone, Copy)]
pub struct Obstacle {
    /// Multiplier over the game speed.
    pub speed: f32,
    /// Set once the obstacle has passed the player and been scored.
    pub judged: bool,
}

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: Player,
    pub position: Position,
    pub jump: JumpState,
    pub animator: Animator,
    pub arms: ArmPose,
    pub levitation: Levitation,
}

impl Default for PlayerBundle {
    fn default() -> Self {
        Self {
            player: Player,
            position: Position::at_z(PLAYER_Z),
            jump: JumpState::default(),
            animator: Animator::default(),
            arms: ArmPose {
                angles: PostureAngles::new(0.0, 0.0),
                pose: None,
            },
            levitation: Levitation::default(),
        }
    }
}

/// Seconds elapsed since the previous frame.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct DeltaTime {
    pub seconds: f32,
}

/// Track speed in units per second.
#[derive(Resource, Debug, Clone, Copy)]
pub struct GameSpeed {
    pub current: f32,
    pub initial: f32,
}

impl Default for GameSpeed {
    fn default() -> Self {
        Self::new(DEFAULT_GAME_SPEED)
    }
}

impl GameSpeed {
    pub fn new(speed: f32) -> Self {
        Self {
            current: speed,
            initial: speed,
        }
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct GlobalState {
    pub exit: bool,
}

/// The session's random source, seeded so a session can be replayed.
#[derive(Resource, Debug, Clone)]
pub struct SessionRng(pub SmallRng);

impl SessionRng {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}
