use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::{EventReader, EventWriter},
    query::With,
    system::{Commands, Query, Res, ResMut},
};
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use crate::{
    constants::{SPAWN_Z, WALL_TRIGGER_DISTANCE},
    error::GameError,
    events::{PhaseEvent, WallReached},
    game::phase::{Phase, PhaseClock},
    systems::{
        components::{DeltaTime, GameSpeed, Position, SessionRng},
        pose::{Pose, WALL_POSES},
    },
};

/// A wall with a cut-out the player has to match.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub target: Pose,
    /// Cleared once the wall has stopped in front of the player.
    pub moving: bool,
}

/// Spawns a wall with a random target pose whenever a preparation phase begins.
pub fn spawn_wall_system(
    mut commands: Commands,
    mut phase_events: EventReader<PhaseEvent>,
    mut rng: ResMut<SessionRng>,
    existing: Query<Entity, With<Wall>>,
    mut errors: EventWriter<GameError>,
) {
    let Some(block) = phase_events.read().fold(None, |last, event| match *event {
        PhaseEvent::Entered {
            to: Phase::Preparation,
            block,
            ..
        } => Some(block),
        _ => last,
    }) else {
        return;
    };

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let Some(&target) = WALL_POSES.choose(&mut rng.0) else {
        errors.write(GameError::InvalidState("no wall poses to choose from".to_string()));
        return;
    };
    info!(%target, block, "Spawning pose wall");
    commands.spawn((Wall { target, moving: true }, Position::at_z(SPAWN_Z)));
}

/// Moves the wall towards the player and fires [`WallReached`] once it is close enough.
pub fn wall_movement_system(
    clock: Res<PhaseClock>,
    dt: Res<DeltaTime>,
    speed: Res<GameSpeed>,
    mut walls: Query<(&mut Wall, &mut Position)>,
    mut reached: EventWriter<WallReached>,
) {
    if clock.phase() != Phase::Preparation {
        return;
    }

    for (mut wall, mut position) in walls.iter_mut() {
        if !wall.moving {
            continue;
        }

        position.0.z += speed.current * dt.seconds;
        let distance = position.distance_to_player();
        if distance <= WALL_TRIGGER_DISTANCE {
            debug!(distance, "Wall reached the player");
            wall.moving = false;
            reached.write(WallReached);
        }
    }
}
