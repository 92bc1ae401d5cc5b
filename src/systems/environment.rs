//! Ground scrolling and the obstacle lane.

use bevy_ecs::{
    entity::Entity,
    event::EventWriter,
    query::{With, Without},
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
    world::World,
};
use tracing::debug;

use crate::{
    constants::{
        GROUND_LOOP_Z, GROUND_SEGMENT_LENGTH, OBSTACLE_CLEARANCE, OBSTACLE_DESPAWN_Z, OBSTACLE_SPAWN_GAP, OBSTACLE_SPEED,
        PLAYER_Z, REFERENCE_GAME_SPEED, SPAWN_Z,
    },
    error::{EntityError, GameError},
    events::GameEvent,
    game::phase::{Phase, PhaseClock},
    systems::components::{DeltaTime, GameSpeed, GroundSegment, Obstacle, Player, Position},
};

/// Seconds an obstacle needs from spawn to despawn at the reference speed.
pub fn obstacle_travel_time() -> f32 {
    (OBSTACLE_DESPAWN_Z - SPAWN_Z).abs() / (REFERENCE_GAME_SPEED * OBSTACLE_SPEED)
}

/// Paces obstacle spawns over an active phase.
#[derive(Resource, Debug, Clone)]
pub struct ObstacleSpawner {
    /// How many obstacles one active phase should see.
    pub target: u32,
    pub spawned: u32,
    /// Minimum seconds between two spawns.
    pub min_interval: f32,
    /// Seconds since the last spawn, or `None` if nothing spawned yet this phase.
    pub since_last: Option<f32>,
}

impl ObstacleSpawner {
    pub fn for_active_phase(active_secs: u32) -> Self {
        let travel = obstacle_travel_time();
        Self {
            target: (active_secs as f32 / (3.0 * travel)).floor() as u32,
            spawned: 0,
            min_interval: travel + OBSTACLE_SPAWN_GAP,
            since_last: None,
        }
    }

    /// Starts counting from zero for a new active phase.
    pub fn rearm(&mut self) {
        self.spawned = 0;
        self.since_last = None;
    }

    /// Advances the spawn timer, returning true when an obstacle should spawn now.
    pub fn poll(&mut self, dt: f32) -> bool {
        if let Some(since_last) = self.since_last.as_mut() {
            *since_last += dt;
        }
        if self.spawned >= self.target {
            return false;
        }

        let ready = self.since_last.is_none_or(|since_last| since_last >= self.min_interval);
        if ready {
            self.spawned += 1;
            self.since_last = Some(0.0);
        }
        ready
    }
}

/// Spawns the two ground segments back to back.
pub fn spawn_ground(world: &mut World) {
    world.spawn((GroundSegment, Position::at_z(0.0)));
    world.spawn((GroundSegment, Position::at_z(-GROUND_SEGMENT_LENGTH)));
}

pub fn ground_scroll_system(
    clock: Res<PhaseClock>,
    dt: Res<DeltaTime>,
    speed: Res<GameSpeed>,
    mut segments: Query<&mut Position, With<GroundSegment>>,
) {
    if !clock.phase().is_running() {
        return;
    }

    for mut position in segments.iter_mut() {
        position.0.z += speed.current * dt.seconds;
    }

    let rearmost = segments.iter().map(|p| p.0.z).fold(f32::INFINITY, f32::min);
    for mut position in segments.iter_mut() {
        if position.0.z > GROUND_LOOP_Z {
            position.0.z = rearmost - GROUND_SEGMENT_LENGTH;
        }
    }
}

pub fn obstacle_spawn_system(
    mut commands: Commands,
    clock: Res<PhaseClock>,
    dt: Res<DeltaTime>,
    mut spawner: ResMut<ObstacleSpawner>,
) {
    if clock.phase() != Phase::Active {
        return;
    }

    if spawner.poll(dt.seconds) {
        debug!(
            spawned = spawner.spawned,
            target = spawner.target,
            block = clock.block(),
            "Spawning obstacle"
        );
        commands.spawn((
            Obstacle {
                speed: OBSTACLE_SPEED,
                judged: false,
            },
            Position::at_z(SPAWN_Z),
        ));
    }
}

pub fn obstacle_movement_system(
    clock: Res<PhaseClock>,
    dt: Res<DeltaTime>,
    speed: Res<GameSpeed>,
    mut obstacles: Query<(&Obstacle, &mut Position)>,
) {
    if !clock.phase().is_running() {
        return;
    }

    for (obstacle, mut position) in obstacles.iter_mut() {
        position.0.z += speed.current * dt.seconds * obstacle.speed;
    }
}

/// Removes obstacles that have left the track. Runs after judging so none is missed.
pub fn obstacle_despawn_system(mut commands: Commands, obstacles: Query<(Entity, &Position), With<Obstacle>>) {
    for (entity, position) in obstacles.iter() {
        if position.0.z > OBSTACLE_DESPAWN_Z {
            commands.entity(entity).despawn();
        }
    }
}

/// Scores each obstacle once, the first frame it reaches the player.
pub fn obstacle_judge_system(
    player: Query<&Position, With<Player>>,
    mut obstacles: Query<(&mut Obstacle, &Position), Without<Player>>,
    mut events: EventWriter<GameEvent>,
    mut errors: EventWriter<GameError>,
) {
    let player = match player.single() {
        Ok(position) => position,
        Err(e) => {
            errors.write(EntityError::from(e).into());
            return;
        }
    };

    for (mut obstacle, position) in obstacles.iter_mut() {
        if obstacle.judged || position.0.z < PLAYER_Z {
            continue;
        }

        obstacle.judged = true;
        let cleared = player.0.y > OBSTACLE_CLEARANCE;
        debug!(cleared, height = player.0.y, "Obstacle passed the player");
        events.write(GameEvent::ObstaclePassed { cleared });
    }
}
