#![allow(dead_code)]

use bevy_ecs::{entity::Entity, event::Events, world::World};
use glam::{Vec2, Vec3};
use posedash::{
    error::GameError,
    events::{GameEvent, PhaseEvent, SessionEvent, WallReached},
    game::{
        phase::{PhaseClock, PhaseDurations},
        GameConfig,
    },
    systems::{
        joint, BlockStats, BodyFrame, BreakTimer, DeltaTime, Effects, GameSpeed, GlobalState, ObstacleSpawner, Obstacle, PlayerBundle,
        PoseSamples, Position, SessionRecord, SessionRng,
    },
};

/// Phase lengths short enough to play whole sessions in a test.
pub fn short_durations() -> PhaseDurations {
    PhaseDurations {
        active_secs: 3,
        preparation_secs: 2,
        freezing_secs: 4,
        freezing_step_secs: 1,
        break_secs: 2,
    }
}

pub fn short_config() -> GameConfig {
    GameConfig {
        durations: short_durations(),
        seed: 7,
        ..GameConfig::default()
    }
}

/// Creates a basic test world with required resources for ECS systems
pub fn create_test_world() -> World {
    let mut world = World::new();

    world.insert_resource(Events::<GameEvent>::default());
    world.insert_resource(Events::<GameError>::default());
    world.insert_resource(Events::<PhaseEvent>::default());
    world.insert_resource(Events::<WallReached>::default());
    world.insert_resource(Events::<SessionEvent>::default());

    world.insert_resource(PhaseClock::default());
    world.insert_resource(ObstacleSpawner::for_active_phase(PhaseDurations::default().active_secs));
    world.insert_resource(GameSpeed::default());
    world.insert_resource(SessionRng::seeded(1));
    world.insert_resource(GlobalState::default());
    world.insert_resource(PoseSamples::default());
    world.insert_resource(BlockStats::default());
    world.insert_resource(SessionRecord::default());
    world.insert_resource(BreakTimer::default());
    world.insert_resource(Effects::default());
    world.insert_resource(DeltaTime { seconds: 1.0 / 60.0 }); // 60 FPS

    world
}

/// Moves the world's clock forward until it reaches `phase`, discarding the transitions.
pub fn enter_phase(world: &mut World, phase: posedash::game::phase::Phase) {
    let mut clock = world.resource_mut::<PhaseClock>();
    while clock.phase() != phase {
        clock.advance();
    }
}

pub fn spawn_test_player(world: &mut World) -> Entity {
    world.spawn(PlayerBundle::default()).id()
}

pub fn spawn_test_obstacle(world: &mut World, z: f32) -> Entity {
    world
        .spawn((
            Obstacle {
                speed: 1.5,
                judged: false,
            },
            Position::at_z(z),
        ))
        .id()
}

/// Sends a game event to the world
pub fn send_game_event(world: &mut World, event: GameEvent) {
    let mut events = world.resource_mut::<Events<GameEvent>>();
    events.send(event);
}

pub fn send_phase_event(world: &mut World, event: PhaseEvent) {
    let mut events = world.resource_mut::<Events<PhaseEvent>>();
    events.send(event);
}

/// Collects all game events currently buffered in the world.
pub fn game_events(world: &World) -> Vec<GameEvent> {
    let events = world.resource::<Events<GameEvent>>();
    let mut cursor = events.get_cursor();
    cursor.read(events).copied().collect()
}

pub fn error_count(world: &World) -> usize {
    world.resource::<Events<GameError>>().len()
}

/// A body standing upright with its arms rotated `right` and `left` degrees up from hanging.
///
/// Its head sits at 40% of the depth image's height.
pub fn tracked_body(right: f32, left: f32) -> BodyFrame {
    let mut joints = [Vec3::ZERO; joint::COUNT];
    joints[joint::SPINE_BASE] = Vec3::new(0.0, 0.0, 2.0);
    joints[joint::SPINE_SHOULDER] = Vec3::new(0.0, 0.5, 2.0);
    joints[joint::HEAD] = Vec3::new(0.0, 0.7, 2.0);
    joints[joint::SHOULDER_RIGHT] = Vec3::new(0.2, 0.5, 2.0);
    joints[joint::SHOULDER_LEFT] = Vec3::new(-0.2, 0.5, 2.0);

    let arm = |degrees: f32, side: f32| {
        let radians = degrees.to_radians();
        Vec3::new(side * radians.sin(), -radians.cos(), 0.0) * 0.6
    };
    joints[joint::WRIST_RIGHT] = joints[joint::SHOULDER_RIGHT] + arm(right, 1.0);
    joints[joint::WRIST_LEFT] = joints[joint::SHOULDER_LEFT] + arm(left, -1.0);

    let mut depth = [Vec2::splat(0.5); joint::COUNT];
    depth[joint::HEAD] = Vec2::new(0.5, 0.4);

    BodyFrame { joints, depth }
}
