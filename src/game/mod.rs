//! This module contains the main game logic and state.

use bevy_ecs::{
    event::{Event, Events},
    query::With,
    resource::Resource,
    schedule::{IntoScheduleConfigs, Schedule},
    world::World,
};
use posedash_common::{GameplaySubmission, BLOCK_COUNT};
use tracing::{debug, error, instrument, trace, warn};

use crate::{
    constants::DEFAULT_GAME_SPEED,
    error::{GameError, GameResult},
    events::{GameCommand, GameEvent, PhaseEvent, SessionEvent, WallReached},
    input::{exit_system, input_system, Bindings, PendingKeys},
    systems::{
        animation_system, block_summary_system, break_reset_system, effects_system, freeze_player_system,
        ground_scroll_system, jump_command_system, jump_physics_system, levitation_system, obstacle_despawn_system,
        obstacle_judge_system, obstacle_movement_system, obstacle_spawn_system, obstacle_stats_system,
        phase_tick_system, pose_command_system, pose_sampling_system, rearm_spawner_system, spawn_ground,
        spawn_wall_system, wall_movement_system, wall_trigger_system, AnimationClip, Animator,
        BlockStats, BodyFrame, BreakTimer, DeltaTime, Effects, GameSpeed, GlobalState, JumpDetector, Obstacle,
        ObstacleSpawner, Player, PlayerBundle, PoseSamples, Position, SessionRecord, SessionRng, Wall,
    },
};

pub mod phase;

use phase::{Phase, PhaseClock, PhaseDurations, SessionProgress};

/// Tunables for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub durations: PhaseDurations,
    pub block_count: u8,
    pub speed: f32,
    /// Seeds wall pose selection.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            durations: PhaseDurations::default(),
            block_count: BLOCK_COUNT,
            speed: DEFAULT_GAME_SPEED,
            seed: 0,
        }
    }
}

impl GameConfig {
    fn validate(&self) -> GameResult<()> {
        if self.block_count == 0 {
            return Err(GameError::Config("a session needs at least one block".to_string()));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(GameError::Config(format!("game speed must be positive, got {}", self.speed)));
        }
        Ok(())
    }
}

/// Jump detection state for a tracked body.
#[derive(Resource, Debug, Clone, Default)]
struct BodyTracker(JumpDetector);

/// One play session.
///
/// Owns the ECS world and two schedules: the frame schedule runs once per rendered frame with
/// the frame's delta, the tick schedule runs once per second and drives the phase clock.
pub struct Game {
    pub world: World,
    pub frame_schedule: Schedule,
    pub tick_schedule: Schedule,
    tick_accumulator: f32,
    session_events: Vec<SessionEvent>,
}

impl Game {
    #[instrument(skip_all, fields(blocks = config.block_count, seed = config.seed))]
    pub fn new(config: GameConfig) -> GameResult<Game> {
        config.validate()?;

        let mut world = World::default();
        world.insert_resource(Events::<GameEvent>::default());
        world.insert_resource(Events::<GameError>::default());
        world.insert_resource(Events::<PhaseEvent>::default());
        world.insert_resource(Events::<WallReached>::default());
        world.insert_resource(Events::<SessionEvent>::default());

        world.insert_resource(PhaseClock::new(config.durations, config.block_count));
        world.insert_resource(ObstacleSpawner::for_active_phase(config.durations.active_secs));
        world.insert_resource(GameSpeed::new(config.speed));
        world.insert_resource(SessionRng::seeded(config.seed));
        world.insert_resource(DeltaTime::default());
        world.insert_resource(GlobalState::default());
        world.insert_resource(Bindings::default());
        world.insert_resource(PendingKeys::default());
        world.insert_resource(PoseSamples::default());
        world.insert_resource(BlockStats::default());
        world.insert_resource(SessionRecord::default());
        world.insert_resource(BreakTimer::default());
        world.insert_resource(Effects::default());
        world.insert_resource(BodyTracker::default());

        spawn_ground(&mut world);
        world.spawn(PlayerBundle::default());

        let mut tick_schedule = Schedule::default();
        tick_schedule.add_systems(phase_tick_system);

        let mut frame_schedule = Schedule::default();
        frame_schedule.add_systems(
            (
                (
                    input_system,
                    exit_system,
                    wall_trigger_system,
                    rearm_spawner_system,
                    spawn_wall_system,
                    freeze_player_system,
                    block_summary_system,
                    break_reset_system,
                    jump_command_system,
                    pose_command_system,
                )
                    .chain(),
                (
                    ground_scroll_system,
                    obstacle_spawn_system,
                    obstacle_movement_system,
                    wall_movement_system,
                    jump_physics_system,
                    obstacle_judge_system,
                    obstacle_despawn_system,
                    obstacle_stats_system,
                    animation_system,
                    levitation_system,
                    pose_sampling_system,
                    effects_system,
                )
                    .chain(),
            )
                .chain(),
        );

        debug!("Game session created");
        Ok(Game {
            world,
            frame_schedule,
            tick_schedule,
            tick_accumulator: 0.0,
            session_events: Vec::new(),
        })
    }

    /// Runs one frame with the given delta in seconds.
    ///
    /// Returns true if the game should exit.
    pub fn frame(&mut self, dt: f32) -> bool {
        self.world.insert_resource(DeltaTime { seconds: dt });
        self.frame_schedule.run(&mut self.world);

        let session: Vec<SessionEvent> = self.world.resource_mut::<Events<SessionEvent>>().drain().collect();
        self.session_events.extend(session);

        for error in self.world.resource_mut::<Events<GameError>>().drain() {
            warn!(%error, "System reported an error");
        }

        update_events::<GameEvent>(&mut self.world);
        update_events::<PhaseEvent>(&mut self.world);
        update_events::<WallReached>(&mut self.world);

        self.world.resource::<GlobalState>().exit
    }

    /// Counts the phase clock down by one second.
    pub fn tick(&mut self) {
        self.tick_schedule.run(&mut self.world);
    }

    /// Advances the session by `dt` seconds: one frame, plus a tick for every whole second
    /// accumulated since the last one.
    ///
    /// Returns true if the game should exit.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !dt.is_finite() || dt < 0.0 {
            error!(dt, "Ignoring invalid frame delta");
            return self.world.resource::<GlobalState>().exit;
        }

        self.tick_accumulator += dt;
        while self.tick_accumulator >= 1.0 {
            self.tick_accumulator -= 1.0;
            self.tick();
        }
        self.frame(dt)
    }

    /// Queues a key press, handled on the next frame.
    pub fn key_pressed(&mut self, key: &str) {
        self.world.resource_mut::<PendingKeys>().0.push(key.to_string());
    }

    /// Queues a command directly, bypassing key bindings.
    pub fn command(&mut self, command: GameCommand) {
        self.world.resource_mut::<Events<GameEvent>>().send(GameEvent::Command(command));
    }

    /// Feeds one tracked body: its arm angles drive the pose, and a head rise in the depth image
    /// triggers a jump. Arms that cannot be measured in this frame keep their last angles.
    pub fn observe_body(&mut self, body: &BodyFrame) {
        let jumped = self.world.resource_mut::<BodyTracker>().0.observe(body.head_row());
        match body.arm_angles() {
            Some(angles) => self.command(GameCommand::SetArms(angles)),
            None => trace!("Arms not tracked this frame"),
        }
        if jumped {
            self.command(GameCommand::Jump);
        }
    }

    pub fn clock(&self) -> &PhaseClock {
        self.world.resource::<PhaseClock>()
    }

    pub fn phase(&self) -> Phase {
        self.clock().phase()
    }

    pub fn block(&self) -> u8 {
        self.clock().block()
    }

    pub fn remaining(&self) -> u32 {
        self.clock().remaining()
    }

    pub fn is_completed(&self) -> bool {
        self.clock().is_completed()
    }

    pub fn progress(&self) -> SessionProgress {
        self.clock().progress()
    }

    /// Seconds left in the current break, if in one.
    pub fn break_time_left(&self) -> Option<u32> {
        let clock = self.clock();
        (clock.phase() == Phase::Break)
            .then(|| self.world.resource::<BreakTimer>().time_left(clock.durations().break_secs))
    }

    pub fn block_stats(&self) -> BlockStats {
        *self.world.resource::<BlockStats>()
    }

    pub fn effects(&self) -> Effects {
        *self.world.resource::<Effects>()
    }

    /// Session events produced since the last call.
    pub fn drain_session_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.session_events)
    }

    /// The final submission, once every block is done.
    pub fn result(&self) -> Option<GameplaySubmission> {
        self.is_completed()
            .then(|| self.world.resource::<SessionRecord>().submission())
    }

    /// Distance along z from the player to the closest obstacle still ahead of it.
    pub fn nearest_obstacle_distance(&mut self) -> Option<f32> {
        let mut query = self.world.query::<(&Obstacle, &Position)>();
        query
            .iter(&self.world)
            .filter(|(obstacle, _)| !obstacle.judged)
            .map(|(_, position)| position.distance_to_player())
            .reduce(f32::min)
    }

    /// The wall on the track, with its distance to the player.
    pub fn wall(&mut self) -> Option<(Wall, f32)> {
        let mut query = self.world.query::<(&Wall, &Position)>();
        query
            .iter(&self.world)
            .next()
            .map(|(wall, position)| (*wall, position.distance_to_player()))
    }

    pub fn player_position(&mut self) -> Option<Position> {
        let mut query = self.world.query_filtered::<&Position, With<Player>>();
        query.single(&self.world).ok().copied()
    }

    pub fn animation(&mut self) -> Option<AnimationClip> {
        let mut query = self.world.query_filtered::<&Animator, With<Player>>();
        query.single(&self.world).ok().map(Animator::clip)
    }
}

fn update_events<T: Event>(world: &mut World) {
    world.resource_mut::<Events<T>>().update();
}
