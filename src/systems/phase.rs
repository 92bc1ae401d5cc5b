//! Systems connecting the [`PhaseClock`] to the world.

use bevy_ecs::{
    entity::Entity,
    event::{EventReader, EventWriter},
    query::{Or, With},
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
};
use tracing::{debug, info};

use crate::{
    constants::{BREAK_RESET_LEAD_SECONDS, PLAYER_Z},
    events::{PhaseEvent, WallReached},
    game::phase::{Phase, PhaseClock},
    systems::{
        components::{DeltaTime, GameSpeed, Obstacle, Player, Position},
        effects::Effects,
        environment::ObstacleSpawner,
        player::{AnimationClip, Animator, JumpState, Levitation},
        pose::ArmPose,
        wall::Wall,
    },
};

/// Time spent in the current break.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct BreakTimer {
    pub elapsed: f32,
    pub reset_done: bool,
}

impl BreakTimer {
    /// Whole seconds left in a break of `break_secs`.
    pub fn time_left(&self, break_secs: u32) -> u32 {
        (break_secs as f32 - self.elapsed).max(0.0).ceil() as u32
    }
}

fn log_transition(event: &PhaseEvent) {
    match event {
        PhaseEvent::Entered { from, to, block } => info!(%from, %to, block, "Phase transition"),
        PhaseEvent::Completed => info!("All blocks finished"),
    }
}

/// Counts the clock down by one second. Lives in the tick schedule.
pub fn phase_tick_system(mut clock: ResMut<PhaseClock>, mut writer: EventWriter<PhaseEvent>) {
    if let Some(transition) = clock.tick() {
        let event = PhaseEvent::from(transition);
        log_transition(&event);
        writer.write(event);
    }
}

/// Lets the wall cut the preparation phase short.
pub fn wall_trigger_system(
    mut reached: EventReader<WallReached>,
    mut clock: ResMut<PhaseClock>,
    mut writer: EventWriter<PhaseEvent>,
) {
    for _ in reached.read() {
        if let Some(transition) = clock.trigger_freeze() {
            let event = PhaseEvent::from(transition);
            log_transition(&event);
            writer.write(event);
        } else {
            debug!(phase = %clock.phase(), "Wall trigger ignored");
        }
    }
}

pub fn rearm_spawner_system(mut phase_events: EventReader<PhaseEvent>, mut spawner: ResMut<ObstacleSpawner>) {
    for event in phase_events.read() {
        if matches!(event, PhaseEvent::Entered { to: Phase::Active, .. }) {
            spawner.rearm();
        }
    }
}

/// Clears the track shortly before a break ends so the next block starts fresh.
#[allow(clippy::too_many_arguments)]
pub fn break_reset_system(
    mut commands: Commands,
    mut phase_events: EventReader<PhaseEvent>,
    clock: Res<PhaseClock>,
    dt: Res<DeltaTime>,
    mut timer: ResMut<BreakTimer>,
    mut speed: ResMut<GameSpeed>,
    mut effects: ResMut<Effects>,
    track: Query<Entity, Or<(With<Obstacle>, With<Wall>)>>,
    mut players: Query<(&mut Position, &mut JumpState, &mut Animator, &mut ArmPose, &mut Levitation), With<Player>>,
) {
    for event in phase_events.read() {
        if matches!(event, PhaseEvent::Entered { to: Phase::Break, .. }) {
            *timer = BreakTimer::default();
        }
    }

    if clock.phase() != Phase::Break || clock.is_completed() {
        return;
    }

    timer.elapsed += dt.seconds;
    let reset_at = clock.durations().break_secs as f32 - BREAK_RESET_LEAD_SECONDS;
    if timer.reset_done || timer.elapsed < reset_at {
        return;
    }

    debug!(block = clock.block(), "Resetting track after break");
    for entity in track.iter() {
        commands.entity(entity).despawn();
    }
    for (mut position, mut jump, mut animator, mut arms, mut levitation) in players.iter_mut() {
        *position = Position::at_z(PLAYER_Z);
        *jump = JumpState::default();
        animator.play(AnimationClip::Running);
        *arms = ArmPose::default();
        *levitation = Levitation::Idle;
    }
    speed.reset();
    effects.clear();
    timer.reset_done = true;
}
