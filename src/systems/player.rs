use bevy_ecs::{
    component::Component,
    event::{EventReader, EventWriter},
    query::With,
    system::{Query, Res, ResMut},
};
use tracing::{debug, trace};

use crate::{
    constants::{
        GRAVITY, JUMP_CLIP_SECONDS, JUMP_CLIP_TIME_SCALE, JUMP_VELOCITY, LEVITATION_DURATION, LEVITATION_FORWARD_DISTANCE,
        LEVITATION_HEIGHT, LEVITATION_RISE_FRACTION, LEVITATION_TRIGGER_SECONDS, PLAYER_Z,
    },
    error::{EntityError, GameError},
    events::{GameCommand, GameEvent, PhaseEvent},
    game::phase::{Phase, PhaseClock},
    systems::{
        components::{DeltaTime, Player, Position},
        pose::{ArmPose, Pose, PoseSamples},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationClip {
    Running,
    /// One-shot; hands back to [`AnimationClip::Running`] when it ends.
    Jumping,
    Standing,
    Posing(Pose),
}

impl AnimationClip {
    /// Length of a one-shot clip, `None` for looping clips.
    pub fn one_shot_length(self) -> Option<f32> {
        match self {
            AnimationClip::Jumping => Some(JUMP_CLIP_SECONDS),
            _ => None,
        }
    }

    fn time_scale(self) -> f32 {
        match self {
            AnimationClip::Jumping => JUMP_CLIP_TIME_SCALE,
            _ => 1.0,
        }
    }
}

/// The player's animation state machine.
///
/// Clips are swapped through [`Animator::play`]; a finished one-shot clip is reported by
/// [`Animator::update`] so the caller decides what plays next.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Animator {
    clip: AnimationClip,
    /// Clip-local time in seconds, already scaled.
    time: f32,
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            clip: AnimationClip::Running,
            time: 0.0,
        }
    }
}

impl Animator {
    pub fn clip(&self) -> AnimationClip {
        self.clip
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Restarts playback with `clip`.
    pub fn play(&mut self, clip: AnimationClip) {
        self.clip = clip;
        self.time = 0.0;
    }

    /// Advances the clip, returning it if a one-shot clip just finished.
    pub fn update(&mut self, dt: f32) -> Option<AnimationClip> {
        self.time += dt * self.clip.time_scale();
        match self.clip.one_shot_length() {
            Some(length) if self.time >= length => {
                self.time = length;
                Some(self.clip)
            }
            _ => None,
        }
    }
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpState {
    /// Vertical velocity in units per second, positive is up.
    pub velocity: f32,
    pub airborne: bool,
}

impl JumpState {
    pub fn is_grounded(&self) -> bool {
        !self.airborne
    }
}

/// The scripted float over the pose wall at the end of a freezing phase.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub enum Levitation {
    #[default]
    Idle,
    Rising {
        elapsed: f32,
    },
    Finished,
}

impl Levitation {
    pub fn is_levitating(&self) -> bool {
        matches!(self, Levitation::Rising { .. })
    }
}

/// Quadratic ease-in-out over `t` in `0..=1`.
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// Height and forward offset of a levitation `progress` (0..=1) of the way through.
pub fn levitation_offsets(progress: f32) -> (f32, f32) {
    let (vertical, forward) = if progress < LEVITATION_RISE_FRACTION {
        (progress / LEVITATION_RISE_FRACTION, 0.0)
    } else {
        (1.0, (progress - LEVITATION_RISE_FRACTION) / (1.0 - LEVITATION_RISE_FRACTION))
    };
    (
        ease_in_out(vertical) * LEVITATION_HEIGHT,
        ease_in_out(forward) * LEVITATION_FORWARD_DISTANCE,
    )
}

pub fn jump_command_system(
    mut events: EventReader<GameEvent>,
    clock: Res<PhaseClock>,
    mut players: Query<(&mut JumpState, &mut Animator), With<Player>>,
) {
    for event in events.read() {
        if *event != GameEvent::Command(GameCommand::Jump) {
            continue;
        }
        if clock.phase() != Phase::Active {
            trace!(phase = %clock.phase(), "Ignoring jump outside of the active phase");
            continue;
        }

        for (mut jump, mut animator) in players.iter_mut() {
            if !jump.is_grounded() {
                continue;
            }
            jump.airborne = true;
            jump.velocity = JUMP_VELOCITY;
            animator.play(AnimationClip::Jumping);
            debug!("Player jumped");
        }
    }
}

pub fn jump_physics_system(
    clock: Res<PhaseClock>,
    dt: Res<DeltaTime>,
    mut players: Query<(&mut JumpState, &mut Position), With<Player>>,
) {
    if !clock.phase().is_running() {
        return;
    }

    for (mut jump, mut position) in players.iter_mut() {
        if !jump.airborne {
            continue;
        }

        position.0.y += jump.velocity * dt.seconds;
        jump.velocity -= GRAVITY * dt.seconds;
        if position.0.y <= 0.0 {
            position.0.y = 0.0;
            jump.velocity = 0.0;
            jump.airborne = false;
        }
    }
}

pub fn animation_system(clock: Res<PhaseClock>, dt: Res<DeltaTime>, mut animators: Query<&mut Animator, With<Player>>) {
    if clock.phase() == Phase::Break {
        return;
    }

    for mut animator in animators.iter_mut() {
        if animator.update(dt.seconds) == Some(AnimationClip::Jumping) {
            animator.play(AnimationClip::Running);
        }
        if clock.phase().is_running() && animator.clip() == AnimationClip::Standing {
            animator.play(AnimationClip::Running);
        }
    }
}

/// Stops the player when a freezing phase begins.
pub fn freeze_player_system(
    mut phase_events: EventReader<PhaseEvent>,
    mut players: Query<(&mut Animator, &mut JumpState, &mut Position, &mut ArmPose, &mut Levitation), With<Player>>,
    mut samples: ResMut<PoseSamples>,
    mut errors: EventWriter<GameError>,
) {
    for event in phase_events.read() {
        if !matches!(event, PhaseEvent::Entered { to: Phase::Freezing, .. }) {
            continue;
        }
        samples.clear();

        let (mut animator, mut jump, mut position, mut arms, mut levitation) = match players.single_mut() {
            Ok(player) => player,
            Err(e) => {
                errors.write(EntityError::from(e).into());
                continue;
            }
        };
        animator.play(AnimationClip::Standing);
        *jump = JumpState::default();
        position.0.y = 0.0;
        *arms = ArmPose::default();
        *levitation = Levitation::Idle;
    }
}

/// Lifts the player over the wall during the last seconds of a freezing phase.
pub fn levitation_system(
    clock: Res<PhaseClock>,
    dt: Res<DeltaTime>,
    mut players: Query<(&mut Levitation, &mut Position), With<Player>>,
) {
    if clock.phase() != Phase::Freezing {
        return;
    }

    for (mut levitation, mut position) in players.iter_mut() {
        match *levitation {
            Levitation::Idle if clock.remaining() <= LEVITATION_TRIGGER_SECONDS => {
                debug!(remaining = clock.remaining(), "Levitation started");
                *levitation = Levitation::Rising { elapsed: 0.0 };
            }
            Levitation::Rising { elapsed } => {
                let elapsed = elapsed + dt.seconds;
                let progress = (elapsed / LEVITATION_DURATION).min(1.0);
                let (height, forward) = levitation_offsets(progress);
                position.0.y = height;
                position.0.z = PLAYER_Z - forward;

                if progress >= 1.0 {
                    position.0.y = 0.0;
                    *levitation = Levitation::Finished;
                } else {
                    *levitation = Levitation::Rising { elapsed };
                }
            }
            _ => {}
        }
    }
}
