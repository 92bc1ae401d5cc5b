use bevy_ecs::{
    query::With,
    resource::Resource,
    system::{Query, Res, ResMut},
};
use glam::Vec3;

use crate::{
    game::phase::{Phase, PhaseClock},
    systems::{
        components::{DeltaTime, Player, Position},
        player::Levitation,
        pose::ArmPose,
    },
};

/// Radians per second the rings turn at.
const RING_SPEED: f32 = 1.5;
const PULSE_SPEED: f32 = 3.0;
const PULSE_AMPLITUDE: f32 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EffectsMode {
    #[default]
    Hidden,
    Posing,
    Levitating,
}

/// Decorative glow around the player, read by a renderer.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct Effects {
    pub mode: EffectsMode,
    pub anchor: Vec3,
    pub time: f32,
    pub ring_rotation: f32,
    pub pulse_scale: f32,
}

impl Effects {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn advance(&mut self, dt: f32) {
        self.time += dt;
        self.ring_rotation = (self.ring_rotation + RING_SPEED * dt) % std::f32::consts::TAU;
        self.pulse_scale = 1.0 + (self.time * PULSE_SPEED).sin() * PULSE_AMPLITUDE;
    }
}

pub fn effects_system(
    clock: Res<PhaseClock>,
    dt: Res<DeltaTime>,
    mut effects: ResMut<Effects>,
    players: Query<(&Position, &ArmPose, &Levitation), With<Player>>,
) {
    if clock.phase() != Phase::Freezing {
        if effects.mode != EffectsMode::Hidden {
            effects.mode = EffectsMode::Hidden;
        }
        return;
    }

    let Some((position, arms, levitation)) = players.iter().next() else {
        return;
    };

    let mode = if levitation.is_levitating() {
        EffectsMode::Levitating
    } else if arms.pose.is_some() {
        EffectsMode::Posing
    } else {
        EffectsMode::Hidden
    };

    effects.mode = mode;
    if mode != EffectsMode::Hidden {
        effects.anchor = position.0;
        effects.advance(dt.seconds);
    }
}
