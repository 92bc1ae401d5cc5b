use bevy_ecs::prelude::*;
use posedash_common::{BlockResult, GameplaySubmission, PostureAngles};

use crate::game::phase::{Phase, Transition};
use crate::systems::pose::Pose;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameCommand {
    Exit,
    Jump,
    /// Strike one of the keyboard poses.
    Pose(Pose),
    /// Arm angles read from a tracked body.
    SetArms(PostureAngles),
}

#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    Command(GameCommand),
    /// An obstacle passed the player; `cleared` is true when the player was high enough.
    ObstaclePassed { cleared: bool },
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}

/// Written by the tick schedule whenever the phase clock changes phase.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEvent {
    Entered { from: Phase, to: Phase, block: u8 },
    Completed,
}

impl From<Transition> for PhaseEvent {
    fn from(transition: Transition) -> Self {
        match transition {
            Transition::Entered { from, to, block } => PhaseEvent::Entered { from, to, block },
            Transition::Completed => PhaseEvent::Completed,
        }
    }
}

/// The pose wall got close enough to the player to freeze the game.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallReached;

/// Results surfaced to whoever drives the session.
#[derive(Event, Clone, Debug, PartialEq)]
pub enum SessionEvent {
    BlockCompleted(BlockResult),
    GameCompleted(GameplaySubmission),
}
