//! The one-second phase clock driving a session.
//!
//! A session cycles through [`Phase::Active`], [`Phase::Preparation`], [`Phase::Freezing`] and
//! [`Phase::Break`] once per block. The clock knows nothing about entities; it only reports
//! [`Transition`]s, which the ECS systems react to.

use bevy_ecs::resource::Resource;
use posedash_common::BLOCK_COUNT;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::constants::durations;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Phase {
    Active,
    Preparation,
    Freezing,
    Break,
}

impl Phase {
    /// The phase following this one in the cycle.
    pub fn next(self) -> Phase {
        match self {
            Phase::Active => Phase::Preparation,
            Phase::Preparation => Phase::Freezing,
            Phase::Freezing => Phase::Break,
            Phase::Break => Phase::Active,
        }
    }

    /// Whether the track (ground, obstacles, jumping) is moving during this phase.
    pub fn is_running(self) -> bool {
        matches!(self, Phase::Active | Phase::Preparation)
    }
}

/// Phase lengths in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDurations {
    pub active_secs: u32,
    pub preparation_secs: u32,
    /// Base freezing length, before any block's extension.
    pub freezing_secs: u32,
    /// Added to the freezing length on entering each block's freezing phase, the first included.
    pub freezing_step_secs: u32,
    pub break_secs: u32,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            active_secs: durations::ACTIVE,
            preparation_secs: durations::PREPARATION,
            freezing_secs: durations::FREEZING,
            freezing_step_secs: durations::FREEZING_STEP,
            break_secs: durations::BREAK,
        }
    }
}

impl PhaseDurations {
    /// How long `phase` lasts in the given (1-based) block.
    pub fn duration_of(&self, phase: Phase, block: u8) -> u32 {
        match phase {
            Phase::Active => self.active_secs,
            Phase::Preparation => self.preparation_secs,
            Phase::Freezing => self.freezing_secs + self.freezing_step_secs * u32::from(block),
            Phase::Break => self.break_secs,
        }
    }

    /// Sum of every phase in every block.
    pub fn session_secs(&self, blocks: u8) -> u32 {
        (1..=blocks)
            .map(|block| {
                Phase::iter()
                    .map(|phase| self.duration_of(phase, block))
                    .sum::<u32>()
            })
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered { from: Phase, to: Phase, block: u8 },
    /// The last block's break ended. Reported exactly once.
    Completed,
}

/// How far through the session the player is.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionProgress {
    pub elapsed_secs: u32,
    pub total_secs: u32,
    /// 0..=100
    pub percent: f32,
    /// Remaining session time as `m:ss`.
    pub time_left: String,
}

#[derive(Resource, Debug, Clone)]
pub struct PhaseClock {
    durations: PhaseDurations,
    block_count: u8,
    phase: Phase,
    block: u8,
    remaining: u32,
    elapsed: u32,
    completed: bool,
}

impl Default for PhaseClock {
    fn default() -> Self {
        Self::new(PhaseDurations::default(), BLOCK_COUNT)
    }
}

impl PhaseClock {
    /// Starts a session in the active phase of block 1.
    pub fn new(durations: PhaseDurations, block_count: u8) -> Self {
        Self {
            durations,
            block_count,
            phase: Phase::Active,
            block: 1,
            remaining: durations.duration_of(Phase::Active, 1),
            elapsed: 0,
            completed: false,
        }
    }

    /// Counts down one second.
    ///
    /// The remaining time is decremented while positive; a tick that finds it at zero moves
    /// to the next phase instead. Does nothing once the session is completed.
    pub fn tick(&mut self) -> Option<Transition> {
        if self.completed {
            return None;
        }

        self.elapsed = (self.elapsed + 1).min(self.total_secs());
        if self.remaining > 0 {
            self.remaining -= 1;
            None
        } else {
            self.advance()
        }
    }

    /// Moves to the next phase immediately.
    pub fn advance(&mut self) -> Option<Transition> {
        if self.completed {
            return None;
        }

        let from = self.phase;
        let to = from.next();
        if to == Phase::Active {
            self.block += 1;
            if self.block > self.block_count {
                self.completed = true;
                self.remaining = 0;
                return Some(Transition::Completed);
            }
        }

        self.phase = to;
        self.remaining = self.durations.duration_of(to, self.block);
        Some(Transition::Entered {
            from,
            to,
            block: self.block,
        })
    }

    /// Cuts the preparation phase short. Ignored in every other phase.
    pub fn trigger_freeze(&mut self) -> Option<Transition> {
        if self.phase == Phase::Preparation {
            self.advance()
        } else {
            None
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn block(&self) -> u8 {
        self.block
    }

    pub fn block_count(&self) -> u8 {
        self.block_count
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn durations(&self) -> &PhaseDurations {
        &self.durations
    }

    pub fn total_secs(&self) -> u32 {
        self.durations.session_secs(self.block_count)
    }

    pub fn progress(&self) -> SessionProgress {
        let total_secs = self.total_secs();
        let percent = if total_secs == 0 {
            100.0
        } else {
            self.elapsed as f32 / total_secs as f32 * 100.0
        };

        let left = total_secs.saturating_sub(self.elapsed);
        SessionProgress {
            elapsed_secs: self.elapsed,
            total_secs,
            percent,
            time_left: format!("{}:{:02}", left / 60, left % 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn short_durations() -> PhaseDurations {
        PhaseDurations {
            active_secs: 2,
            preparation_secs: 1,
            freezing_secs: 1,
            freezing_step_secs: 1,
            break_secs: 1,
        }
    }

    #[test]
    fn test_freezing_grows_each_block() {
        let durations = PhaseDurations::default();
        let freezing: Vec<u32> = (1..=4).map(|block| durations.duration_of(Phase::Freezing, block)).collect();
        assert_eq!(freezing, vec![25, 35, 45, 55]);
    }

    #[test]
    fn test_tick_at_zero_transitions_without_decrementing() {
        let mut clock = PhaseClock::new(short_durations(), 1);
        assert_eq!(clock.tick(), None);
        assert_eq!(clock.tick(), None);
        assert_eq!(clock.remaining(), 0);

        let transition = clock.tick();
        assert_eq!(
            transition,
            Some(Transition::Entered {
                from: Phase::Active,
                to: Phase::Preparation,
                block: 1
            })
        );
        assert_eq!(clock.remaining(), 1);
    }

    #[test]
    fn test_trigger_freeze_only_in_preparation() {
        let mut clock = PhaseClock::new(short_durations(), 1);
        assert_eq!(clock.trigger_freeze(), None);
        assert_eq!(clock.phase(), Phase::Active);

        clock.advance();
        assert!(clock.trigger_freeze().is_some());
        assert_eq!(clock.phase(), Phase::Freezing);
    }

    #[test]
    fn test_time_left_label() {
        let mut clock = PhaseClock::default();
        assert_eq!(clock.progress().time_left, "16:00");
        for _ in 0..65 {
            clock.tick();
        }
        let progress = clock.progress();
        assert_eq!(progress.elapsed_secs, 65);
        assert_eq!(progress.time_left, "14:55");
    }
}
