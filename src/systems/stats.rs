//! Per-block jump and pose statistics, summarized into [`BlockResult`]s.

use bevy_ecs::{
    event::{EventReader, EventWriter},
    resource::Resource,
    system::{Res, ResMut},
};
use posedash_common::{BlockResult, GameplaySubmission};
use smallvec::SmallVec;
use tracing::info;

use crate::{
    error::GameError,
    events::{GameEvent, PhaseEvent, SessionEvent},
    game::phase::Phase,
    systems::pose::PoseSamples,
};

/// Rounded percentage of `part` in `part + rest`, 0 when both are zero.
fn rate(part: u32, rest: u32) -> u32 {
    let total = part + rest;
    if total == 0 {
        0
    } else {
        (part as f32 / total as f32 * 100.0).round() as u32
    }
}

/// Obstacle outcomes of the running block.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockStats {
    pub jumps_succeeded: u32,
    pub jumps_failed: u32,
}

impl BlockStats {
    pub fn success_rate(&self) -> u32 {
        rate(self.jumps_succeeded, self.jumps_failed)
    }

    pub fn fail_rate(&self) -> u32 {
        rate(self.jumps_failed, self.jumps_succeeded)
    }
}

/// Results of every finished block in the session.
#[derive(Resource, Debug, Clone, Default)]
pub struct SessionRecord {
    pub blocks: SmallVec<[BlockResult; 4]>,
}

impl SessionRecord {
    pub fn submission(&self) -> GameplaySubmission {
        GameplaySubmission::from_blocks(self.blocks.to_vec())
    }

    pub fn totals(&self) -> BlockStats {
        self.blocks.iter().fold(BlockStats::default(), |acc, block| BlockStats {
            jumps_succeeded: acc.jumps_succeeded + block.jumps_succeeded,
            jumps_failed: acc.jumps_failed + block.jumps_failed,
        })
    }
}

pub fn obstacle_stats_system(mut events: EventReader<GameEvent>, mut stats: ResMut<BlockStats>) {
    for event in events.read() {
        if let GameEvent::ObstaclePassed { cleared } = *event {
            if cleared {
                stats.jumps_succeeded += 1;
            } else {
                stats.jumps_failed += 1;
            }
        }
    }
}

/// Closes a block when its break begins, and the session once the clock completes.
///
/// The block's counters are reset either way; a block that fails validation is reported as a
/// [`GameError`] instead of being recorded.
pub fn block_summary_system(
    mut phase_events: EventReader<PhaseEvent>,
    mut stats: ResMut<BlockStats>,
    samples: Res<PoseSamples>,
    mut record: ResMut<SessionRecord>,
    mut session: EventWriter<SessionEvent>,
    mut errors: EventWriter<GameError>,
) {
    for event in phase_events.read() {
        match *event {
            PhaseEvent::Entered {
                to: Phase::Break, block, ..
            } => {
                let result = BlockResult {
                    block_id: block,
                    jumps_succeeded: stats.jumps_succeeded,
                    jumps_failed: stats.jumps_failed,
                    average_pose_accuracy: samples.mean(),
                };
                *stats = BlockStats::default();
                if let Err(e) = result.validate() {
                    errors.write(e.into());
                    continue;
                }

                info!(
                    block,
                    succeeded = result.jumps_succeeded,
                    failed = result.jumps_failed,
                    accuracy = result.average_pose_accuracy,
                    "Block completed"
                );
                record.blocks.push(result);
                session.write(SessionEvent::BlockCompleted(result));
            }
            PhaseEvent::Completed => {
                let submission = record.submission();
                info!(score = submission.score, blocks = submission.blocks.len(), "Session completed");
                session.write(SessionEvent::GameCompleted(submission));
            }
            _ => {}
        }
    }
}
