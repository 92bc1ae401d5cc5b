//! Per-block results and the gameplay submission sent to the server once a session ends.

use serde::{Deserialize, Serialize};

/// Number of blocks (full phase cycles) in one session.
pub const BLOCK_COUNT: u8 = 4;
/// Upper bound of a gameplay score.
pub const MAX_SCORE: u32 = 200;

/// Points available per block, split evenly between jumping and posing.
const JUMP_POINTS_PER_BLOCK: f32 = 25.0;
const POSE_POINTS_PER_BLOCK: f32 = 25.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Block id must be at least 1, got {0}")]
    InvalidBlockId(u8),
    #[error("Average pose accuracy must be between 0 and 100, got {0}")]
    AccuracyOutOfRange(f32),
    #[error("Score must be between 0 and {MAX_SCORE}, got {0}")]
    ScoreOutOfRange(i64),
}

/// Statistics collected for a single block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockResult {
    pub block_id: u8,
    pub jumps_succeeded: u32,
    pub jumps_failed: u32,
    pub average_pose_accuracy: f32,
}

impl BlockResult {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.block_id < 1 {
            return Err(ValidationError::InvalidBlockId(self.block_id));
        }
        if !(0.0..=100.0).contains(&self.average_pose_accuracy) {
            return Err(ValidationError::AccuracyOutOfRange(self.average_pose_accuracy));
        }
        Ok(())
    }

    /// Fraction of judged obstacles that were cleared, or 0 when none were judged.
    pub fn success_ratio(&self) -> f32 {
        let total = self.jumps_succeeded + self.jumps_failed;
        if total == 0 {
            0.0
        } else {
            self.jumps_succeeded as f32 / total as f32
        }
    }

    fn points(&self) -> f32 {
        JUMP_POINTS_PER_BLOCK * self.success_ratio() + POSE_POINTS_PER_BLOCK * (self.average_pose_accuracy / 100.0)
    }
}

/// The payload a client posts after the final block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameplaySubmission {
    #[serde(default)]
    pub blocks: Vec<BlockResult>,
    #[serde(default)]
    pub score: i64,
}

impl GameplaySubmission {
    /// Builds a submission whose score is derived from the blocks.
    pub fn from_blocks(blocks: Vec<BlockResult>) -> Self {
        let score = score_for(&blocks) as i64;
        Self { blocks, score }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0..=MAX_SCORE as i64).contains(&self.score) {
            return Err(ValidationError::ScoreOutOfRange(self.score));
        }
        self.blocks.iter().try_for_each(BlockResult::validate)
    }
}

/// Score for a finished session, capped at [`MAX_SCORE`].
///
/// Each block is worth 50 points: 25 scaled by the jump success ratio and 25 scaled by the
/// average pose accuracy.
pub fn score_for(blocks: &[BlockResult]) -> u32 {
    let total: f32 = blocks.iter().map(BlockResult::points).sum();
    (total.round() as u32).min(MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(id: u8, ok: u32, failed: u32, accuracy: f32) -> BlockResult {
        BlockResult {
            block_id: id,
            jumps_succeeded: ok,
            jumps_failed: failed,
            average_pose_accuracy: accuracy,
        }
    }

    #[test]
    fn test_perfect_session_scores_max() {
        let blocks: Vec<_> = (1..=BLOCK_COUNT).map(|id| block(id, 10, 0, 100.0)).collect();
        assert_eq!(score_for(&blocks), MAX_SCORE);
    }

    #[test]
    fn test_score_mixes_jumps_and_accuracy() {
        // 25 * 0.5 + 25 * 0.8 = 32.5 -> 33
        assert_eq!(score_for(&[block(1, 2, 2, 80.0)]), 33);
    }

    #[test]
    fn test_block_without_obstacles_earns_no_jump_points() {
        assert_eq!(block(1, 0, 0, 0.0).success_ratio(), 0.0);
        assert_eq!(score_for(&[block(1, 0, 0, 40.0)]), 10);
    }

    #[test]
    fn test_validation_rejects_out_of_range_values() {
        assert_eq!(block(0, 1, 1, 50.0).validate(), Err(ValidationError::InvalidBlockId(0)));
        assert_eq!(
            block(1, 1, 1, 120.0).validate(),
            Err(ValidationError::AccuracyOutOfRange(120.0))
        );

        let submission = GameplaySubmission {
            blocks: vec![],
            score: 201,
        };
        assert_eq!(submission.validate(), Err(ValidationError::ScoreOutOfRange(201)));
    }

    #[test]
    fn test_submission_uses_camel_case() {
        let submission = GameplaySubmission::from_blocks(vec![block(1, 3, 1, 85.0)]);
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["blocks"][0]["jumpsSucceeded"], 3);
        assert_eq!(json["blocks"][0]["averagePoseAccuracy"], 85.0);
        assert_eq!(json["score"], submission.score);
    }
}
