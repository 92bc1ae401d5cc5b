//! Types shared between the game core and the leaderboard server.

pub mod gameplay;
pub mod posture;

pub use gameplay::{score_for, BlockResult, GameplaySubmission, ValidationError, BLOCK_COUNT, MAX_SCORE};
pub use posture::{find_semaphore, PostureAngles, SemaphorePosture, SEMAPHORE_POSTURES};
