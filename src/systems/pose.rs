//! Pose matching against the wall's target pose.
//!
//! Arm angles come either from a keyboard [`Pose`] or from a tracked [`BodyFrame`]; while the
//! game is frozen every frame samples how close the arms are to the wall.

use bevy_ecs::{
    component::Component,
    event::EventReader,
    query::With,
    resource::Resource,
    system::{Query, Res, ResMut},
};
use glam::{Vec2, Vec3};
use posedash_common::PostureAngles;
use strum_macros::{Display, EnumIter};
use tracing::{debug, trace};

use crate::{
    constants::{DEPTH_IMAGE_HEIGHT, JUMP_DETECTION_THRESHOLD},
    events::{GameCommand, GameEvent},
    game::phase::{Phase, PhaseClock},
    systems::{
        components::Player,
        player::{AnimationClip, Animator, Levitation},
        wall::Wall,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Pose {
    T,
    I,
    J,
    N,
    P,
}

/// The poses a wall can ask for.
pub const WALL_POSES: [Pose; 4] = [Pose::I, Pose::J, Pose::N, Pose::P];

impl Pose {
    /// Right (`alpha`) and left (`beta`) arm angles of the pose.
    pub fn angles(self) -> PostureAngles {
        match self {
            Pose::T => PostureAngles::new(90.0, 90.0),
            Pose::I => PostureAngles::new(180.0, 180.0),
            Pose::J => PostureAngles::new(180.0, 90.0),
            Pose::N => PostureAngles::new(45.0, 45.0),
            Pose::P => PostureAngles::new(90.0, 180.0),
        }
    }
}

/// Current arm angles of the player.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ArmPose {
    pub angles: PostureAngles,
    /// The keyboard pose that set the angles, if any.
    pub pose: Option<Pose>,
}

impl Default for ArmPose {
    fn default() -> Self {
        Self {
            angles: PostureAngles::new(0.0, 0.0),
            pose: None,
        }
    }
}

/// Accuracy in percent of `actual` against `target`, or `None` when either has no finite angles.
///
/// Every degree off on either arm costs 5/18 of a point, so being 180 degrees off on both arms
/// scores 0.
pub fn pose_accuracy(actual: PostureAngles, target: PostureAngles) -> Option<f32> {
    let error = (actual.alpha - target.alpha).abs() + (actual.beta - target.beta).abs();
    error
        .is_finite()
        .then(|| (100.0 - (5.0 / 18.0) * error).clamp(0.0, 100.0))
}

/// Accuracy samples taken during the current freezing phase.
#[derive(Resource, Debug, Clone, Default)]
pub struct PoseSamples {
    sum: f32,
    count: u32,
}

impl PoseSamples {
    /// Records one sample. Non-finite values are dropped.
    pub fn push(&mut self, accuracy: f32) {
        if !accuracy.is_finite() {
            trace!(accuracy, "Dropping pose sample");
            return;
        }
        self.sum += accuracy.clamp(0.0, 100.0);
        self.count += 1;
    }

    pub fn mean(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f32
        }
    }

    pub fn len(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub fn pose_command_system(
    mut events: EventReader<GameEvent>,
    clock: Res<PhaseClock>,
    mut players: Query<(&mut ArmPose, &mut Animator), With<Player>>,
) {
    for event in events.read() {
        let GameEvent::Command(command) = event else {
            continue;
        };
        if clock.phase() != Phase::Freezing {
            continue;
        }

        for (mut arms, mut animator) in players.iter_mut() {
            match *command {
                GameCommand::Pose(pose) => {
                    debug!(%pose, "Striking pose");
                    arms.angles = pose.angles();
                    arms.pose = Some(pose);
                    animator.play(AnimationClip::Posing(pose));
                }
                GameCommand::SetArms(angles) => {
                    if !angles.is_finite() {
                        continue;
                    }
                    arms.angles = angles;
                    arms.pose = None;
                }
                _ => {}
            }
        }
    }
}

pub fn pose_sampling_system(
    clock: Res<PhaseClock>,
    mut samples: ResMut<PoseSamples>,
    walls: Query<&Wall>,
    players: Query<(&ArmPose, &Levitation), With<Player>>,
) {
    if clock.phase() != Phase::Freezing {
        return;
    }
    let Some(wall) = walls.iter().next() else {
        return;
    };

    for (arms, levitation) in players.iter() {
        if levitation.is_levitating() {
            continue;
        }
        if let Some(accuracy) = pose_accuracy(arms.angles, wall.target.angles()) {
            samples.push(accuracy);
        }
    }
}

/// Joints of a tracked body, in the order the depth camera reports them.
pub mod joint {
    pub const SPINE_BASE: usize = 0;
    pub const HEAD: usize = 3;
    pub const SHOULDER_LEFT: usize = 4;
    pub const WRIST_LEFT: usize = 6;
    pub const SHOULDER_RIGHT: usize = 8;
    pub const WRIST_RIGHT: usize = 10;
    pub const SPINE_SHOULDER: usize = 20;
    pub const COUNT: usize = 25;
}

/// Bones shorter than this (in metres) are treated as untracked.
const MIN_BONE_LENGTH: f32 = 1e-3;

/// One tracked body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame {
    /// Camera-space joint positions in metres, y pointing up.
    pub joints: [Vec3; joint::COUNT],
    /// Joint positions projected onto the depth image, normalized to `0..=1` with y pointing down.
    pub depth: [Vec2; joint::COUNT],
}

impl BodyFrame {
    /// Right and left arm angles, or `None` while either arm cannot be measured.
    ///
    /// The wrist is translated as if its shoulder sat on the spine, then the angle between
    /// that arm and the spine (pointing down) is measured. A hanging arm reads 0, a raised
    /// arm 180.
    pub fn arm_angles(&self) -> Option<PostureAngles> {
        Some(PostureAngles::new(
            self.arm_angle(joint::WRIST_RIGHT, joint::SHOULDER_RIGHT)?,
            self.arm_angle(joint::WRIST_LEFT, joint::SHOULDER_LEFT)?,
        ))
    }

    fn arm_angle(&self, wrist: usize, shoulder: usize) -> Option<f32> {
        let arm = self.joints[wrist] - self.joints[shoulder];
        let spine = self.joints[joint::SPINE_BASE] - self.joints[joint::SPINE_SHOULDER];
        if arm.length() < MIN_BONE_LENGTH || spine.length() < MIN_BONE_LENGTH {
            return None;
        }

        let angle = arm.angle_between(spine).to_degrees();
        angle.is_finite().then_some(angle)
    }

    /// The head's row in the depth image. Smaller is higher.
    pub fn head_row(&self) -> f32 {
        self.depth[joint::HEAD].y * DEPTH_IMAGE_HEIGHT
    }
}

/// Detects jumps from the head height of a tracked body.
///
/// The first observation becomes the baseline. Heights are in depth-image rows, so a jump
/// makes the value smaller.
#[derive(Debug, Clone, Default)]
pub struct JumpDetector {
    baseline: Option<f32>,
    jumping: bool,
}

impl JumpDetector {
    /// Feeds one head observation, returning true on the frame a jump starts.
    pub fn observe(&mut self, head_row: f32) -> bool {
        if !head_row.is_finite() {
            return false;
        }
        let baseline = *self.baseline.get_or_insert(head_row);
        let rise = baseline - head_row;

        if !self.jumping && rise >= JUMP_DETECTION_THRESHOLD {
            self.jumping = true;
            true
        } else {
            if self.jumping && rise < JUMP_DETECTION_THRESHOLD {
                self.jumping = false;
            }
            false
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_accuracy_bounds() {
        assert_eq!(pose_accuracy(Pose::T.angles(), Pose::T.angles()), Some(100.0));
        assert_eq!(pose_accuracy(PostureAngles::new(0.0, 0.0), Pose::I.angles()), Some(0.0));
        // 36 degrees off in total costs 10 points
        let accuracy = pose_accuracy(PostureAngles::new(72.0, 90.0), Pose::T.angles()).unwrap();
        assert!((accuracy - 90.0).abs() < 1e-4);
        assert_eq!(pose_accuracy(PostureAngles::new(f32::NAN, 90.0), Pose::T.angles()), None);
    }

    #[test]
    fn test_samples_mean() {
        let mut samples = PoseSamples::default();
        assert_eq!(samples.mean(), 0.0);
        samples.push(80.0);
        samples.push(60.0);
        samples.push(f32::NAN);
        samples.push(f32::INFINITY);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples.mean(), 70.0);
        samples.clear();
        assert!(samples.is_empty());
    }
}
