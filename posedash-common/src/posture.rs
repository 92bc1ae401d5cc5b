//! Arm-angle postures, measured in degrees between each arm and the spine.
//!
//! `alpha` is the right arm, `beta` the left arm; 0 is an arm hanging down, 90 is
//! horizontal and 180 is straight up.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureAngles {
    pub alpha: f32,
    pub beta: f32,
}

impl PostureAngles {
    pub const fn new(alpha: f32, beta: f32) -> Self {
        Self { alpha, beta }
    }

    pub fn is_finite(&self) -> bool {
        self.alpha.is_finite() && self.beta.is_finite()
    }
}

/// A flag-semaphore letter used as a posture template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemaphorePosture {
    pub id: &'static str,
    pub angles: PostureAngles,
    /// Both hands end up on the same side of the body.
    pub hands_on_one_side: bool,
}

const fn semaphore(id: &'static str, alpha: f32, beta: f32, hands_on_one_side: bool) -> SemaphorePosture {
    SemaphorePosture {
        id,
        angles: PostureAngles::new(alpha, beta),
        hands_on_one_side,
    }
}

pub const SEMAPHORE_POSTURES: [SemaphorePosture; 26] = [
    semaphore("Alpha", 45.0, 0.0, false),
    semaphore("Bravo", 90.0, 0.0, false),
    semaphore("Charlie", 135.0, 0.0, false),
    semaphore("Delta", 180.0, 0.0, false),
    semaphore("Echo", 0.0, 135.0, false),
    semaphore("Foxtrot", 0.0, 90.0, false),
    semaphore("Golf", 0.0, 45.0, false),
    semaphore("Hotel", 90.0, 45.0, true),
    semaphore("India", 135.0, 45.0, true),
    semaphore("Juliet", 180.0, 90.0, false),
    semaphore("Kilo", 45.0, 180.0, false),
    semaphore("Lima", 45.0, 135.0, false),
    semaphore("Mike", 45.0, 90.0, false),
    semaphore("November", 45.0, 45.0, false),
    semaphore("Oscar", 90.0, 135.0, true),
    semaphore("Papa", 90.0, 180.0, false),
    semaphore("Quebec", 90.0, 135.0, false),
    semaphore("Romeo", 90.0, 90.0, false),
    semaphore("Sierra", 90.0, 45.0, false),
    semaphore("Tango", 135.0, 180.0, false),
    semaphore("Uniform", 135.0, 135.0, false),
    semaphore("Victor", 180.0, 45.0, false),
    semaphore("Whiskey", 135.0, 90.0, true),
    semaphore("X-ray", 120.0, 0.0, true),
    semaphore("Yankee", 135.0, 90.0, true),
    semaphore("Zulu", 45.0, 90.0, true),
];

/// Looks up a semaphore letter by id, ignoring case.
pub fn find_semaphore(id: &str) -> Option<&'static SemaphorePosture> {
    SEMAPHORE_POSTURES.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semaphore_angles_stay_in_range() {
        for posture in SEMAPHORE_POSTURES {
            assert!((0.0..=180.0).contains(&posture.angles.alpha), "{}", posture.id);
            assert!((0.0..=180.0).contains(&posture.angles.beta), "{}", posture.id);
        }
    }

    #[test]
    fn test_find_semaphore_is_case_insensitive() {
        let november = find_semaphore("november").expect("November exists");
        assert_eq!(november.angles, PostureAngles::new(45.0, 45.0));
        assert!(find_semaphore("Omega").is_none());
    }
}
