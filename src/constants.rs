//! This module contains all the constants used in the game.

/// The z coordinate the player runs at. Everything else moves towards it.
pub const PLAYER_Z: f32 = 68.0;

/// Where obstacles and walls enter the track.
pub const SPAWN_Z: f32 = -190.0;
/// Obstacles past this z are despawned.
pub const OBSTACLE_DESPAWN_Z: f32 = 80.0;
/// Obstacles move faster than the ground by this factor.
pub const OBSTACLE_SPEED: f32 = 1.5;
/// The game speed the obstacle schedule is planned against.
pub const REFERENCE_GAME_SPEED: f32 = 50.0;
/// Extra seconds kept between two obstacle spawns on top of the travel time.
pub const OBSTACLE_SPAWN_GAP: f32 = 2.0;
/// A player higher than this when an obstacle passes has cleared it.
pub const OBSTACLE_CLEARANCE: f32 = 2.0;

/// A ground segment is moved back behind its twin once it passes this z.
pub const GROUND_LOOP_Z: f32 = 250.0;
/// Length of one ground segment along z.
pub const GROUND_SEGMENT_LENGTH: f32 = 250.0;

/// The wall stops and freezes the game once it is this close to the player.
pub const WALL_TRIGGER_DISTANCE: f32 = 20.0;

/// The default game speed in units per second.
pub const DEFAULT_GAME_SPEED: f32 = 20.0;

/// Upward velocity applied when a jump starts, in units per second.
pub const JUMP_VELOCITY: f32 = 18.0;
/// Downward acceleration while airborne, in units per second squared.
pub const GRAVITY: f32 = 45.0;

/// Length of the jump animation clip in seconds.
pub const JUMP_CLIP_SECONDS: f32 = 0.64;
/// Playback speed of the jump animation clip.
pub const JUMP_CLIP_TIME_SCALE: f32 = 0.8;

/// Levitation starts once the freezing phase has this many seconds left.
pub const LEVITATION_TRIGGER_SECONDS: u32 = 3;
pub const LEVITATION_DURATION: f32 = 3.0;
/// Fraction of the levitation spent rising; the rest moves forward.
pub const LEVITATION_RISE_FRACTION: f32 = 0.3;
pub const LEVITATION_HEIGHT: f32 = 1.2;
pub const LEVITATION_FORWARD_DISTANCE: f32 = 20.0;

/// The track is reset for the next block this many seconds before the break ends.
pub const BREAK_RESET_LEAD_SECONDS: f32 = 1.0;

/// Rows in the tracking camera's depth image.
pub const DEPTH_IMAGE_HEIGHT: f32 = 424.0;
/// Head rise (in depth-image rows) over the baseline that counts as a jump.
pub const JUMP_DETECTION_THRESHOLD: f32 = 50.0;

/// The phase durations, in seconds.
pub mod durations {
    pub const ACTIVE: u32 = 170;
    pub const PREPARATION: u32 = 10;
    /// Base freezing length; every block extends it before it starts, so block 1 freezes for 25.
    pub const FREEZING: u32 = 15;
    /// Extension applied on entering each block's freezing phase.
    pub const FREEZING_STEP: u32 = 10;
    pub const BREAK: u32 = 20;
}
