//! The ECS side of the game: components, resources and the systems that run each frame.

pub mod components;
pub mod effects;
pub mod environment;
pub mod phase;
pub mod player;
pub mod pose;
pub mod stats;
pub mod wall;

pub use self::components::*;
pub use self::effects::*;
pub use self::environment::*;
pub use self::phase::*;
pub use self::player::*;
pub use self::pose::*;
pub use self::stats::*;
pub use self::wall::*;
