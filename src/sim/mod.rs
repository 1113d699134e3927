//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Synchronous single-threaded tick only
//! - Seeded RNG only
//! - No rendering, asset, or platform dependencies
//!
//! Given the same seed and the same per-tick input/dt/frame-rate sequence,
//! two runs produce identical obstacle geometry and state transitions.

pub mod collision;
pub mod mask;
pub mod state;
pub mod tick;

pub use collision::{Collision, detect_collision};
pub use mask::{Sprite, SpriteMask, SpriteShape};
pub use state::{
    Avatar, DifficultyState, GameOverOverlay, GamePhase, GameState, GroundBand, MotionClock,
    ObstaclePair, ObstacleSet, ScoreState,
};
pub use tick::{InputEvent, TickInput, scroll_displacement, speed_factor, tick};
