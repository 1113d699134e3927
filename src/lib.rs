//! Gapwing - a side-scrolling gap-runner arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacle generation, collisions, game state)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, asset decoding, window setup, and raw input capture are owned
//! by the host; the crate produces positions, rotations, and opaque-pixel
//! masks for it to draw, and consumes the per-tick input and timing it
//! supplies.

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Target simulation frame rate (ticks per second)
    pub const SIM_FPS: f32 = 120.0;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / SIM_FPS;

    /// Playfield dimensions (pixels)
    pub const SCREEN_WIDTH: f32 = 1200.0;
    pub const SCREEN_HEIGHT: f32 = 900.0;

    /// Game-over overlay rest heights (title center y, scoreboard center y)
    pub const OVERLAY_TITLE_REST_Y: f32 = 150.0;
    pub const OVERLAY_BOARD_REST_Y: f32 = 450.0;
    /// Overlay slide speeds (pixels per tick)
    pub const OVERLAY_TITLE_SPEED: f32 = 10.0;
    pub const OVERLAY_BOARD_SPEED: f32 = 20.0;
}

/// Integer pixel displacement for a velocity, matching the rect arithmetic
/// the whole simulation runs on
#[inline]
pub fn ceil_px(v: f32) -> i32 {
    v.ceil() as i32
}
