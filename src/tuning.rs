//! Data-driven game balance
//!
//! Every gameplay number lives here so balance passes never touch sim code.
//! `Default` carries the shipped values; a JSON file can override them for
//! playtesting builds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Gameplay balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Avatar physics ===
    /// Gravitational acceleration, in avatar coordinate scale per second
    pub gravity: f32,
    /// Instantaneous velocity at the moment of a jump (negative = upward)
    pub jump_velocity: f32,
    /// Avatar sprite footprint (pixels)
    pub avatar_width: f32,
    pub avatar_height: f32,
    /// Avatar top-left position at game start
    pub avatar_start: Vec2,
    /// How far below the ground line the avatar may sink before clamping
    pub ground_overlap: f32,

    // === Avatar display rotation ===
    pub rotation_min: f32,
    pub rotation_max: f32,
    pub rotation_initial: f32,
    /// Falling: rotation increases by ceil(v) / this per tick
    pub fall_rotation_divisor: f32,
    /// Rising: rotation decreases by abs(ceil(v)) * this per tick
    pub rise_rotation_factor: f32,

    // === Start-screen idle bounce ===
    /// Bounce amplitude around the start position (pixels)
    pub idle_amplitude: f32,
    /// Bounce speed (pixels per tick)
    pub idle_speed: f32,

    // === Scrolling ===
    /// Pixels every obstacle moves per nominal tick
    pub base_scroll_speed: f32,

    // === Obstacle generation ===
    /// Scroll distance between pipe spawns at the start of a run (pixels)
    pub spawn_distance: f32,
    /// Hard floor the spawn distance ramps down toward
    pub min_spawn_distance: f32,
    /// Spawn distance shrink per passed pipe pair
    pub spawn_distance_step: f32,
    /// Vertical opening between a pair's halves (pixels, exact)
    pub gap_width: f32,
    /// Shortest a pipe half may be; keep over the pipe head height
    pub min_pipe_height: f32,
    /// Discrete gap-placement tiers added to the spawn bound
    pub height_tiers: [f32; 3],
    /// Selection weights for the tiers, smallest tier first
    pub tier_weights: [f32; 3],

    // === Obstacle geometry ===
    /// Pipe head (cap) footprint
    pub pipe_width: f32,
    pub pipe_head_height: f32,
    /// Pipe body is narrower than the head and centered under it
    pub pipe_body_width: f32,
    /// Ground band height (band top is the ground line)
    pub ground_height: f32,

    // === Scoring ===
    /// Points per passed pipe pair
    pub score_increase: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 14.0,
            jump_velocity: -5.1,
            avatar_width: 90.0,
            avatar_height: 64.0,
            avatar_start: Vec2::new(100.0, 400.0),
            ground_overlap: 15.0,

            rotation_min: -15.0,
            rotation_max: 90.0,
            rotation_initial: 1.0,
            fall_rotation_divisor: 2.5,
            rise_rotation_factor: 2.0,

            idle_amplitude: 50.0,
            idle_speed: 1.0,

            base_scroll_speed: 2.0,

            spawn_distance: 600.0,
            min_spawn_distance: 375.0,
            spawn_distance_step: 0.225225225,
            gap_width: 200.0,
            min_pipe_height: 70.0,
            height_tiers: [150.0, 300.0, 450.0],
            tier_weights: [2.0, 1.5, 1.0],

            pipe_width: 120.0,
            pipe_head_height: 60.0,
            pipe_body_width: 100.0,
            ground_height: 150.0,

            score_increase: 1,
        }
    }
}

impl Tuning {
    /// Y level of the ground line; game objects sit above this
    #[inline]
    pub fn ground_line(&self) -> f32 {
        SCREEN_HEIGHT - self.ground_height
    }

    /// Lowest y the avatar's top edge may reach (sinks `ground_overlap`
    /// pixels into the ground band so ground contact registers as a mask
    /// collision)
    #[inline]
    pub fn avatar_floor(&self) -> f32 {
        self.ground_line() + self.ground_overlap - self.avatar_height
    }

    /// Valid band for a spawned gap-top y so both pipe halves keep at least
    /// `min_pipe_height` and the gap never reaches into the ground band
    pub fn gap_top_range(&self) -> (f32, f32) {
        let lo = self.min_pipe_height;
        let hi = self.ground_line() - self.gap_width - self.min_pipe_height;
        (lo, hi.max(lo))
    }

    /// X coordinate pipes spawn at (just past the right screen edge)
    #[inline]
    pub fn spawn_x(&self) -> f32 {
        SCREEN_WIDTH
    }

    /// Load tuning from a JSON file, falling back to defaults on any failure
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Tuning>(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning overrides from {}", path.display());
                    tuning.sanitized()
                }
                Err(e) => {
                    log::warn!("Bad tuning file {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Clamp override values that would break simulation invariants
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.gap_width < self.avatar_height {
            log::warn!(
                "gap_width {} smaller than avatar, using default",
                self.gap_width
            );
            self.gap_width = defaults.gap_width;
        }
        if self.min_pipe_height < self.pipe_head_height {
            self.min_pipe_height = self.pipe_head_height;
        }
        if self.min_spawn_distance > self.spawn_distance {
            self.min_spawn_distance = self.spawn_distance;
        }
        if self.tier_weights.iter().any(|w| *w <= 0.0) {
            log::warn!("Non-positive tier weight, using default weights");
            self.tier_weights = defaults.tier_weights;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_top_range_fits_playfield() {
        let tuning = Tuning::default();
        let (lo, hi) = tuning.gap_top_range();
        assert!(lo >= tuning.min_pipe_height);
        assert!(hi + tuning.gap_width + tuning.min_pipe_height <= tuning.ground_line());
        assert!(lo <= hi);
    }

    #[test]
    fn test_sanitize_rejects_degenerate_gap() {
        let tuning = Tuning {
            gap_width: 10.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(tuning.gap_width, Tuning::default().gap_width);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let tuning = Tuning::load(std::path::Path::new("/nonexistent/tuning.json"));
        assert_eq!(tuning.gravity, Tuning::default().gravity);
    }
}
