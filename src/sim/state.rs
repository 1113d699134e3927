//! Game state and core simulation types
//!
//! Everything the renderer reads and the tick loop mutates lives here.

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::mask::{Sprite, SpriteMask, SpriteShape};
use crate::consts::*;
use crate::{Tuning, ceil_px};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen; avatar bobs idly, nothing spawns or moves
    StartScreen,
    /// Active gameplay
    Playing,
    /// Run ended; world frozen, avatar free-falls, scoreboard shown
    GameOver,
}

/// Converts elapsed real time since the last jump into a vertical velocity
///
/// v = g * t + v0, with t reset to zero on every jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionClock {
    fall_time: f32,
}

impl MotionClock {
    pub fn new() -> Self {
        Self { fall_time: 0.0 }
    }

    /// Reset to the jump origin (equivalent to re-applying the fixed
    /// negative jump velocity)
    pub fn restart(&mut self) {
        self.fall_time = 0.0;
    }

    pub fn advance(&mut self, dt: f32) {
        self.fall_time += dt;
    }

    /// Instantaneous vertical velocity
    #[inline]
    pub fn velocity(&self, gravity: f32, jump_velocity: f32) -> f32 {
        gravity * self.fall_time + jump_velocity
    }

    #[inline]
    pub fn fall_time(&self) -> f32 {
        self.fall_time
    }
}

impl Default for MotionClock {
    fn default() -> Self {
        Self::new()
    }
}

/// The player avatar
#[derive(Debug, Clone, PartialEq)]
pub struct Avatar {
    /// Top-left of the unrotated footprint
    pub pos: Vec2,
    /// Display rotation in degrees, clamped to the tuning range
    pub rotation: f32,
    /// Jump input is ignored while set (game over)
    pub jump_disabled: bool,
    clock: MotionClock,
    sprite: Sprite,
}

impl Avatar {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: tuning.avatar_start,
            rotation: tuning.rotation_initial,
            jump_disabled: false,
            clock: MotionClock::new(),
            sprite: Sprite::new(Self::shape(tuning, tuning.rotation_initial)),
        }
    }

    fn shape(tuning: &Tuning, rotation: f32) -> SpriteShape {
        SpriteShape::Avatar {
            width: tuning.avatar_width as u32,
            height: tuning.avatar_height as u32,
            // Quantized so the mask is only rebuilt when the silhouette
            // visibly changes
            rotation: rotation.round(),
        }
    }

    /// Reset the fall clock; ignored while jumping is disabled
    pub fn jump(&mut self) {
        if !self.jump_disabled {
            self.clock.restart();
        }
    }

    /// Instantaneous vertical velocity this tick
    #[inline]
    pub fn velocity(&self, tuning: &Tuning) -> f32 {
        self.clock.velocity(tuning.gravity, tuning.jump_velocity)
    }

    /// Advance gravity, displacement, rotation, and the clamp to the
    /// playfield by one tick of `dt` seconds
    pub fn update(&mut self, tuning: &Tuning, jump_pressed: bool, dt: f32) {
        if jump_pressed {
            self.jump();
        }

        let step = ceil_px(self.velocity(tuning));
        self.pos.y += step as f32;
        self.clock.advance(dt);

        // Rotation tracks velocity: nose down while falling, up while rising.
        // Cosmetic only; it shapes the collision silhouette but never feeds
        // back into physics.
        if step > 0 {
            self.rotation =
                (self.rotation + step as f32 / tuning.fall_rotation_divisor).min(tuning.rotation_max);
        } else {
            self.rotation = (self.rotation - step.abs() as f32 * tuning.rise_rotation_factor)
                .max(tuning.rotation_min);
        }
        self.sprite.set_shape(Self::shape(tuning, self.rotation));

        self.pos.y = self.pos.y.clamp(0.0, tuning.avatar_floor());
        self.pos.x = self
            .pos
            .x
            .clamp(0.0, SCREEN_WIDTH - tuning.avatar_width);
    }

    /// Restore start-of-run state at the given position
    pub fn reset(&mut self, tuning: &Tuning, pos: Vec2) {
        self.pos = pos;
        self.rotation = tuning.rotation_initial;
        self.jump_disabled = false;
        self.clock.restart();
        self.sprite.set_shape(Self::shape(tuning, self.rotation));
    }

    /// Leading (left) edge x
    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn mask(&self) -> &SpriteMask {
        self.sprite.mask()
    }

    /// Screen position of the mask's top-left corner; the rotated silhouette
    /// stays centered on the unrotated footprint
    pub fn mask_pos(&self, tuning: &Tuning) -> IVec2 {
        let center = self.pos + Vec2::new(tuning.avatar_width, tuning.avatar_height) / 2.0;
        let (w, h) = self.sprite.size();
        IVec2::new(
            (center.x - w as f32 / 2.0).round() as i32,
            (center.y - h as f32 / 2.0).round() as i32,
        )
    }
}

/// A top/bottom pipe pair framing one gap
#[derive(Debug, Clone, PartialEq)]
pub struct ObstaclePair {
    /// Spawn serial, shared by both halves; strictly increasing within a run
    pub serial: u32,
    /// Left edge x
    pub x: f32,
    /// Y of the gap's top edge (== bottom edge of the top half)
    pub gap_top: f32,
    top: Sprite,
    bottom: Sprite,
}

impl ObstaclePair {
    pub fn new(serial: u32, x: f32, gap_top: f32, tuning: &Tuning) -> Self {
        let (top, bottom) = Self::halves(gap_top, tuning);
        let pair = Self {
            serial,
            x,
            gap_top,
            top,
            bottom,
        };
        debug_assert!(pair.gap_bottom(tuning) <= tuning.ground_line());
        pair
    }

    /// Shape both halves from a target gap-top, clamping each half to at
    /// least one pipe-head so heights never go negative
    fn halves(gap_top: f32, tuning: &Tuning) -> (Sprite, Sprite) {
        let min_h = tuning.pipe_head_height.max(1.0);
        let top_h = gap_top.max(min_h);
        let bottom_h = (tuning.ground_line() - gap_top - tuning.gap_width).max(min_h);
        let pipe = |height: f32, mouth_down: bool| {
            Sprite::new(SpriteShape::Pipe {
                width: tuning.pipe_width as u32,
                height: height as u32,
                head_height: tuning.pipe_head_height as u32,
                body_width: tuning.pipe_body_width as u32,
                mouth_down,
            })
        };
        (pipe(top_h, true), pipe(bottom_h, false))
    }

    /// Scroll left by `distance` pixels
    pub fn shift(&mut self, distance: f32) {
        self.x -= distance;
    }

    /// Y of the gap's bottom edge (== top edge of the bottom half)
    #[inline]
    pub fn gap_bottom(&self, tuning: &Tuning) -> f32 {
        self.gap_top + tuning.gap_width
    }

    #[inline]
    pub fn right(&self, tuning: &Tuning) -> f32 {
        self.x + tuning.pipe_width
    }

    /// True once the pair has fully left the screen
    #[inline]
    pub fn offscreen(&self, tuning: &Tuning) -> bool {
        self.right(tuning) <= 0.0
    }

    pub fn top_mask(&self) -> (&SpriteMask, IVec2) {
        (self.top.mask(), IVec2::new(self.x.round() as i32, 0))
    }

    pub fn bottom_mask(&self, tuning: &Tuning) -> (&SpriteMask, IVec2) {
        let top_edge = tuning.ground_line() - self.bottom.size().1 as f32;
        (
            self.bottom.mask(),
            IVec2::new(self.x.round() as i32, top_edge.round() as i32),
        )
    }
}

/// Infinitely looping ground strip along the bottom of the playfield
#[derive(Debug, Clone, PartialEq)]
pub struct GroundBand {
    /// Band top y (the ground line)
    pub y: f32,
    /// Scroll offset for the renderer's two-copy loop, wraps at band width
    scroll: f32,
    sprite: Sprite,
}

impl GroundBand {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            y: tuning.ground_line(),
            scroll: 0.0,
            sprite: Sprite::new(SpriteShape::Band {
                width: SCREEN_WIDTH as u32,
                height: tuning.ground_height as u32,
            }),
        }
    }

    /// Scroll left by `distance`, wrapping so the strip loops seamlessly
    pub fn shift(&mut self, distance: f32) {
        let width = self.sprite.size().0 as f32;
        self.scroll = (self.scroll + distance).rem_euclid(width);
    }

    /// Current loop offset in [0, bandWidth)
    #[inline]
    pub fn scroll_offset(&self) -> f32 {
        self.scroll
    }

    pub fn mask(&self) -> (&SpriteMask, IVec2) {
        (self.sprite.mask(), IVec2::new(0, self.y.round() as i32))
    }
}

/// The live obstacles: pipe pairs ordered by serial, plus the ground band
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleSet {
    pub pipes: Vec<ObstaclePair>,
    pub ground: GroundBand,
}

impl ObstacleSet {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pipes: Vec::new(),
            ground: GroundBand::new(tuning),
        }
    }

    /// Scroll every obstacle left and drop pairs that left the screen
    pub fn shift_all(&mut self, distance: f32, tuning: &Tuning) {
        self.ground.shift(distance);
        for pair in &mut self.pipes {
            pair.shift(distance);
        }
        self.pipes.retain(|p| {
            let live = !p.offscreen(tuning);
            if !live {
                log::debug!("Despawning pipe pair {}", p.serial);
            }
            live
        });
    }

    pub fn push(&mut self, pair: ObstaclePair) {
        debug_assert!(
            self.pipes.last().is_none_or(|p| p.serial < pair.serial),
            "pipe serials must increase in spawn order"
        );
        self.pipes.push(pair);
    }

    pub fn clear_pipes(&mut self) {
        self.pipes.clear();
    }

    /// The pair with the given serial, if still live
    pub fn by_serial(&self, serial: u32) -> Option<&ObstaclePair> {
        self.pipes.iter().find(|p| p.serial == serial)
    }
}

/// Spawn-spacing difficulty ramp state
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyState {
    /// Scroll distance between spawns; shrinks as pairs are passed
    pub spawn_threshold: f32,
    /// Distance accumulated since the last spawn
    pub distance_since_spawn: f32,
    /// Gap-top of the previous spawn, biasing the next to the far side
    pub last_gap_top: f32,
    /// Set until the first spawn of a run has happened
    pub first_spawn_pending: bool,
}

impl DifficultyState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            spawn_threshold: tuning.spawn_distance,
            distance_since_spawn: 0.0,
            last_gap_top: 0.0,
            first_spawn_pending: true,
        }
    }

    /// Tighten spacing after a passed pair, floor-clamped
    pub fn ramp(&mut self, tuning: &Tuning) {
        self.spawn_threshold =
            (self.spawn_threshold - tuning.spawn_distance_step).max(tuning.min_spawn_distance);
    }
}

/// Session scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreState {
    pub score: u32,
    /// Best score this session; never decreases
    pub best: u32,
}

impl ScoreState {
    /// Fold the finished run's score into the session best
    pub fn record_best(&mut self) {
        self.best = self.best.max(self.score);
    }
}

/// Scoreboard overlay slide-in (cosmetic)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameOverOverlay {
    /// "Game over" title center y, descending to its rest height
    pub title_y: f32,
    /// Scoreboard center y, ascending from below the screen
    pub board_y: f32,
}

impl GameOverOverlay {
    pub fn new() -> Self {
        Self {
            title_y: -60.0,
            board_y: SCREEN_HEIGHT + 120.0,
        }
    }

    /// Advance the slide-in by one tick
    pub fn advance(&mut self) {
        self.title_y = (self.title_y + OVERLAY_TITLE_SPEED).min(OVERLAY_TITLE_REST_Y);
        self.board_y = (self.board_y - OVERLAY_BOARD_SPEED).max(OVERLAY_BOARD_REST_Y);
    }

    pub fn settled(&self) -> bool {
        self.title_y >= OVERLAY_TITLE_REST_Y && self.board_y <= OVERLAY_BOARD_REST_Y
    }
}

impl Default for GameOverOverlay {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub avatar: Avatar,
    pub obstacles: ObstacleSet,
    pub difficulty: DifficultyState,
    pub scores: ScoreState,
    pub overlay: GameOverOverlay,
    /// Measured real frame rate of the previous second; 0 when unmeasured
    pub measured_fps: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Start-screen idle bounce velocity (pixels per tick, sign flips at the
    /// amplitude bounds)
    pub idle_vel: f32,
    pub(crate) rng: Pcg32,
    /// Serial the next spawned pair will get
    next_serial: u32,
    /// Serial of the pair the avatar has not yet passed
    current_serial: u32,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let avatar = Avatar::new(&tuning);
        let obstacles = ObstacleSet::new(&tuning);
        let difficulty = DifficultyState::new(&tuning);
        Self {
            phase: GamePhase::StartScreen,
            avatar,
            obstacles,
            difficulty,
            scores: ScoreState::default(),
            overlay: GameOverOverlay::new(),
            measured_fps: 0.0,
            time_ticks: 0,
            idle_vel: tuning.idle_speed,
            rng: Pcg32::seed_from_u64(seed),
            next_serial: 0,
            current_serial: 0,
            tuning,
            seed,
        }
    }

    /// Record the achieved frame rate the host measured for the previous
    /// second (0.0 when unavailable)
    pub fn set_measured_fps(&mut self, fps: f32) {
        self.measured_fps = fps.max(0.0);
    }

    /// Allocate the next pipe serial
    pub(crate) fn next_serial_id(&mut self) -> u32 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    /// Serial of the pair the avatar still has to pass
    #[inline]
    pub fn current_serial(&self) -> u32 {
        self.current_serial
    }

    /// Mark the current pair as passed and move on to the next
    pub(crate) fn advance_current_serial(&mut self) {
        self.current_serial += 1;
    }

    /// Leave the start screen and begin a run
    pub(crate) fn begin_run(&mut self) {
        log::info!("Run started (seed {})", self.seed);
        self.phase = GamePhase::Playing;
        self.difficulty = DifficultyState::new(&self.tuning);
        self.avatar.reset(&self.tuning, self.tuning.avatar_start);
    }

    /// One-shot game-over entry: capture best, freeze jumping, start the
    /// overlay slide-in
    pub(crate) fn enter_game_over(&mut self) {
        debug_assert!(self.phase == GamePhase::Playing);
        log::info!(
            "Game over at score {} (best {})",
            self.scores.score,
            self.scores.best.max(self.scores.score)
        );
        self.phase = GamePhase::GameOver;
        self.scores.record_best();
        self.avatar.jump_disabled = true;
        self.overlay = GameOverOverlay::new();
    }

    /// Full reset from game over back into play; the session best survives
    pub(crate) fn restart_run(&mut self) {
        log::info!("Restarting run");
        self.scores.score = 0;
        self.avatar.reset(&self.tuning, self.tuning.avatar_start);
        self.obstacles.clear_pipes();
        self.difficulty = DifficultyState::new(&self.tuning);
        self.next_serial = 0;
        self.current_serial = 0;
        self.idle_vel = self.tuning.idle_speed;
        self.phase = GamePhase::Playing;
    }
}
