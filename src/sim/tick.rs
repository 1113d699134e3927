//! Per-tick simulation step
//!
//! One logical frame: fold input → frame-rate-corrected scroll displacement →
//! maybe spawn → move world → avatar physics → collision → phase transition.
//! Everything here is synchronous and deterministic for a fixed seed and
//! input/timing sequence.

use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::detect_collision;
use super::state::{GamePhase, GameState, ObstaclePair};
use crate::consts::SIM_FPS;

/// Discrete input events as produced by the host's input source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    PrimaryPressDown,
    PrimaryPressUp,
    KeyPress(char),
}

/// Input commands for a single tick (deterministic)
///
/// `begin` and `restart` are the fired-this-tick booleans of the host's
/// start/restart button widgets; the simulation never sees their hit-testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Jump (primary press this tick)
    pub jump: bool,
    /// Start-screen begin control fired
    pub begin: bool,
    /// Game-over restart control fired
    pub restart: bool,
}

impl TickInput {
    /// Fold one tick's raw events into the jump command
    pub fn from_events(events: &[InputEvent]) -> Self {
        Self {
            jump: events.iter().any(|e| *e == InputEvent::PrimaryPressDown),
            ..Default::default()
        }
    }
}

/// Frame-rate correction factor: how many nominal ticks of scroll this real
/// frame stands for
///
/// When the achieved rate drops below target, each tick spans more wall
/// time, so the world must move proportionally farther per tick to keep the
/// real-time scroll speed constant. Always an integer >= 1; a rate of 0
/// means unmeasured and applies no correction.
pub fn speed_factor(target_fps: f32, measured_fps: f32) -> u32 {
    if measured_fps > 0.0 {
        (target_fps / measured_fps.min(target_fps)).round() as u32
    } else {
        1
    }
}

/// This tick's scroll displacement in pixels, applied uniformly to pipes,
/// ground, and the spawn-distance accumulator
pub fn scroll_displacement(state: &GameState) -> f32 {
    speed_factor(SIM_FPS, state.measured_fps) as f32 * state.tuning.base_scroll_speed
}

/// Pick a height tier from the fixed three-entry categorical distribution
///
/// Explicit cumulative-weight table; the default weights bias toward the
/// tightest tier so hard layouts stay the common case.
fn choose_tier(rng: &mut Pcg32, weights: &[f32; 3]) -> usize {
    let mut cumulative = [0.0f32; 3];
    let mut total = 0.0;
    for (i, w) in weights.iter().enumerate() {
        total += w;
        cumulative[i] = total;
    }
    let roll = rng.random_range(0.0..total);
    cumulative.iter().position(|c| roll < *c).unwrap_or(2)
}

/// Spawn a new pipe pair just past the right screen edge
///
/// Gap placement alternates toward whichever screen edge is farther from the
/// previous gap, so layouts never repeat the same side twice in a row.
fn spawn_pair(state: &mut GameState) {
    let tuning = state.tuning.clone();
    let ground = tuning.ground_line();
    let last = state.difficulty.last_gap_top;
    let far_side = if (ground - last).abs() >= last.abs() {
        ground
    } else {
        0.0
    };

    let tier = choose_tier(&mut state.rng, &tuning.tier_weights);
    let bound = tuning.height_tiers[tier] + tuning.min_pipe_height + tuning.gap_width;

    let gap_top = if far_side == 0.0 {
        // Gap biased toward the top of the screen
        state.rng.random_range(tuning.min_pipe_height..=bound)
    } else {
        // Gap biased toward the ground
        far_side
            - state
                .rng
                .random_range(tuning.min_pipe_height + tuning.gap_width..=bound)
    };
    let (lo, hi) = tuning.gap_top_range();
    let gap_top = gap_top.clamp(lo, hi);

    state.difficulty.last_gap_top = gap_top;
    let serial = state.next_serial_id();
    let pair = ObstaclePair::new(serial, tuning.spawn_x(), gap_top, &tuning);
    log::debug!(
        "Spawned pipe pair {serial} (gap top {gap_top:.0}, spacing {:.1})",
        state.difficulty.spawn_threshold
    );
    state.obstacles.push(pair);
}

/// Accumulate scrolled distance and spawn when the spacing threshold is
/// reached; the first spawn of a run happens immediately
fn generate_obstacles(state: &mut GameState, displacement: f32) {
    state.difficulty.distance_since_spawn += displacement;
    if state.difficulty.first_spawn_pending
        || state.difficulty.distance_since_spawn >= state.difficulty.spawn_threshold
    {
        state.difficulty.distance_since_spawn = 0.0;
        state.difficulty.first_spawn_pending = false;
        spawn_pair(state);
    }
}

/// Score the current pair once the avatar's leading edge is past its left
/// edge, and tighten the spawn spacing (the sole difficulty ramp)
fn score_passes(state: &mut GameState) {
    let passed_x = state
        .obstacles
        .by_serial(state.current_serial())
        .map(|pair| pair.x);
    if let Some(x) = passed_x
        && state.avatar.left() > x
    {
        state.scores.score += state.tuning.score_increase;
        state.difficulty.ramp(&state.tuning);
        state.advance_current_serial();
        log::debug!(
            "Passed pair {}, score {}",
            state.current_serial() - 1,
            state.scores.score
        );
    }
}

/// Advance the game by one tick of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    match state.phase {
        GamePhase::StartScreen => {
            // Bounded idle bob around the start height; jump is ignored here
            let start_y = state.tuning.avatar_start.y;
            let amplitude = state.tuning.idle_amplitude;
            state.avatar.pos.y += state.idle_vel;
            if state.avatar.pos.y >= start_y + amplitude {
                state.idle_vel = -state.idle_vel.abs();
            } else if state.avatar.pos.y <= start_y - amplitude {
                state.idle_vel = state.idle_vel.abs();
            }

            if input.begin {
                state.begin_run();
            }
        }

        GamePhase::Playing => {
            let displacement = scroll_displacement(state);
            generate_obstacles(state, displacement);
            state.obstacles.shift_all(displacement, &state.tuning);
            score_passes(state);

            state.avatar.update(&state.tuning, input.jump, dt);

            if let Some(hit) = detect_collision(&state.avatar, &state.obstacles, &state.tuning) {
                log::debug!("Collision: {hit:?}");
                state.enter_game_over();
            }
        }

        GamePhase::GameOver => {
            // World frozen; the avatar keeps falling with jumping disabled
            state.avatar.update(&state.tuning, input.jump, dt);
            state.overlay.advance();

            if input.restart {
                state.restart_run();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::consts::SIM_DT;
    use crate::sim::state::Avatar;
    use proptest::prelude::*;
    use rand::SeedableRng;

    /// A state already past the start screen
    fn playing_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        let begin = TickInput {
            begin: true,
            ..Default::default()
        };
        tick(&mut state, &begin, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        state
    }

    #[test]
    fn test_speed_factor_cases() {
        assert_eq!(speed_factor(120.0, 60.0), 2);
        assert_eq!(speed_factor(120.0, 0.0), 1);
        assert_eq!(speed_factor(120.0, 120.0), 1);
        // Overshooting the target never slows the world down
        assert_eq!(speed_factor(120.0, 240.0), 1);
        assert_eq!(speed_factor(120.0, 40.0), 3);
    }

    #[test]
    fn test_choose_tier_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let weights = Tuning::default().tier_weights;
        let mut seen = [0u32; 3];
        for _ in 0..1000 {
            let tier = choose_tier(&mut rng, &weights);
            assert!(tier < 3);
            seen[tier] += 1;
        }
        // Weights 2 : 1.5 : 1 — the tightest tier must dominate
        assert!(seen[0] > seen[2]);
    }

    #[test]
    fn test_begin_spawns_first_pair_immediately() {
        let mut state = playing_state(1);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.obstacles.pipes.len(), 1);
        assert_eq!(state.obstacles.pipes[0].serial, 0);
    }

    #[test]
    fn test_spawn_gap_invariants() {
        let mut state = playing_state(42);
        let tuning = state.tuning.clone();
        // Force many spawns by running a while at heavy slowdown
        state.set_measured_fps(10.0);
        for _ in 0..2000 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if state.phase != GamePhase::Playing {
                break;
            }
        }
        assert!(!state.obstacles.pipes.is_empty());
        for pair in &state.obstacles.pipes {
            assert_eq!(pair.gap_bottom(&tuning) - pair.gap_top, tuning.gap_width);
            assert!(pair.gap_top >= tuning.min_pipe_height);
            assert!(pair.gap_bottom(&tuning) <= tuning.ground_line());
        }
    }

    #[test]
    fn test_serials_strictly_increase() {
        let mut state = playing_state(3);
        state.set_measured_fps(10.0);
        let mut last_seen: Option<u32> = None;
        for _ in 0..3000 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if let Some(newest) = state.obstacles.pipes.last() {
                if let Some(prev) = last_seen {
                    assert!(newest.serial >= prev);
                }
                last_seen = Some(newest.serial);
            }
            if state.phase != GamePhase::Playing {
                break;
            }
        }
        assert!(last_seen.unwrap_or(0) > 0, "expected multiple spawns");
    }

    #[test]
    fn test_spawn_biases_away_from_previous_gap() {
        fn mean_gap_top(state: &mut GameState, forced_last: f32) -> f32 {
            let mut sum = 0.0;
            for _ in 0..200 {
                state.difficulty.last_gap_top = forced_last;
                spawn_pair(state);
                sum += state.obstacles.pipes.last().unwrap().gap_top;
                state.obstacles.clear_pipes();
            }
            sum / 200.0
        }

        let mut state = playing_state(21);
        let ground = state.tuning.ground_line();
        // Previous gap at the top edge pushes new gaps toward the ground and
        // vice versa
        let bottom_biased = mean_gap_top(&mut state, 0.0);
        let top_biased = mean_gap_top(&mut state, ground);
        assert!(
            bottom_biased > top_biased + 20.0,
            "expected bottom bias ({bottom_biased}) well below top bias ({top_biased})"
        );
    }

    #[test]
    fn test_game_over_freezes_world_and_captures_best_once() {
        let mut state = playing_state(9);
        state.scores.score = 7;
        // Drop the avatar onto the ground band
        state.avatar.pos.y = state.tuning.avatar_floor();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.scores.best, 7);
        assert!(state.avatar.jump_disabled);

        let pipes_before: Vec<f32> = state.obstacles.pipes.iter().map(|p| p.x).collect();
        state.scores.score = 3; // would lower best if entry re-ran
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.scores.best, 7);
        let pipes_after: Vec<f32> = state.obstacles.pipes.iter().map(|p| p.x).collect();
        assert_eq!(pipes_before, pipes_after, "obstacles must freeze");
    }

    #[test]
    fn test_jump_ignored_after_game_over() {
        let mut state = playing_state(11);
        state.avatar.pos.y = state.tuning.avatar_floor();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);

        let fall_before = state.avatar.velocity(&state.tuning);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &jump, SIM_DT);
        // A real jump would have reset velocity to the jump constant
        assert!(state.avatar.velocity(&state.tuning) > fall_before);
    }

    #[test]
    fn test_restart_resets_run_but_keeps_best() {
        let mut state = playing_state(13);
        state.scores.score = 5;
        state.avatar.pos.y = state.tuning.avatar_floor();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.scores.score, 0);
        assert_eq!(state.scores.best, 5);
        assert_eq!(state.avatar.pos, state.tuning.avatar_start);
        assert!(state.obstacles.pipes.is_empty());
        assert!(!state.avatar.jump_disabled);

        // First pair of the new run starts the serials over
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.obstacles.pipes[0].serial, 0);
    }

    #[test]
    fn test_start_screen_idle_bounce_bounded() {
        let mut state = GameState::new(17);
        let start_y = state.tuning.avatar_start.y;
        let amplitude = state.tuning.idle_amplitude;
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        for _ in 0..500 {
            tick(&mut state, &jump, SIM_DT);
            assert_eq!(state.phase, GamePhase::StartScreen);
            assert!(state.avatar.pos.y >= start_y - amplitude - 1.0);
            assert!(state.avatar.pos.y <= start_y + amplitude + 1.0);
        }
        // Jump input on the start screen must not touch the fall clock
        assert_eq!(state.avatar.velocity(&state.tuning), state.tuning.jump_velocity);
    }

    #[test]
    fn test_determinism_same_seed_same_run() {
        let mut a = playing_state(555);
        let mut b = playing_state(555);
        let inputs = [
            TickInput::default(),
            TickInput {
                jump: true,
                ..Default::default()
            },
        ];
        for i in 0..600 {
            let input = inputs[i % 2];
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_events_maps_primary_press() {
        let events = [
            InputEvent::KeyPress('f'),
            InputEvent::PrimaryPressDown,
            InputEvent::PrimaryPressUp,
        ];
        assert!(TickInput::from_events(&events).jump);
        assert!(!TickInput::from_events(&[InputEvent::PrimaryPressUp]).jump);
        assert!(!TickInput::from_events(&[]).jump);
    }

    proptest! {
        #[test]
        fn prop_rotation_always_clamped(jumps in proptest::collection::vec(any::<bool>(), 1..300)) {
            let tuning = Tuning::default();
            let mut avatar = Avatar::new(&tuning);
            for jump in jumps {
                avatar.update(&tuning, jump, SIM_DT);
                prop_assert!(avatar.rotation >= tuning.rotation_min);
                prop_assert!(avatar.rotation <= tuning.rotation_max);
            }
        }

        #[test]
        fn prop_accumulator_below_threshold(seed in any::<u64>(), ticks in 1usize..400) {
            let mut state = playing_state(seed);
            for _ in 0..ticks {
                tick(&mut state, &TickInput::default(), SIM_DT);
                prop_assert!(state.difficulty.distance_since_spawn >= 0.0);
                prop_assert!(
                    state.difficulty.distance_since_spawn < state.difficulty.spawn_threshold
                );
            }
        }

        #[test]
        fn prop_ground_scroll_offset_wraps(displacements in proptest::collection::vec(0.0f32..500.0, 1..100)) {
            let tuning = Tuning::default();
            let mut ground = crate::sim::state::GroundBand::new(&tuning);
            for d in displacements {
                ground.shift(d);
                prop_assert!(ground.scroll_offset() >= 0.0);
                prop_assert!(ground.scroll_offset() < crate::consts::SCREEN_WIDTH);
            }
        }
    }
}
