//! Gapwing entry point
//!
//! Headless demo: the simulation plays itself with a simple autopilot.
//! Useful for balance passes and smoke tests without a renderer attached.
//! Usage: `gapwing [seed] [runs]`, tuning overrides via `GAPWING_TUNING`.

use gapwing::Tuning;
use gapwing::consts::{SIM_DT, SIM_FPS};
use gapwing::sim::{GamePhase, GameState, TickInput, tick};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0xF1A9);
    let runs: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);

    let tuning = match std::env::var("GAPWING_TUNING") {
        Ok(path) => Tuning::load(std::path::Path::new(&path)),
        Err(_) => Tuning::default(),
    };

    log::info!("Gapwing headless demo (seed {seed}, {runs} runs)");
    let mut state = GameState::with_tuning(seed, tuning);
    state.set_measured_fps(SIM_FPS);

    let begin = TickInput {
        begin: true,
        ..Default::default()
    };
    tick(&mut state, &begin, SIM_DT);

    let mut finished = 0;
    while finished < runs {
        let input = TickInput {
            jump: autopilot(&state),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        if state.phase == GamePhase::GameOver {
            finished += 1;
            log::info!(
                "Run {finished}: score {}, session best {}",
                state.scores.score,
                state.scores.best
            );
            if finished < runs {
                // Let the scoreboard slide in before restarting, as a player
                // would see it
                while !state.overlay.settled() {
                    tick(&mut state, &TickInput::default(), SIM_DT);
                }
                let restart = TickInput {
                    restart: true,
                    ..Default::default()
                };
                tick(&mut state, &restart, SIM_DT);
            }
        }
    }

    println!(
        "best score across {runs} runs: {} ({} ticks simulated)",
        state.scores.best, state.time_ticks
    );
}

/// Flap whenever the avatar has sunk below its target line and is falling
///
/// The target is the center of the next gap, or the start height when no
/// pipe is ahead yet. Mirrors how a cautious player rides the gap center.
fn autopilot(state: &GameState) -> bool {
    let tuning = &state.tuning;
    let target = state
        .obstacles
        .by_serial(state.current_serial())
        .map(|pair| pair.gap_top + tuning.gap_width / 2.0)
        .unwrap_or(tuning.avatar_start.y);
    let center = state.avatar.pos.y + tuning.avatar_height / 2.0;
    center > target && state.avatar.velocity(tuning) > 0.0
}
