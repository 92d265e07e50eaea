//! Candy Cascade headless runner
//!
//! Plays a seeded run by always taking the first available match and prints
//! each board at rest. Usage: `candy-cascade [settings.json]`

use std::time::{SystemTime, UNIX_EPOCH};

use candy_cascade::Settings;
use candy_cascade::sim::{
    CascadeStep, GamePhase, GameState, Grid, SwapOutcome, TurnOutcome, resolve_swap,
};

fn main() {
    env_logger::init();
    log::info!("Candy Cascade (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    let seed = settings.seed.unwrap_or_else(clock_seed);
    log::info!(
        "Seed {}, difficulty {}, start level {}",
        seed,
        settings.difficulty.as_str(),
        settings.effective_start_level()
    );

    let mut state = GameState::with_move_bonus(
        seed,
        settings.effective_start_level(),
        settings.difficulty.bonus_moves(),
    );
    print_board(&state.grid);

    for turn in 1..=settings.auto_play_moves {
        match state.phase {
            GamePhase::LevelComplete => {
                println!("Level {} complete! Score {}", state.level, state.score);
                state.advance_level();
                print_board(&state.grid);
                continue;
            }
            GamePhase::LevelFailed => {
                println!("Level {} failed with score {}", state.level, state.score);
                break;
            }
            GamePhase::Playing => {}
        }

        let Some((a, b)) = state.hint() else {
            log::warn!("No move available on turn {}", turn);
            break;
        };
        if settings.show_hints {
            println!("Turn {}: swap ({},{}) <-> ({},{})", turn, a.row, a.col, b.row, b.col);
        }

        match resolve_swap(&mut state, a, b) {
            SwapOutcome::Accepted(cascade) => {
                for step in cascade {
                    match step {
                        CascadeStep::Breaking { iteration, matches, .. } => {
                            println!("  combo x{}: {} tiles", iteration, matches.len());
                        }
                        CascadeStep::Settled { .. } => {}
                        CascadeStep::Finished(summary) => {
                            println!(
                                "  +{} points{}",
                                summary.score_delta,
                                if summary.shuffled { " (board shuffled)" } else { "" }
                            );
                            if summary.outcome == TurnOutcome::Continue {
                                print_board(&summary.grid);
                            }
                        }
                    }
                }
            }
            SwapOutcome::Reverted { .. } => println!("  no match, reverted"),
            SwapOutcome::Rejected(reason) => println!("  rejected: {:?}", reason),
        }
        println!(
            "Score {} | moves left {} | level {}",
            state.score, state.moves_left, state.level
        );
        for (kind, got, target) in state.progress() {
            println!("  {:?}: {}/{}", kind, got, target);
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn print_board(grid: &Grid) {
    for row in grid.to_symbols() {
        let spaced: Vec<String> = row.chars().map(String::from).collect();
        println!("    {}", spaced.join(" "));
    }
}
