//! Board generation, move validation and deadlock recovery

use rand::Rng;
use rand::seq::SliceRandom;

use super::grid::Grid;
use super::matches::find_matches;
use super::tile::{Position, TileFactory, TileKind};
use crate::consts::*;

/// Fill a rows x cols board row-major, redrawing any candidate that would
/// complete a run with the tiles already placed above or to its left.
///
/// After `MAX_REGENERATION_ATTEMPTS` redraws the last candidate is kept, so a
/// narrow palette can very occasionally leave a run on the fresh board.
pub fn create_initial_board<R: Rng>(
    rows: usize,
    cols: usize,
    level: u32,
    factory: &mut TileFactory,
    rng: &mut R,
) -> Grid {
    let mut grid = Grid::empty(rows, cols);
    let mut relaxed = 0u32;

    for row in 0..rows {
        for col in 0..cols {
            let mut kind = TileKind::random(rng, level);
            let mut attempts = 0;
            while would_complete_run(&grid, row, col, kind) {
                if attempts == MAX_REGENERATION_ATTEMPTS {
                    relaxed += 1;
                    break;
                }
                kind = TileKind::random(rng, level);
                attempts += 1;
            }
            grid.place(factory.make(kind, row, col));
        }
    }

    if relaxed > 0 {
        log::debug!(
            "Board {}x{} (level {}): kept {} candidate(s) after regeneration cap",
            rows,
            cols,
            level,
            relaxed
        );
    }
    grid
}

/// Would `kind` at (row, col) extend a same-kind run leftward or upward to
/// `MIN_RUN`? Only already-filled cells are consulted.
fn would_complete_run(grid: &Grid, row: usize, col: usize, kind: TileKind) -> bool {
    let left = (0..col)
        .rev()
        .take_while(|&c| grid.kind_at(row, c) == Some(kind))
        .count();
    let up = (0..row)
        .rev()
        .take_while(|&r| grid.kind_at(r, col) == Some(kind))
        .count();
    left + 1 >= MIN_RUN || up + 1 >= MIN_RUN
}

/// First swap (row-major, right neighbor before bottom neighbor) that would
/// produce a match, if any
pub fn find_valid_move(grid: &Grid) -> Option<(Position, Position)> {
    for pos in grid.positions() {
        let neighbors = [pos.right(grid.cols()), pos.below(grid.rows())];
        for other in neighbors.into_iter().flatten() {
            if !find_matches(&grid.swap_candies(pos, other)).is_empty() {
                return Some((pos, other));
            }
        }
    }
    None
}

/// Does any adjacent swap produce a match? False means the board is deadlocked.
///
/// Brute force: each trial rescans the whole board. Fine up to 11x11.
pub fn has_valid_moves(grid: &Grid) -> bool {
    find_valid_move(grid).is_some()
}

/// Recover from a deadlock by permuting the existing kinds across the board
/// (ids and positions stay, kind counts are preserved) until the result has a
/// valid move and no standing run. Falls back to fresh boards if the permutation
/// budget runs out.
pub fn shuffle_board<R: Rng>(
    grid: &Grid,
    level: u32,
    factory: &mut TileFactory,
    rng: &mut R,
) -> Grid {
    let mut kinds: Vec<TileKind> = grid.tiles().map(|t| t.kind).collect();

    for attempt in 1..=MAX_SHUFFLE_ATTEMPTS {
        kinds.shuffle(rng);
        let candidate = reassign_kinds(grid, &kinds);
        if find_matches(&candidate).is_empty() && has_valid_moves(&candidate) {
            log::info!("Shuffled deadlocked board in {} attempt(s)", attempt);
            return candidate;
        }
    }

    log::warn!(
        "No playable shuffle in {} attempts, regenerating {}x{} board",
        MAX_SHUFFLE_ATTEMPTS,
        grid.rows(),
        grid.cols()
    );
    let mut fresh = create_initial_board(grid.rows(), grid.cols(), level, factory, rng);
    for _ in 1..MAX_SHUFFLE_ATTEMPTS {
        if has_valid_moves(&fresh) {
            break;
        }
        fresh = create_initial_board(grid.rows(), grid.cols(), level, factory, rng);
    }
    fresh
}

/// Overwrite tile kinds in row-major order
fn reassign_kinds(grid: &Grid, kinds: &[TileKind]) -> Grid {
    let mut next = grid.clone();
    for (tile, &kind) in grid.tiles().zip(kinds) {
        let mut tile = *tile;
        tile.kind = kind;
        tile.matched = false;
        next.place(tile);
    }
    next
}
