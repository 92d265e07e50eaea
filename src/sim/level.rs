//! Level progression: board size, move budget and win objective per level
//!
//! Everything here is a pure function of the level number. Collect objectives
//! pick their kinds with an RNG seeded from the level itself, so the same
//! level always asks for the same kinds.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use super::tile::TileKind;
use crate::consts::*;

/// (last level of the range, board side length). Levels past the last entry
/// use `MAX_BOARD_SIDE`.
pub const BOARD_SIZE_TABLE: [(u32, usize); 7] = [
    (10, 4),
    (30, 5),
    (60, 6),
    (100, 7),
    (200, 8),
    (350, 9),
    (700, 10),
];

/// Side length for every level beyond the table
pub const MAX_BOARD_SIDE: usize = 11;

/// Board dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSize {
    pub rows: usize,
    pub cols: usize,
}

impl BoardSize {
    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }
}

/// Win condition for a level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    /// Win when no tile remains on the board. Gravity refills every cleared
    /// cell, so in play these levels only end when the moves run out.
    ClearBoard,
    /// Win when every listed kind has been cleared at least `target` times
    CollectColors { targets: BTreeMap<TileKind, u32> },
}

impl Objective {
    /// Check the objective against the current board and cumulative clears
    pub fn is_satisfied(&self, grid: &Grid, collected: &BTreeMap<TileKind, u32>) -> bool {
        match self {
            Objective::ClearBoard => grid.is_empty(),
            Objective::CollectColors { targets } => targets
                .iter()
                .all(|(kind, &target)| collected.get(kind).copied().unwrap_or(0) >= target),
        }
    }

    /// Does clearing a tile of this kind count toward the objective?
    pub fn tracks(&self, kind: TileKind) -> bool {
        match self {
            Objective::ClearBoard => false,
            Objective::CollectColors { targets } => targets.contains_key(&kind),
        }
    }
}

/// Everything a level attempt needs before a board exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level: u32,
    pub moves: u32,
    pub size: BoardSize,
    pub objective: Objective,
}

/// Square board size for a level, non-decreasing in level
pub fn board_size(level: u32) -> BoardSize {
    let side = BOARD_SIZE_TABLE
        .iter()
        .find(|&&(last, _)| level <= last)
        .map_or(MAX_BOARD_SIDE, |&(_, side)| side);
    BoardSize {
        rows: side,
        cols: side,
    }
}

/// Move budget: `max(15, floor(1.5 * cells) - floor(level / 10))`
pub fn move_budget(level: u32, size: BoardSize) -> u32 {
    let base = (size.cells() * 3 / 2) as i64;
    let budget = base - (level / 10) as i64;
    budget.max(MIN_MOVES as i64) as u32
}

/// Number of kinds a collect objective asks for: `min(2 + level / 20, 4)`
pub fn collect_kind_count(level: u32) -> usize {
    (2 + (level / 20) as usize).min(MAX_COLLECT_KINDS)
}

/// Per-kind target: `floor(cells * 0.4) + floor(level / 5)`
pub fn collect_target(level: u32, size: BoardSize) -> u32 {
    (size.cells() * COLLECT_TARGET_NUM / COLLECT_TARGET_DEN) as u32 + level / 5
}

/// Resolve a level number (>= 1) to its configuration
pub fn level_config(level: u32) -> LevelConfig {
    let size = board_size(level);
    let moves = move_budget(level, size);

    let objective = if level % COLLECT_LEVEL_INTERVAL == 0 {
        // Knuth multiplicative hash spreads consecutive levels apart
        let mut rng = Pcg32::seed_from_u64((level as u64).wrapping_mul(2654435761));
        let mut palette = TileKind::palette_for_level(level).to_vec();
        palette.shuffle(&mut rng);
        palette.truncate(collect_kind_count(level));

        let target = collect_target(level, size);
        Objective::CollectColors {
            targets: palette.into_iter().map(|kind| (kind, target)).collect(),
        }
    } else {
        Objective::ClearBoard
    };

    LevelConfig {
        level,
        moves,
        size,
        objective,
    }
}
