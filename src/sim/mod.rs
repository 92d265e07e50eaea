//! Deterministic board simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, passed in explicitly
//! - Transforms return new grids instead of mutating shared ones
//! - Stable iteration order (row-major, ordered match sets)
//! - No rendering or platform dependencies

pub mod board;
pub mod cascade;
pub mod grid;
pub mod level;
pub mod matches;
pub mod state;
pub mod tile;

pub use board::{create_initial_board, find_valid_move, has_valid_moves, shuffle_board};
pub use cascade::{
    Cascade, CascadeStep, CascadeSummary, RejectReason, SelectOutcome, SwapOutcome, TurnOutcome,
    resolve_swap, select_tile,
};
pub use grid::Grid;
pub use level::{BOARD_SIZE_TABLE, BoardSize, LevelConfig, Objective, board_size, level_config};
pub use matches::{MatchSet, find_matches};
pub use state::{GameEvent, GamePhase, GameState};
pub use tile::{Position, Tile, TileFactory, TileKind, are_adjacent};
