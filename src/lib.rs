//! Candy Cascade - a turn-based tile-matching board engine
//!
//! Core modules:
//! - `sim`: Deterministic board simulation (generation, matching, gravity, cascades)
//! - `settings`: Player preferences and difficulty, loaded from JSON
//!
//! The engine is presentation-agnostic. A caller feeds it swap requests and
//! renders the grid snapshots it hands back.

pub mod settings;
pub mod sim;

pub use settings::{Difficulty, Settings, SettingsError};
pub use sim::{
    Cascade, CascadeStep, CascadeSummary, GameEvent, GamePhase, GameState, Grid, LevelConfig,
    MatchSet, Objective, Position, SelectOutcome, SwapOutcome, Tile, TileFactory, TileKind,
};

/// Engine tuning constants
pub mod consts {
    /// Number of tile kinds in the full palette
    pub const PALETTE_SIZE: usize = 6;
    /// Palette width at level 1
    pub const BASE_PALETTE_WIDTH: usize = 4;
    /// Levels per additional palette entry
    pub const LEVELS_PER_EXTRA_KIND: u32 = 10;

    /// Shortest run that counts as a match
    pub const MIN_RUN: usize = 3;

    /// Extra candidate draws per cell when the generator hits a pre-made run.
    /// After this many the last candidate is kept even if it matches.
    pub const MAX_REGENERATION_ATTEMPTS: u32 = 10;
    /// Safety bound on match/remove/refill iterations for one swap
    pub const MAX_CASCADE_ITERATIONS: u32 = 20;
    /// Reshuffles tried before a deadlocked board is regenerated from scratch
    pub const MAX_SHUFFLE_ATTEMPTS: u32 = 50;

    /// Points per cleared tile, multiplied by the level number
    pub const POINTS_PER_TILE: u64 = 10;
    /// Move budget never drops below this
    pub const MIN_MOVES: u32 = 15;

    /// Collect objectives ask for this share of the board per kind (numerator / denominator)
    pub const COLLECT_TARGET_NUM: usize = 2;
    pub const COLLECT_TARGET_DEN: usize = 5;
    /// Collect objectives appear on every Nth level
    pub const COLLECT_LEVEL_INTERVAL: u32 = 5;
    /// Most kinds a collect objective can require
    pub const MAX_COLLECT_KINDS: usize = 4;
}
