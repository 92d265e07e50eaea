//! Session state for one player run
//!
//! The caller owns a `GameState` and hands it to the cascade functions one
//! command at a time. The RNG lives here so every draw in a run comes from the
//! run seed.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::{create_initial_board, find_valid_move, has_valid_moves, shuffle_board};
use super::grid::Grid;
use super::level::{LevelConfig, Objective, level_config};
use super::tile::{Position, TileFactory, TileKind};
use crate::consts::MIN_MOVES;

/// Where the current level attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Accepting swaps
    Playing,
    /// Objective met; call `advance_level`
    LevelComplete,
    /// Out of moves; call `restart_level`
    LevelFailed,
}

/// Things a presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    /// Swap produced no match and was undone
    SwapRejected { from: Position, to: Position },
    /// One cascade iteration cleared `count` tiles; `combo` counts from 1
    MatchCleared { count: usize, combo: u32 },
    /// Board was deadlocked and got reshuffled
    Shuffled,
    LevelComplete { level: u32, score: u64 },
    LevelFailed { level: u32 },
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) factory: TileFactory,
    /// Current level (1-based)
    pub level: u32,
    pub config: LevelConfig,
    pub grid: Grid,
    pub score: u64,
    /// Score carried into the current level, restored on restart
    pub level_start_score: u64,
    pub moves_left: u32,
    /// Difficulty adjustment applied to every level's move budget
    pub move_bonus: i32,
    /// First half of a pending swap
    pub selected: Option<Position>,
    /// A cascade is in flight; new commands are refused
    pub busy: bool,
    pub phase: GamePhase,
    /// Cleared tiles per kind this level
    pub collected: BTreeMap<TileKind, u32>,
    /// Pending events, drained by `take_events`
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Start a run at `level` with the given seed
    pub fn new(seed: u64, level: u32) -> Self {
        Self::with_move_bonus(seed, level, 0)
    }

    /// Start a run whose move budgets are shifted by `move_bonus`
    pub fn with_move_bonus(seed: u64, level: u32, move_bonus: i32) -> Self {
        let level = level.max(1);
        let config = level_config(level);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            factory: TileFactory::new(),
            level,
            grid: Grid::empty(config.size.rows, config.size.cols),
            config,
            score: 0,
            level_start_score: 0,
            moves_left: 0,
            move_bonus,
            selected: None,
            busy: false,
            phase: GamePhase::Playing,
            collected: BTreeMap::new(),
            events: Vec::new(),
        };
        state.start_level(level);
        state
    }

    /// Reset everything level-scoped and deal a fresh board
    fn start_level(&mut self, level: u32) {
        self.level = level;
        self.config = level_config(level);
        self.moves_left =
            (self.config.moves as i64 + self.move_bonus as i64).max(MIN_MOVES as i64) as u32;
        self.level_start_score = self.score;
        self.selected = None;
        self.busy = false;
        self.phase = GamePhase::Playing;
        self.collected.clear();

        let size = self.config.size;
        let grid = create_initial_board(
            size.rows,
            size.cols,
            level,
            &mut self.factory,
            &mut self.rng,
        );
        self.grid = if has_valid_moves(&grid) {
            grid
        } else {
            log::info!("Level {} dealt a deadlocked board, shuffling", level);
            shuffle_board(&grid, level, &mut self.factory, &mut self.rng)
        };

        log::info!(
            "Level {}: {}x{} board, {} moves, objective {:?}",
            level,
            size.rows,
            size.cols,
            self.moves_left,
            self.config.objective
        );
        self.events.push(GameEvent::LevelStarted { level });
    }

    /// Move to the next level, carrying the score forward
    pub fn advance_level(&mut self) {
        self.start_level(self.level + 1);
    }

    /// Replay the current level from the score it started with
    pub fn restart_level(&mut self) {
        self.score = self.level_start_score;
        self.start_level(self.level);
    }

    pub fn objective(&self) -> &Objective {
        &self.config.objective
    }

    pub fn objective_met(&self) -> bool {
        self.config.objective.is_satisfied(&self.grid, &self.collected)
    }

    /// (kind, collected, target) for each kind a collect objective requires
    pub fn progress(&self) -> Vec<(TileKind, u32, u32)> {
        match &self.config.objective {
            Objective::ClearBoard => Vec::new(),
            Objective::CollectColors { targets } => targets
                .iter()
                .map(|(&kind, &target)| {
                    (kind, self.collected.get(&kind).copied().unwrap_or(0), target)
                })
                .collect(),
        }
    }

    /// A swap that would match on the current board
    pub fn hint(&self) -> Option<(Position, Position)> {
        find_valid_move(&self.grid)
    }

    /// Drain pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Record cleared tiles toward a collect objective
    pub(crate) fn record_cleared(&mut self, kind: TileKind) {
        if self.config.objective.tracks(kind) {
            *self.collected.entry(kind).or_insert(0) += 1;
        }
    }

    /// Replace the board with a playable permutation of itself
    pub(crate) fn shuffle(&mut self) {
        self.grid = shuffle_board(&self.grid, self.level, &mut self.factory, &mut self.rng);
        self.events.push(GameEvent::Shuffled);
    }

    /// Compact and refill the current board
    pub(crate) fn settle(&mut self) {
        self.grid = self
            .grid
            .apply_gravity(&mut self.factory, &mut self.rng, self.level);
    }
}
