//! Swap handling and cascade resolution
//!
//! An accepted swap yields a `Cascade`: a lazy iterator of board snapshots.
//! Each iteration produces a `Breaking` step (matched tiles flagged) and a
//! `Settled` step (tiles removed, columns compacted and refilled). The last
//! item is `Finished` with the turn's totals. The caller pulls steps at its own
//! pace; the engine never waits.
//!
//! A cascade holds the session mutably, so no other command can run while it
//! is alive. Dropping it early still resolves the remaining steps.

use serde::{Deserialize, Serialize};

use super::board::has_valid_moves;
use super::grid::Grid;
use super::matches::{MatchSet, find_matches};
use super::state::{GameEvent, GamePhase, GameState};
use super::tile::{Position, are_adjacent};
use crate::consts::*;

/// Why a swap request was refused before touching the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// A cascade is still resolving
    Busy,
    /// Level already won or lost
    LevelOver,
    NotAdjacent,
    OutOfBounds,
}

/// How the turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    Continue,
    LevelComplete,
    LevelFailed,
}

/// Totals for one accepted swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeSummary {
    /// Tiles cleared across all iterations
    pub matched_count: usize,
    pub score_delta: u64,
    pub iterations: u32,
    /// Iteration cap stopped the cascade while matches remained
    pub capped: bool,
    /// Board was deadlocked afterwards and got reshuffled
    pub shuffled: bool,
    pub outcome: TurnOutcome,
    /// Board at rest
    pub grid: Grid,
}

/// One observable stage of a cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CascadeStep {
    /// Matched tiles flagged, not yet removed
    Breaking {
        iteration: u32,
        grid: Grid,
        matches: MatchSet,
    },
    /// Matched tiles removed, gravity and refill applied
    Settled { iteration: u32, grid: Grid },
    Finished(CascadeSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Break,
    Fall,
    Finish,
    Done,
}

/// Lazy cascade over an accepted swap
#[derive(Debug)]
pub struct Cascade<'a> {
    state: &'a mut GameState,
    pending: MatchSet,
    iteration: u32,
    matched_count: usize,
    stage: Stage,
    summary: Option<CascadeSummary>,
}

impl<'a> Cascade<'a> {
    fn new(state: &'a mut GameState, pending: MatchSet) -> Self {
        state.busy = true;
        Self {
            state,
            pending,
            iteration: 0,
            matched_count: 0,
            stage: Stage::Break,
            summary: None,
        }
    }

    /// Resolve every remaining step and return the totals. Safe to call on a
    /// cascade that has already yielded `Finished`.
    pub fn finish(mut self) -> CascadeSummary {
        loop {
            if let Some(summary) = self.summary.take() {
                return summary;
            }
            self.next();
        }
    }

    fn score_delta(&self) -> u64 {
        self.matched_count as u64 * POINTS_PER_TILE * self.state.level as u64
    }

    fn break_step(&mut self) -> CascadeStep {
        self.iteration += 1;
        self.matched_count += self.pending.len();

        let kinds: Vec<_> = self
            .pending
            .iter()
            .filter_map(|&pos| self.state.grid.get(pos).map(|t| t.kind))
            .collect();
        for kind in kinds {
            self.state.record_cleared(kind);
        }

        self.state.grid = self.state.grid.mark_matches(&self.pending);
        self.state.events.push(GameEvent::MatchCleared {
            count: self.pending.len(),
            combo: self.iteration,
        });
        log::debug!(
            "Cascade iteration {}: {} tile(s) matched",
            self.iteration,
            self.pending.len()
        );

        self.stage = Stage::Fall;
        CascadeStep::Breaking {
            iteration: self.iteration,
            grid: self.state.grid.clone(),
            matches: self.pending.clone(),
        }
    }

    fn fall_step(&mut self) -> CascadeStep {
        self.state.grid = self.state.grid.remove_matches(&self.pending);
        self.state.settle();
        self.pending = find_matches(&self.state.grid);

        self.stage = if self.pending.is_empty() {
            Stage::Finish
        } else if self.iteration >= MAX_CASCADE_ITERATIONS {
            log::warn!(
                "Cascade stopped at {} iterations with {} tile(s) still matched",
                self.iteration,
                self.pending.len()
            );
            Stage::Finish
        } else {
            Stage::Break
        };

        CascadeStep::Settled {
            iteration: self.iteration,
            grid: self.state.grid.clone(),
        }
    }

    fn finish_step(&mut self) -> CascadeStep {
        let score_delta = self.score_delta();
        self.state.score += score_delta;

        let mut shuffled = false;
        let outcome = if self.state.objective_met() {
            self.state.phase = GamePhase::LevelComplete;
            self.state.events.push(GameEvent::LevelComplete {
                level: self.state.level,
                score: self.state.score,
            });
            log::info!(
                "Level {} complete, score {}",
                self.state.level,
                self.state.score
            );
            TurnOutcome::LevelComplete
        } else if self.state.moves_left == 0 {
            self.state.phase = GamePhase::LevelFailed;
            self.state.events.push(GameEvent::LevelFailed {
                level: self.state.level,
            });
            log::info!("Level {} failed: out of moves", self.state.level);
            TurnOutcome::LevelFailed
        } else {
            if !has_valid_moves(&self.state.grid) {
                log::info!("No valid moves left, shuffling");
                self.state.shuffle();
                shuffled = true;
            }
            TurnOutcome::Continue
        };

        let summary = CascadeSummary {
            matched_count: self.matched_count,
            score_delta,
            iterations: self.iteration,
            capped: !self.pending.is_empty(),
            shuffled,
            outcome,
            grid: self.state.grid.clone(),
        };
        self.summary = Some(summary.clone());
        self.state.busy = false;
        self.stage = Stage::Done;
        CascadeStep::Finished(summary)
    }
}

impl Iterator for Cascade<'_> {
    type Item = CascadeStep;

    fn next(&mut self) -> Option<CascadeStep> {
        match self.stage {
            Stage::Break => Some(self.break_step()),
            Stage::Fall => Some(self.fall_step()),
            Stage::Finish => Some(self.finish_step()),
            Stage::Done => None,
        }
    }
}

impl Drop for Cascade<'_> {
    fn drop(&mut self) {
        // An accepted swap always resolves fully
        while self.next().is_some() {}
    }
}

/// Result of a swap request
#[derive(Debug)]
pub enum SwapOutcome<'a> {
    Rejected(RejectReason),
    /// No match; the board is unchanged. `swapped` is the attempted layout
    /// for a swap-and-back animation.
    Reverted { swapped: Grid },
    /// Move spent; pull the cascade to resolve it
    Accepted(Cascade<'a>),
}

/// Attempt to swap two tiles on the session board
pub fn resolve_swap(state: &mut GameState, a: Position, b: Position) -> SwapOutcome<'_> {
    if state.busy {
        return SwapOutcome::Rejected(RejectReason::Busy);
    }
    if state.phase != GamePhase::Playing {
        return SwapOutcome::Rejected(RejectReason::LevelOver);
    }
    if !state.grid.contains(a) || !state.grid.contains(b) {
        return SwapOutcome::Rejected(RejectReason::OutOfBounds);
    }
    if !are_adjacent(a, b) {
        return SwapOutcome::Rejected(RejectReason::NotAdjacent);
    }

    let swapped = state.grid.swap_candies(a, b);
    let matches = find_matches(&swapped);
    state.selected = None;

    if matches.is_empty() {
        state.events.push(GameEvent::SwapRejected { from: a, to: b });
        return SwapOutcome::Reverted { swapped };
    }

    state.grid = swapped;
    state.moves_left = state.moves_left.saturating_sub(1);
    SwapOutcome::Accepted(Cascade::new(state, matches))
}

/// Result of selecting a tile
#[derive(Debug)]
pub enum SelectOutcome<'a> {
    /// Command refused (cascade in flight, level over, or off the board)
    Ignored,
    /// Became the first half of a swap
    Selected(Position),
    /// Same tile tapped twice
    Deselected,
    /// Adjacent second tile: swap attempted
    Swapped(SwapOutcome<'a>),
}

/// Two-tap swap input: first tap selects, an adjacent second tap swaps, a
/// non-adjacent second tap moves the selection
pub fn select_tile(state: &mut GameState, pos: Position) -> SelectOutcome<'_> {
    if state.busy || state.phase != GamePhase::Playing || !state.grid.contains(pos) {
        return SelectOutcome::Ignored;
    }
    let selected = state.selected;
    match selected {
        None => {
            state.selected = Some(pos);
            SelectOutcome::Selected(pos)
        }
        Some(first) if first == pos => {
            state.selected = None;
            SelectOutcome::Deselected
        }
        Some(first) if !are_adjacent(first, pos) => {
            state.selected = Some(pos);
            SelectOutcome::Selected(pos)
        }
        Some(first) => SelectOutcome::Swapped(resolve_swap(state, first, pos)),
    }
}
