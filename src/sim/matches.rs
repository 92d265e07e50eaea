//! Match detection
//!
//! Rows and columns are scanned independently and unioned. A tile sitting on
//! both a horizontal and a vertical run appears once.

use std::collections::BTreeSet;

use super::grid::Grid;
use super::tile::{Position, TileKind};
use crate::consts::MIN_RUN;

/// Matched coordinates. Ordered so iteration is deterministic.
pub type MatchSet = BTreeSet<Position>;

/// Every position that belongs to a run of three or more identical kinds.
/// Runs longer than three are captured whole. Empty means the board is stable.
pub fn find_matches(grid: &Grid) -> MatchSet {
    let mut matches = MatchSet::new();
    for row in 0..grid.rows() {
        scan_line(
            grid.cols(),
            |col| grid.kind_at(row, col),
            |col| Position::new(row, col),
            &mut matches,
        );
    }
    for col in 0..grid.cols() {
        scan_line(
            grid.rows(),
            |row| grid.kind_at(row, col),
            |row| Position::new(row, col),
            &mut matches,
        );
    }
    matches
}

/// Walk one line, anchoring at each run start and extending it as far as
/// the kind repeats. Empty cells never match.
fn scan_line(
    len: usize,
    kind_at: impl Fn(usize) -> Option<TileKind>,
    pos_at: impl Fn(usize) -> Position,
    out: &mut MatchSet,
) {
    let mut start = 0;
    while start < len {
        let Some(kind) = kind_at(start) else {
            start += 1;
            continue;
        };
        let mut end = start + 1;
        while end < len && kind_at(end) == Some(kind) {
            end += 1;
        }
        if end - start >= MIN_RUN {
            out.extend((start..end).map(&pos_at));
        }
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tile::TileFactory;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn grid(rows: &[&str]) -> Grid {
        Grid::from_symbols(rows, &mut TileFactory::new()).expect("valid fixture")
    }

    fn random_grid(rows: usize, cols: usize, level: u32, seed: u64) -> Grid {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut factory = TileFactory::new();
        let mut g = Grid::empty(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                g.place(factory.create_tile(&mut rng, row, col, level));
            }
        }
        g
    }

    /// Per-cell check: count the same-kind stretch through the cell both ways
    fn matched_by_local_runs(g: &Grid, pos: Position) -> bool {
        let Some(kind) = g.kind_at(pos.row, pos.col) else {
            return false;
        };
        let same = |r: usize, c: usize| g.kind_at(r, c) == Some(kind);
        let left = (0..pos.col).rev().take_while(|&c| same(pos.row, c)).count();
        let right = (pos.col + 1..g.cols()).take_while(|&c| same(pos.row, c)).count();
        let up = (0..pos.row).rev().take_while(|&r| same(r, pos.col)).count();
        let down = (pos.row + 1..g.rows()).take_while(|&r| same(r, pos.col)).count();
        left + right + 1 >= MIN_RUN || up + down + 1 >= MIN_RUN
    }

    #[test]
    fn test_no_matches_on_stable_board() {
        let g = grid(&["RBG", "BGR", "GRB"]);
        assert!(find_matches(&g).is_empty());
    }

    #[test]
    fn test_horizontal_run_of_three() {
        let g = grid(&["RRRB", "BGYP", "GYPB"]);
        let m = find_matches(&g);
        assert_eq!(m.len(), 3);
        assert!((0..3).all(|c| m.contains(&Position::new(0, c))));
    }

    #[test]
    fn test_full_column_of_four_is_captured() {
        let g = grid(&["RRBG", "YPBG", "RBYG", "YPRG"]);
        let m = find_matches(&g);
        let column: MatchSet = (0..4).map(|r| Position::new(r, 3)).collect();
        assert_eq!(m, column);
    }

    #[test]
    fn test_run_of_five() {
        let g = grid(&["BBBBB", "RGYPR"]);
        assert_eq!(find_matches(&g).len(), 5);
    }

    #[test]
    fn test_intersecting_runs_dedupe() {
        // T shape: row 0 has RRR, column 1 has RRR; (0,1) is shared
        let g = grid(&["RRRB", "BRGY", "GRYB"]);
        let m = find_matches(&g);
        assert_eq!(m.len(), 5);
        assert!(m.contains(&Position::new(0, 1)));
        assert!(m.contains(&Position::new(2, 1)));
    }

    #[test]
    fn test_two_separate_runs_in_one_row() {
        let g = grid(&["RRRBBB"]);
        assert_eq!(find_matches(&g).len(), 6);
    }

    #[test]
    fn test_pairs_do_not_match() {
        let g = grid(&["RRBBRR", "GGYYGG"]);
        assert!(find_matches(&g).is_empty());
    }

    #[test]
    fn test_empty_cells_break_runs() {
        let g = grid(&["RRRR"]);
        let holed = g.remove_matches(&[Position::new(0, 1)].into_iter().collect());
        assert!(find_matches(&holed).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let g = grid(&["RRBG", "YPBG", "RBBG", "YPRG"]);
        assert_eq!(find_matches(&g), find_matches(&g));
    }

    proptest! {
        #[test]
        fn prop_matches_agree_with_per_cell_check(
            rows in 1usize..9,
            cols in 1usize..9,
            level in 1u32..40,
            seed in any::<u64>(),
        ) {
            let g = random_grid(rows, cols, level, seed);
            let expected: MatchSet = g
                .positions()
                .filter(|&p| matched_by_local_runs(&g, p))
                .collect();
            prop_assert_eq!(find_matches(&g), expected);
        }

        #[test]
        fn prop_transposed_scan_gives_transposed_matches(
            rows in 1usize..9,
            cols in 1usize..9,
            seed in any::<u64>(),
        ) {
            let g = random_grid(rows, cols, 1, seed);
            let mut factory = TileFactory::new();
            let mut t = Grid::empty(cols, rows);
            for tile in g.tiles() {
                t.place(factory.make(tile.kind, tile.col, tile.row));
            }
            let flipped: MatchSet = find_matches(&t)
                .into_iter()
                .map(|p| Position::new(p.col, p.row))
                .collect();
            prop_assert_eq!(find_matches(&g), flipped);
        }
    }
}
