//! Board grid and its pure transforms
//!
//! Every transform returns a new `Grid`; the input is never touched. A tile's
//! `row`/`col` is rewritten in the same write that moves it, so coordinates
//! and storage cannot drift apart.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::matches::MatchSet;
use super::tile::{Position, Tile, TileFactory, TileKind};

/// A rows x cols board of optional tiles, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Tile>>,
}

impl Grid {
    /// An all-empty grid
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Build a grid from single-letter rows such as `["RRBG", "YPBG"]`.
    /// Returns None for ragged rows or unknown letters.
    pub fn from_symbols(rows: &[&str], factory: &mut TileFactory) -> Option<Self> {
        let cols = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut grid = Grid::empty(rows.len(), cols);
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != cols {
                return None;
            }
            for (col, c) in line.chars().enumerate() {
                let kind = TileKind::from_symbol(c)?;
                grid.place(factory.make(kind, row, col));
            }
        }
        Some(grid)
    }

    /// Render as single-letter rows, `.` for empty cells
    pub fn to_symbols(&self) -> Vec<String> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| self.kind_at(row, col).map_or('.', TileKind::symbol))
                    .collect::<String>()
            })
            .collect()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub fn get(&self, pos: Position) -> Option<&Tile> {
        if !self.contains(pos) {
            return None;
        }
        self.cells[self.idx(pos.row, pos.col)].as_ref()
    }

    pub fn kind_at(&self, row: usize, col: usize) -> Option<TileKind> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[self.idx(row, col)].map(|t| t.kind)
    }

    /// Write a tile into the cell named by its own coordinates
    pub(crate) fn place(&mut self, tile: Tile) {
        let i = self.idx(tile.row, tile.col);
        self.cells[i] = Some(tile);
    }

    /// Move a tile into `pos`, rewriting its coordinates
    fn place_at(&mut self, mut tile: Tile, pos: Position) {
        tile.row = pos.row;
        tile.col = pos.col;
        self.place(tile);
    }

    fn take(&mut self, pos: Position) -> Option<Tile> {
        let i = self.idx(pos.row, pos.col);
        self.cells[i].take()
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    /// Occupied tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    pub fn occupied_count(&self) -> usize {
        self.tiles().count()
    }

    /// No occupied cells at all
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Every cell occupied
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Kinds in row-major order, ignoring ids and flags
    pub fn kinds(&self) -> Vec<Option<TileKind>> {
        self.cells.iter().map(|c| c.map(|t| t.kind)).collect()
    }

    /// Exchange the tiles at two positions. Out-of-bounds requests return an
    /// unchanged copy; adjacency is the caller's concern.
    pub fn swap_candies(&self, a: Position, b: Position) -> Grid {
        let mut next = self.clone();
        if a == b || !self.contains(a) || !self.contains(b) {
            return next;
        }
        let ta = next.take(a);
        let tb = next.take(b);
        if let Some(t) = ta {
            next.place_at(t, b);
        }
        if let Some(t) = tb {
            next.place_at(t, a);
        }
        next
    }

    /// Copy with every tile in `matches` flagged as matched
    pub fn mark_matches(&self, matches: &MatchSet) -> Grid {
        let mut next = self.clone();
        for &pos in matches {
            if next.contains(pos) {
                let i = next.idx(pos.row, pos.col);
                if let Some(tile) = next.cells[i].as_mut() {
                    tile.matched = true;
                }
            }
        }
        next
    }

    /// Copy with every cell in `matches` emptied
    pub fn remove_matches(&self, matches: &MatchSet) -> Grid {
        let mut next = self.clone();
        for &pos in matches {
            if next.contains(pos) {
                next.take(pos);
            }
        }
        next
    }

    /// Compact each column downward, keeping the survivors' vertical order,
    /// then fill the vacated top cells with fresh tiles. No match avoidance:
    /// refills may form new runs.
    pub fn apply_gravity<R: Rng>(
        &self,
        factory: &mut TileFactory,
        rng: &mut R,
        level: u32,
    ) -> Grid {
        let mut next = Grid::empty(self.rows, self.cols);
        for col in 0..self.cols {
            let mut write_row = self.rows;
            for row in (0..self.rows).rev() {
                if let Some(tile) = self.cells[self.idx(row, col)] {
                    write_row -= 1;
                    next.place_at(tile, Position::new(write_row, col));
                }
            }
            for row in 0..write_row {
                next.place(factory.create_tile(rng, row, col, level));
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::matches::find_matches;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn random_grid(rows: usize, cols: usize, seed: u64) -> (Grid, TileFactory, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut factory = TileFactory::new();
        let mut g = Grid::empty(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                g.place(factory.create_tile(&mut rng, row, col, 1));
            }
        }
        (g, factory, rng)
    }

    fn fixture(rows: &[&str]) -> (Grid, TileFactory) {
        let mut factory = TileFactory::new();
        let grid = Grid::from_symbols(rows, &mut factory).expect("valid fixture");
        (grid, factory)
    }

    fn assert_coords_consistent(grid: &Grid) {
        for pos in grid.positions() {
            if let Some(tile) = grid.get(pos) {
                assert_eq!(tile.position(), pos);
            }
        }
    }

    #[test]
    fn test_from_symbols_rejects_bad_input() {
        let mut factory = TileFactory::new();
        assert!(Grid::from_symbols(&["RRB", "RB"], &mut factory).is_none());
        assert!(Grid::from_symbols(&["RXB"], &mut factory).is_none());
    }

    #[test]
    fn test_swap_updates_coordinates() {
        let (grid, _) = fixture(&["RB", "GY"]);
        let swapped = grid.swap_candies(Position::new(0, 0), Position::new(0, 1));
        assert_eq!(swapped.to_symbols(), vec!["BR", "GY"]);
        assert_coords_consistent(&swapped);
        // Input untouched
        assert_eq!(grid.to_symbols(), vec!["RB", "GY"]);
        // Ids travel with tiles
        let red = grid.get(Position::new(0, 0)).unwrap().id;
        assert_eq!(swapped.get(Position::new(0, 1)).unwrap().id, red);
    }

    #[test]
    fn test_swap_is_its_own_inverse() {
        let (grid, _) = fixture(&["RRBG", "YPBG", "RBBG", "YPRG"]);
        let a = Position::new(1, 1);
        let b = Position::new(2, 1);
        let back = grid.swap_candies(a, b).swap_candies(a, b);
        assert_eq!(back, grid);
    }

    #[test]
    fn test_swap_out_of_bounds_is_noop() {
        let (grid, _) = fixture(&["RB", "GY"]);
        let same = grid.swap_candies(Position::new(0, 0), Position::new(0, 5));
        assert_eq!(same, grid);
    }

    #[test]
    fn test_mark_and_remove() {
        let (grid, _) = fixture(&["RRR", "GBY"]);
        let matches: MatchSet = (0..3).map(|c| Position::new(0, c)).collect();
        let marked = grid.mark_matches(&matches);
        assert!(marked.tiles().filter(|t| t.row == 0).all(|t| t.matched));
        assert!(marked.tiles().filter(|t| t.row == 1).all(|t| !t.matched));

        let removed = grid.remove_matches(&matches);
        assert_eq!(removed.to_symbols(), vec!["...", "GBY"]);
        assert_eq!(removed.occupied_count(), 3);
    }

    #[test]
    fn test_gravity_compacts_and_refills() {
        let (grid, mut factory) = fixture(&["RG", "BY", "GP"]);
        let hole: MatchSet = [Position::new(1, 0), Position::new(2, 1)].into_iter().collect();
        let removed = grid.remove_matches(&hole);
        assert_eq!(removed.to_symbols(), vec!["RG", ".Y", "G."]);

        let first_new_id = factory.peek_id();
        let mut rng = Pcg32::seed_from_u64(3);
        let settled = removed.apply_gravity(&mut factory, &mut rng, 1);

        assert!(settled.is_full());
        assert_coords_consistent(&settled);
        // Column 0: R falls onto G, new tile on top
        assert_eq!(settled.kind_at(1, 0), Some(TileKind::Red));
        assert_eq!(settled.kind_at(2, 0), Some(TileKind::Green));
        assert!(settled.get(Position::new(0, 0)).unwrap().id >= first_new_id);
        // Column 1: G over Y keep their order
        assert_eq!(settled.kind_at(1, 1), Some(TileKind::Green));
        assert_eq!(settled.kind_at(2, 1), Some(TileKind::Yellow));
        assert!(settled.get(Position::new(0, 1)).unwrap().id >= first_new_id);
    }

    #[test]
    fn test_gravity_on_full_grid_is_identity() {
        let (grid, mut factory) = fixture(&["RG", "BY"]);
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(grid.apply_gravity(&mut factory, &mut rng, 1), grid);
    }

    #[test]
    fn test_empty_and_full() {
        let grid = Grid::empty(3, 3);
        assert!(grid.is_empty());
        assert!(!grid.is_full());
        assert_eq!(grid.to_symbols(), vec!["...", "...", "..."]);
    }

    proptest! {
        #[test]
        fn prop_swap_twice_restores_layout(
            rows in 1usize..8,
            cols in 1usize..8,
            seed in any::<u64>(),
            r in 0usize..8,
            c in 0usize..8,
            down in any::<bool>(),
        ) {
            let (g, _, _) = random_grid(rows, cols, seed);
            let a = Position::new(r % rows, c % cols);
            let b = if down {
                Position::new(a.row + 1, a.col)
            } else {
                Position::new(a.row, a.col + 1)
            };
            let once = g.swap_candies(a, b);
            prop_assert_eq!(once.swap_candies(a, b).kinds(), g.kinds());
        }

        #[test]
        fn prop_gravity_keeps_survivor_order_and_fills(
            rows in 1usize..9,
            cols in 1usize..9,
            seed in any::<u64>(),
            holes in proptest::collection::vec((0usize..9, 0usize..9), 0..20),
        ) {
            let (g, mut factory, mut rng) = random_grid(rows, cols, seed);
            let removed_set: MatchSet = holes
                .into_iter()
                .map(|(r, c)| Position::new(r % rows, c % cols))
                .collect();
            let removed = g.remove_matches(&removed_set);
            let first_new_id = factory.peek_id();
            let settled = removed.apply_gravity(&mut factory, &mut rng, 1);

            prop_assert!(settled.is_full());
            for col in 0..cols {
                let survivors: Vec<u32> = (0..rows)
                    .filter_map(|row| removed.get(Position::new(row, col)).map(|t| t.id))
                    .collect();
                let column: Vec<&Tile> = (0..rows)
                    .filter_map(|row| settled.get(Position::new(row, col)))
                    .collect();
                let fresh = rows - survivors.len();
                // Fresh tiles on top, survivors below in their original order
                prop_assert!(column[..fresh].iter().all(|t| t.id >= first_new_id));
                let kept: Vec<u32> = column[fresh..].iter().map(|t| t.id).collect();
                prop_assert_eq!(kept, survivors);
                for (row, tile) in column.iter().enumerate() {
                    prop_assert_eq!(tile.position(), Position::new(row, col));
                }
            }
        }

        #[test]
        fn prop_remove_then_gravity_leaves_no_holes(
            rows in 3usize..9,
            cols in 3usize..9,
            seed in any::<u64>(),
        ) {
            let (g, mut factory, mut rng) = random_grid(rows, cols, seed);
            let matches = find_matches(&g);
            let settled = g.remove_matches(&matches).apply_gravity(&mut factory, &mut rng, 1);
            prop_assert!(settled.is_full());
            prop_assert_eq!(settled.occupied_count(), rows * cols);
        }
    }
}
