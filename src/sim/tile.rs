//! Tiles, tile kinds and grid positions
//!
//! A tile carries a stable id so a renderer can follow it through swaps and
//! falls. The engine itself only cares about its kind and coordinates.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tile kinds, in palette order. Lower levels draw from a prefix of this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl TileKind {
    /// Full palette in draw order
    pub const ALL: [TileKind; PALETTE_SIZE] = [
        TileKind::Red,
        TileKind::Blue,
        TileKind::Green,
        TileKind::Yellow,
        TileKind::Purple,
        TileKind::Orange,
    ];

    /// Palette available at a level: the first `min(4 + level / 10, 6)` kinds
    pub fn palette_for_level(level: u32) -> &'static [TileKind] {
        let width = BASE_PALETTE_WIDTH + (level / LEVELS_PER_EXTRA_KIND) as usize;
        &Self::ALL[..width.min(PALETTE_SIZE)]
    }

    /// Display color as 0xRRGGBB. Presentation lookup only.
    pub fn display_color(self) -> u32 {
        match self {
            TileKind::Red => 0xFF4D4D,
            TileKind::Blue => 0x4D8BFF,
            TileKind::Green => 0x4DD96B,
            TileKind::Yellow => 0xFFD84D,
            TileKind::Purple => 0xB04DFF,
            TileKind::Orange => 0xFF9A3D,
        }
    }

    /// Single-letter code used by text fixtures and the headless runner
    pub fn symbol(self) -> char {
        match self {
            TileKind::Red => 'R',
            TileKind::Blue => 'B',
            TileKind::Green => 'G',
            TileKind::Yellow => 'Y',
            TileKind::Purple => 'P',
            TileKind::Orange => 'O',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.symbol() == c.to_ascii_uppercase())
    }

    /// Draw a kind uniformly from the level's palette
    pub fn random<R: Rng>(rng: &mut R, level: u32) -> Self {
        let palette = Self::palette_for_level(level);
        palette[rng.random_range(0..palette.len())]
    }
}

/// A (row, col) cell coordinate. Row 0 is the top of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbor to the right, if it exists on a board with `cols` columns
    pub fn right(self, cols: usize) -> Option<Position> {
        (self.col + 1 < cols).then(|| Position::new(self.row, self.col + 1))
    }

    /// Neighbor below, if it exists on a board with `rows` rows
    pub fn below(self, rows: usize) -> Option<Position> {
        (self.row + 1 < rows).then(|| Position::new(self.row + 1, self.col))
    }
}

/// True iff the positions differ by exactly one step along exactly one axis
pub fn are_adjacent(a: Position, b: Position) -> bool {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col) == 1
}

/// A single playing piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: u32,
    pub kind: TileKind,
    pub row: usize,
    pub col: usize,
    /// Pending removal (set on the "breaking" snapshot)
    #[serde(default)]
    pub matched: bool,
    /// Reserved for renderers; the engine never sets it
    #[serde(default)]
    pub falling: bool,
}

impl Tile {
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// Creates tiles with session-unique ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileFactory {
    next_id: u32,
}

impl Default for TileFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TileFactory {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Id the next tile will receive
    pub fn peek_id(&self) -> u32 {
        self.next_id
    }

    /// Create a tile of a known kind at (row, col)
    pub fn make(&mut self, kind: TileKind, row: usize, col: usize) -> Tile {
        let id = self.next_id;
        self.next_id += 1;
        Tile {
            id,
            kind,
            row,
            col,
            matched: false,
            falling: false,
        }
    }

    /// Create a randomly typed tile from the level-scaled palette
    pub fn create_tile<R: Rng>(
        &mut self,
        rng: &mut R,
        row: usize,
        col: usize,
        level: u32,
    ) -> Tile {
        let kind = TileKind::random(rng, level);
        self.make(kind, row, col)
    }
}
