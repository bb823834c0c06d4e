//! Core domain types for the gomoku board.

use derive_new::new;
use serde::{Deserialize, Serialize};

/// Board side length. The grid is `SIZE` x `SIZE`.
pub const SIZE: usize = 20;

/// Number of contiguous same-mark cells that wins a round.
pub const WIN_LENGTH: usize = 5;

/// A player's mark on the board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum Mark {
    /// Mark X (opens the round).
    X,
    /// Mark O (moves second).
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Empty cell.
    Empty,
    /// Cell occupied by a mark.
    Occupied(Mark),
}

/// Zero-based board coordinates, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Coord {
    /// Row index (0 at the top).
    pub row: usize,
    /// Column index (0 at the left).
    pub col: usize,
}

impl Coord {
    /// Steps by a signed offset, returning `None` when the result leaves
    /// the grid.
    pub fn offset(self, dr: isize, dc: isize) -> Option<Coord> {
        let row = self.row as isize + dr;
        let col = self.col as isize + dc;
        if (0..SIZE as isize).contains(&row) && (0..SIZE as isize).contains(&col) {
            Some(Coord::new(row as usize, col as usize))
        } else {
            None
        }
    }
}

/// The 20x20 gomoku board.
///
/// Serializes as the bare 2D cell array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    /// Cells in row-major order.
    cells: [[Cell; SIZE]; SIZE],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; SIZE]; SIZE],
        }
    }

    /// Gets the cell at the given coordinates. Returns `None` out of bounds.
    pub fn get(&self, at: Coord) -> Option<Cell> {
        self.cells
            .get(at.row)
            .and_then(|row| row.get(at.col))
            .copied()
    }

    /// Sets the cell at the given coordinates.
    pub fn set(&mut self, at: Coord, cell: Cell) -> Result<(), &'static str> {
        if at.row >= SIZE || at.col >= SIZE {
            return Err("Coordinates out of bounds");
        }
        self.cells[at.row][at.col] = cell;
        Ok(())
    }

    /// Checks if the cell at the given coordinates is empty.
    ///
    /// Out-of-bounds coordinates are not empty (nothing can be placed there).
    pub fn is_empty_at(&self, at: Coord) -> bool {
        matches!(self.get(at), Some(Cell::Empty))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
