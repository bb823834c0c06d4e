//! Gomoku (five-in-a-row) on a 20x20 grid.
//!
//! Pure board types and win detection. Everything stateful about a match
//! lives in the room layer; this module knows nothing about rooms, turns,
//! or players beyond the marks on the grid.

pub mod rules;
mod types;

pub use rules::win::winning_line;
pub use types::{Board, Cell, Coord, Mark, SIZE, WIN_LENGTH};
