//! Win detection for gomoku.

use super::super::types::{Board, Cell, Coord, Mark, WIN_LENGTH};
use tracing::instrument;

/// The four axis directions a line can run along: horizontal, vertical,
/// and both diagonals. The negative direction of each is walked separately.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Finds the winning line completed by the mark just played at `at`.
///
/// Walks outward from the played cell along each of the four directions,
/// building the maximal contiguous run of `mark` through it. The first run
/// of length >= [`WIN_LENGTH`] is returned, ordered from the negative end
/// of the direction to the positive end.
///
/// Returns `None` if the cell at `at` does not hold `mark` or no direction
/// yields a long enough run. Pure function of its inputs; safe to call
/// repeatedly.
#[instrument(skip(board))]
pub fn winning_line(board: &Board, at: Coord, mark: Mark) -> Option<Vec<Coord>> {
    if board.get(at) != Some(Cell::Occupied(mark)) {
        return None;
    }

    for (dr, dc) in DIRECTIONS {
        let mut line = run(board, at, mark, -dr, -dc);
        line.reverse();
        line.push(at);
        line.extend(run(board, at, mark, dr, dc));

        if line.len() >= WIN_LENGTH {
            return Some(line);
        }
    }

    None
}

/// Collects the contiguous run of `mark` starting one step from `from` in
/// the given direction, nearest cell first. Stops at the grid edge or the
/// first non-matching cell.
fn run(board: &Board, from: Coord, mark: Mark, dr: isize, dc: isize) -> Vec<Coord> {
    let mut cells = Vec::new();
    let mut cursor = from.offset(dr, dc);

    while let Some(at) = cursor {
        if board.get(at) != Some(Cell::Occupied(mark)) {
            break;
        }
        cells.push(at);
        cursor = at.offset(dr, dc);
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::gomoku::types::SIZE;

    fn place(board: &mut Board, coords: &[(usize, usize)], mark: Mark) {
        for &(row, col) in coords {
            board
                .set(Coord::new(row, col), Cell::Occupied(mark))
                .unwrap();
        }
    }

    #[test]
    fn test_no_line_on_empty_board() {
        let board = Board::new();
        assert_eq!(winning_line(&board, Coord::new(0, 0), Mark::X), None);
    }

    #[test]
    fn test_pivot_mismatch_returns_none() {
        let mut board = Board::new();
        place(&mut board, &[(3, 3)], Mark::O);
        assert_eq!(winning_line(&board, Coord::new(3, 3), Mark::X), None);
    }

    #[test]
    fn test_horizontal_line_at_row_edge() {
        let mut board = Board::new();
        place(&mut board, &[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)], Mark::X);

        let line = winning_line(&board, Coord::new(0, 4), Mark::X).unwrap();
        let expected: Vec<Coord> = (0..5).map(|c| Coord::new(0, c)).collect();
        assert_eq!(line, expected);
    }

    #[test]
    fn test_vertical_line_through_middle_pivot() {
        let mut board = Board::new();
        place(&mut board, &[(5, 7), (6, 7), (7, 7), (8, 7), (9, 7)], Mark::O);

        // The pivot sits in the middle of the run; the line still comes back
        // ordered from the top end down.
        let line = winning_line(&board, Coord::new(7, 7), Mark::O).unwrap();
        let expected: Vec<Coord> = (5..10).map(|r| Coord::new(r, 7)).collect();
        assert_eq!(line, expected);
    }

    #[test]
    fn test_diagonal_line() {
        let mut board = Board::new();
        place(
            &mut board,
            &[(2, 2), (3, 3), (4, 4), (5, 5), (6, 6)],
            Mark::X,
        );

        let line = winning_line(&board, Coord::new(4, 4), Mark::X).unwrap();
        let expected: Vec<Coord> = (2..7).map(|i| Coord::new(i, i)).collect();
        assert_eq!(line, expected);
    }

    #[test]
    fn test_anti_diagonal_line() {
        let mut board = Board::new();
        place(
            &mut board,
            &[(4, 10), (5, 9), (6, 8), (7, 7), (8, 6)],
            Mark::O,
        );

        let line = winning_line(&board, Coord::new(6, 8), Mark::O).unwrap();
        let expected: Vec<Coord> =
            vec![(4, 10), (5, 9), (6, 8), (7, 7), (8, 6)]
                .into_iter()
                .map(|(r, c)| Coord::new(r, c))
                .collect();
        assert_eq!(line, expected);
    }

    #[test]
    fn test_four_in_a_row_is_not_enough() {
        let mut board = Board::new();
        place(&mut board, &[(10, 0), (10, 1), (10, 2), (10, 3)], Mark::X);
        assert_eq!(winning_line(&board, Coord::new(10, 3), Mark::X), None);
    }

    #[test]
    fn test_gap_breaks_the_run() {
        let mut board = Board::new();
        // Five marks in the row, but interrupted by the opponent.
        place(&mut board, &[(0, 0), (0, 1), (0, 3), (0, 4), (0, 5)], Mark::X);
        place(&mut board, &[(0, 2)], Mark::O);
        assert_eq!(winning_line(&board, Coord::new(0, 4), Mark::X), None);
    }

    #[test]
    fn test_overline_returns_full_maximal_run() {
        let mut board = Board::new();
        place(
            &mut board,
            &[(12, 3), (12, 4), (12, 5), (12, 6), (12, 7), (12, 8)],
            Mark::O,
        );

        let line = winning_line(&board, Coord::new(12, 5), Mark::O).unwrap();
        assert_eq!(line.len(), 6);
        assert_eq!(line.first(), Some(&Coord::new(12, 3)));
        assert_eq!(line.last(), Some(&Coord::new(12, 8)));
    }

    #[test]
    fn test_line_maximality() {
        let mut board = Board::new();
        place(&mut board, &[(9, 4), (9, 5), (9, 6), (9, 7), (9, 8)], Mark::X);

        let line = winning_line(&board, Coord::new(9, 6), Mark::X).unwrap();
        // One step past either end of the returned line must not hold the mark.
        let before = line.first().unwrap().offset(0, -1).unwrap();
        let after = line.last().unwrap().offset(0, 1).unwrap();
        assert_ne!(board.get(before), Some(Cell::Occupied(Mark::X)));
        assert_ne!(board.get(after), Some(Cell::Occupied(Mark::X)));
    }

    #[test]
    fn test_out_of_bounds_pivot_is_safe() {
        let board = Board::new();
        assert_eq!(
            winning_line(&board, Coord::new(SIZE, SIZE), Mark::X),
            None
        );
    }

    #[test]
    fn test_idempotent_on_unchanged_board() {
        let mut board = Board::new();
        place(&mut board, &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)], Mark::X);

        let first = winning_line(&board, Coord::new(3, 3), Mark::X);
        let second = winning_line(&board, Coord::new(3, 3), Mark::X);
        assert_eq!(first, second);
        assert!(first.is_some());
    }
}
