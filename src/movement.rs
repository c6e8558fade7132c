//! Sliding rules: every cell a block can reach in one move.
//!
//! A block scans outward from its current cell, one step at a time, until it
//! hits another block or the grid edge. Every cell passed on the way is a
//! destination. Horizontal blocks scan left/right, vertical blocks scan
//! up/down, square blocks do both.
//!
//! The target is the only block that may leave the grid, and only through the
//! exit: when it is aligned with the exit and its scan reaches the edge on the
//! exit side, one extra destination one cell past that edge is added.

use serde::Serialize;

use crate::board::{BlockId, Board, BoardState, Shape};
use crate::level::{Cell, Exit, Side};

/// The axis a move slides along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// One atomic relocation of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Move {
    pub block: BlockId,
    pub axis: Axis,
    pub destination: Cell,
}

/// A scan direction: axis plus unit step.
#[derive(Clone, Copy)]
struct Direction {
    axis: Axis,
    dx: i32,
    dy: i32,
    /// Grid edge this direction runs into.
    side: Side,
}

const LEFT: Direction = Direction {
    axis: Axis::Horizontal,
    dx: -1,
    dy: 0,
    side: Side::Left,
};
const RIGHT: Direction = Direction {
    axis: Axis::Horizontal,
    dx: 1,
    dy: 0,
    side: Side::Right,
};
const UP: Direction = Direction {
    axis: Axis::Vertical,
    dx: 0,
    dy: -1,
    side: Side::Top,
};
const DOWN: Direction = Direction {
    axis: Axis::Vertical,
    dx: 0,
    dy: 1,
    side: Side::Bottom,
};

/// All legal moves for `block` in `state`.
///
/// Destinations come in scan order: left, right, up, down, nearest cell first.
/// A fully boxed-in block yields an empty list.
pub fn legal_moves(board: &Board, state: &BoardState, block: BlockId) -> Vec<Move> {
    let mut moves = Vec::new();
    legal_moves_into(board, state, block, &mut moves);
    moves
}

/// Appends the legal moves for `block` to `out`, reusing its allocation.
pub fn legal_moves_into(board: &Board, state: &BoardState, block: BlockId, out: &mut Vec<Move>) {
    let shape = board.shape(block);
    let origin = state.position(block);
    let occupied = board.occupancy(state, Some(block));
    let exit_open = shape.is_target && is_aligned(board.exit(), shape, origin);

    let mut directions: [Option<Direction>; 4] = [None; 4];
    if shape.slides_horizontally() {
        directions[0] = Some(LEFT);
        directions[1] = Some(RIGHT);
    }
    if shape.slides_vertically() {
        directions[2] = Some(UP);
        directions[3] = Some(DOWN);
    }

    for direction in directions.into_iter().flatten() {
        let reached = scan(board, block, shape, origin, occupied, direction, out);

        // the exit extension: only once the scan is flush with the exit edge
        if exit_open
            && board.exit().side == direction.side
            && flush_with_edge(board, shape, reached, direction.side)
        {
            out.push(Move {
                block,
                axis: direction.axis,
                destination: Cell::new(reached.x + direction.dx, reached.y + direction.dy),
            });
        }
    }
}

/// Walks from `origin` in `direction`, pushing every unobstructed in-grid
/// cell. Returns the farthest cell reached (`origin` if none).
fn scan(
    board: &Board,
    block: BlockId,
    shape: Shape,
    origin: Cell,
    occupied: u64,
    direction: Direction,
    out: &mut Vec<Move>,
) -> Cell {
    let mut reached = origin;
    loop {
        let next = Cell::new(reached.x + direction.dx, reached.y + direction.dy);
        if !board.fits(shape, next) || board.footprint(shape, next) & occupied != 0 {
            return reached;
        }
        out.push(Move {
            block,
            axis: direction.axis,
            destination: next,
        });
        reached = next;
    }
}

fn flush_with_edge(board: &Board, shape: Shape, at: Cell, side: Side) -> bool {
    match side {
        Side::Left => at.x == 0,
        Side::Right => at.x + shape.width == board.width(),
        Side::Top => at.y == 0,
        Side::Bottom => at.y + shape.height == board.height(),
    }
}

/// Whether a block's span on the exit's perpendicular axis covers the exit.
pub fn is_aligned(exit: Exit, shape: Shape, at: Cell) -> bool {
    if exit.side.indexes_rows() {
        at.y <= exit.position && exit.position < at.y + shape.height
    } else {
        at.x <= exit.position && exit.position < at.x + shape.width
    }
}

/// Whether a target at `cell` has left the grid through the exit.
pub fn is_win_position(board: &Board, cell: Cell) -> bool {
    let exit = board.exit();
    match exit.side {
        Side::Right => cell.y == exit.position && cell.x >= board.width(),
        Side::Left => cell.y == exit.position && cell.x < 0,
        Side::Bottom => cell.x == exit.position && cell.y >= board.height(),
        Side::Top => cell.x == exit.position && cell.y < 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TARGET;
    use crate::level::{Level, ObstacleSpec};
    use crate::levels;

    fn level(
        width: i32,
        height: i32,
        exit: Exit,
        target: Cell,
        blocks: Vec<ObstacleSpec>,
    ) -> Level {
        Level {
            id: 1,
            name: "Test".to_string(),
            grid_width: width,
            grid_height: height,
            par: 1,
            exit,
            target,
            blocks,
        }
    }

    fn exit(side: Side, position: i32) -> Exit {
        Exit { side, position }
    }

    fn destinations(moves: &[Move]) -> Vec<(i32, i32)> {
        let mut cells: Vec<(i32, i32)> = moves
            .iter()
            .map(|m| (m.destination.x, m.destination.y))
            .collect();
        cells.sort();
        cells
    }

    #[test]
    fn test_horizontal_block_only_slides_horizontally() {
        let board = Board::new(&level(
            5,
            5,
            exit(Side::Right, 2),
            Cell::new(0, 4),
            vec![ObstacleSpec::new(1, 2, 2, 1)],
        ));
        let moves = legal_moves(&board, board.initial_state(), 1);
        assert!(moves.iter().all(|m| m.axis == Axis::Horizontal));
        assert_eq!(destinations(&moves), vec![(0, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn test_vertical_block_only_slides_vertically() {
        let board = Board::new(&level(
            5,
            5,
            exit(Side::Right, 2),
            Cell::new(0, 4),
            vec![ObstacleSpec::new(2, 1, 1, 2)],
        ));
        let moves = legal_moves(&board, board.initial_state(), 1);
        assert!(moves.iter().all(|m| m.axis == Axis::Vertical));
        assert_eq!(destinations(&moves), vec![(2, 0), (2, 2), (2, 3)]);
    }

    #[test]
    fn test_square_block_gets_union_of_both_scans() {
        let board = Board::new(&level(
            4,
            4,
            exit(Side::Right, 0),
            Cell::new(3, 3),
            vec![ObstacleSpec::new(1, 1, 2, 2)],
        ));
        let moves = legal_moves(&board, board.initial_state(), 1);
        let horizontal: Vec<_> = moves.iter().filter(|m| m.axis == Axis::Horizontal).collect();
        let vertical: Vec<_> = moves.iter().filter(|m| m.axis == Axis::Vertical).collect();
        assert_eq!(horizontal.len(), 2);
        assert_eq!(vertical.len(), 2);
        assert_eq!(destinations(&moves), vec![(0, 1), (1, 0), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_scan_stops_at_first_collision() {
        // target at (0,2), vertical 1x2 at (2,1) blocks the row
        let board = Board::new(&levels::builtin()[0]);
        let moves = legal_moves(&board, board.initial_state(), TARGET);
        assert_eq!(destinations(&moves), vec![(0, 0), (0, 1), (0, 3), (0, 4), (1, 2)]);
    }

    #[test]
    fn test_every_cell_along_the_path_is_a_destination() {
        let board = Board::new(&level(
            6,
            4,
            exit(Side::Left, 3),
            Cell::new(0, 0),
            vec![ObstacleSpec::new(0, 2, 2, 1)],
        ));
        let moves = legal_moves(&board, board.initial_state(), 1);
        assert_eq!(destinations(&moves), vec![(1, 2), (2, 2), (3, 2), (4, 2)]);
    }

    #[test]
    fn test_target_gets_exit_extension_when_aligned_and_clear() {
        let board = Board::new(&level(5, 5, exit(Side::Right, 2), Cell::new(1, 2), vec![]));
        let moves = legal_moves(&board, board.initial_state(), TARGET);
        let exits: Vec<_> = moves
            .iter()
            .filter(|m| !board.fits(board.shape(TARGET), m.destination))
            .collect();
        assert_eq!(exits.len(), 1);
        assert_eq!(exits[0].destination, Cell::new(5, 2));
        assert_eq!(exits[0].axis, Axis::Horizontal);
        assert!(is_win_position(&board, exits[0].destination));
    }

    #[test]
    fn test_exit_extension_when_already_flush() {
        let board = Board::new(&level(5, 5, exit(Side::Top, 3), Cell::new(3, 0), vec![]));
        let moves = legal_moves(&board, board.initial_state(), TARGET);
        assert!(moves.iter().any(|m| m.destination == Cell::new(3, -1)));
        assert!(moves.iter().all(|m| m.destination.y >= -1));
    }

    #[test]
    fn test_no_exit_extension_when_path_is_blocked() {
        let board = Board::new(&level(
            5,
            5,
            exit(Side::Right, 2),
            Cell::new(0, 2),
            vec![ObstacleSpec::new(4, 1, 1, 2)],
        ));
        let moves = legal_moves(&board, board.initial_state(), TARGET);
        assert!(moves.iter().all(|m| m.destination.x < 5));
        assert!(moves.iter().any(|m| m.destination == Cell::new(3, 2)));
    }

    #[test]
    fn test_no_exit_extension_when_not_aligned() {
        let board = Board::new(&level(5, 5, exit(Side::Right, 2), Cell::new(0, 1), vec![]));
        let moves = legal_moves(&board, board.initial_state(), TARGET);
        assert!(moves
            .iter()
            .all(|m| board.fits(board.shape(TARGET), m.destination)));
    }

    #[test]
    fn test_exit_extension_on_every_side() {
        for (side, win) in [
            (Side::Right, Cell::new(5, 2)),
            (Side::Left, Cell::new(-1, 2)),
            (Side::Top, Cell::new(2, -1)),
            (Side::Bottom, Cell::new(2, 5)),
        ] {
            let board = Board::new(&level(5, 5, exit(side, 2), Cell::new(2, 2), vec![]));
            let moves = legal_moves(&board, board.initial_state(), TARGET);
            let outside: Vec<_> = moves
                .iter()
                .map(|m| m.destination)
                .filter(|&c| !board.fits(board.shape(TARGET), c))
                .collect();
            assert_eq!(outside, vec![win], "exit on the {side} edge");
            assert!(is_win_position(&board, win));
        }
    }

    #[test]
    fn test_non_target_never_leaves_the_grid() {
        // horizontal block flush against an open right exit on its own row
        let board = Board::new(&level(
            5,
            5,
            exit(Side::Right, 2),
            Cell::new(0, 0),
            vec![ObstacleSpec::new(2, 2, 2, 1), ObstacleSpec::new(1, 3, 1, 1)],
        ));
        for block in 1..board.block_count() {
            let shape = board.shape(block);
            for m in legal_moves(&board, board.initial_state(), block) {
                assert!(board.fits(shape, m.destination), "{m:?} leaves the grid");
            }
        }
        let moves = legal_moves(&board, board.initial_state(), 1);
        assert_eq!(destinations(&moves), vec![(0, 2), (1, 2), (3, 2)]);
    }

    #[test]
    fn test_boxed_in_block_has_no_moves() {
        let board = Board::new(&level(
            3,
            3,
            exit(Side::Right, 1),
            Cell::new(0, 1),
            vec![
                ObstacleSpec::new(0, 0, 3, 1),
                ObstacleSpec::new(0, 2, 3, 1),
                ObstacleSpec::new(1, 1, 2, 1),
            ],
        ));
        assert!(legal_moves(&board, board.initial_state(), TARGET).is_empty());
        assert!(legal_moves(&board, board.initial_state(), 3).is_empty());
    }

    #[test]
    fn test_win_position_requires_exit_row() {
        let board = Board::new(&level(5, 5, exit(Side::Right, 2), Cell::new(0, 2), vec![]));
        assert!(is_win_position(&board, Cell::new(5, 2)));
        assert!(!is_win_position(&board, Cell::new(5, 1)));
        assert!(!is_win_position(&board, Cell::new(4, 2)));
    }
}
