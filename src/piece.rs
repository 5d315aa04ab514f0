use serde::Serialize;

use crate::board::Board;
use crate::shape::{PieceKind, Shape};

pub const SPAWN_ROW: i32 = 0;
pub const SPAWN_COL: i32 = 3;

/// The falling piece: a kind, its current (possibly rotated) shape and the
/// board position of the shape's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub row: i32,
    pub col: i32,
}

impl ActivePiece {
    pub fn spawn(kind: PieceKind) -> Self {
        Self::at(kind, SPAWN_ROW, SPAWN_COL)
    }

    pub fn at(kind: PieceKind, row: i32, col: i32) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            row,
            col,
        }
    }

    /// Board-absolute `(row, col)` of every filled cell. May lie off the board.
    pub fn board_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .cells()
            .map(move |(r, c)| (self.row + r, self.col + c))
    }

    /// The piece translated by the delta if that spot is free, `None` otherwise.
    /// A rejected downward step is the caller's lock signal.
    pub fn attempt_move(&self, board: &Board, d_row: i32, d_col: i32) -> Option<ActivePiece> {
        let candidate = ActivePiece {
            row: self.row + d_row,
            col: self.col + d_col,
            ..*self
        };
        board.can_place(&candidate).then_some(candidate)
    }

    /// Clockwise rotation tried at the current anchor only; no kicks.
    pub fn attempt_rotate(&self, board: &Board) -> Option<ActivePiece> {
        let candidate = ActivePiece {
            shape: self.shape.rotate_cw(),
            ..*self
        };
        board.can_place(&candidate).then_some(candidate)
    }

    /// Lowest reachable position straight down. Also the ghost position.
    pub fn hard_drop(&self, board: &Board) -> ActivePiece {
        let mut landing = *self;
        while let Some(next) = landing.attempt_move(board, 1, 0) {
            landing = next;
        }
        landing
    }
}

/// Serializable cell coordinate for hosts that draw pieces themselves.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub struct Point {
    pub row: i32,
    pub col: i32,
}

impl From<(i32, i32)> for Point {
    fn from((row, col): (i32, i32)) -> Self {
        Self { row, col }
    }
}
