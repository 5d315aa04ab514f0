use crate::piece::ActivePiece;
use crate::shape::PieceKind;
use crate::{COLS, ROWS};

/// The well. Row 0 is the top (spawn) row; gravity increases the row index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<PieceKind>; COLS]; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[None; COLS]; ROWS],
        }
    }

    /// # Panics
    ///
    /// If `row >= ROWS` or `col >= COLS`.
    pub fn get(&self, row: usize, col: usize) -> Option<PieceKind> {
        self.cells[row][col]
    }

    /// Writes a single cell; meant for building fixtures and puzzle setups.
    ///
    /// # Panics
    ///
    /// If `row >= ROWS` or `col >= COLS`.
    pub fn set(&mut self, row: usize, col: usize, cell: Option<PieceKind>) {
        self.cells[row][col] = cell;
    }

    pub fn rows(&self) -> &[[Option<PieceKind>; COLS]; ROWS] {
        &self.cells
    }

    fn is_occupied(&self, row: i32, col: i32) -> bool {
        if row < 0 || row >= ROWS as i32 || col < 0 || col >= COLS as i32 {
            return true;
        }
        self.cells[row as usize][col as usize].is_some()
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(Option::is_some)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// True when every filled cell of the piece lands inside the grid on an
    /// empty cell.
    pub fn can_place(&self, piece: &ActivePiece) -> bool {
        piece
            .board_cells()
            .all(|(row, col)| !self.is_occupied(row, col))
    }

    /// Returns a copy with the piece's cells tagged by its kind. The piece must
    /// already have passed `can_place`.
    pub fn merge(&self, piece: &ActivePiece) -> Board {
        debug_assert!(self.can_place(piece), "merging an unplaceable piece");
        let mut next = *self;
        for (row, col) in piece.board_cells() {
            if (0..ROWS as i32).contains(&row) && (0..COLS as i32).contains(&col) {
                next.cells[row as usize][col as usize] = Some(piece.kind);
            }
        }
        next
    }

    /// Drops every full row, compacts the rest downward in order and pads the
    /// top with empty rows. Returns the new board and how many rows went.
    pub fn clear_lines(&self) -> (Board, usize) {
        let mut next = Board::new();
        let mut write = ROWS;
        for row in (0..ROWS).rev() {
            if self.is_row_full(row) {
                continue;
            }
            write -= 1;
            next.cells[write] = self.cells[row];
        }
        (next, write)
    }
}
