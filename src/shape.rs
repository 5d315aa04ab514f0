use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Largest side of any shape matrix, in any rotation.
pub const MAX_SHAPE_SIDE: usize = 4;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    pub fn color_id(self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }

    pub fn letter(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Canonical spawn orientation.
    pub fn shape(self) -> Shape {
        let rows: &[&[u8]] = match self {
            PieceKind::I => &[&[1, 1, 1, 1], &[0, 0, 0, 0]],
            PieceKind::O => &[&[1, 1], &[1, 1]],
            PieceKind::T => &[&[1, 1, 1], &[0, 1, 0]],
            PieceKind::S => &[&[0, 1, 1], &[1, 1, 0]],
            PieceKind::Z => &[&[1, 1, 0], &[0, 1, 1]],
            PieceKind::J => &[&[1, 0, 0], &[1, 1, 1]],
            PieceKind::L => &[&[0, 0, 1], &[1, 1, 1]],
        };
        Shape::from_rows(rows)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for PieceKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I" => Ok(PieceKind::I),
            "O" => Ok(PieceKind::O),
            "T" => Ok(PieceKind::T),
            "S" => Ok(PieceKind::S),
            "Z" => Ok(PieceKind::Z),
            "J" => Ok(PieceKind::J),
            "L" => Ok(PieceKind::L),
            _ => Err(ParseError::new("piece kind", s)),
        }
    }
}

/// A rectangular 0/1 cell matrix, stored row-major in a fixed 4x4 buffer.
/// Cells outside `height × width` are always empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    width: usize,
    height: usize,
    grid: [[bool; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE],
}

impl Shape {
    fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        debug_assert!(height <= MAX_SHAPE_SIDE && width <= MAX_SHAPE_SIDE);
        let mut grid = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (r, row) in rows.iter().enumerate() {
            debug_assert_eq!(row.len(), width, "shape rows must be rectangular");
            for (c, &v) in row.iter().enumerate() {
                grid[r][c] = v != 0;
            }
        }
        Self {
            width,
            height,
            grid,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.grid[row][col]
    }

    /// Offsets `(row, col)` of the occupied cells, top-left origin.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height).flat_map(move |r| {
            (0..self.width)
                .filter(move |&c| self.grid[r][c])
                .map(move |c| (r as i32, c as i32))
        })
    }

    /// Clockwise quarter turn: transpose, then reverse each new row.
    pub fn rotate_cw(&self) -> Shape {
        let mut grid = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for c in 0..self.width {
            for k in 0..self.height {
                grid[c][k] = self.grid[self.height - 1 - k][c];
            }
        }
        Shape {
            width: self.height,
            height: self.width,
            grid,
        }
    }
}
