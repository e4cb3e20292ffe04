use std::fmt;

use crate::error::{PatternError, Result};

pub const GRID_SIZE: usize = 3;
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// One of the nine dots, addressed by row and column in `0..3`.
///
/// Cells are plain values: two cells with the same coordinates are the same
/// cell. The nine valid values live in [`Cell::ALL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    row: u8,
    column: u8,
}

const fn cell(row: u8, column: u8) -> Cell {
    Cell { row, column }
}

impl Cell {
    /// Row-major table of every cell on the grid.
    pub const ALL: [Cell; CELL_COUNT] = [
        cell(0, 0),
        cell(0, 1),
        cell(0, 2),
        cell(1, 0),
        cell(1, 1),
        cell(1, 2),
        cell(2, 0),
        cell(2, 1),
        cell(2, 2),
    ];

    pub fn of(row: i32, column: i32) -> Result<Cell> {
        let in_range = |v: i32| (0..GRID_SIZE as i32).contains(&v);
        if !in_range(row) || !in_range(column) {
            return Err(PatternError::InvalidCoordinate { row, column });
        }
        Ok(Self::ALL[row as usize * GRID_SIZE + column as usize])
    }

    pub fn from_index(index: usize) -> Option<Cell> {
        Self::ALL.get(index).copied()
    }

    pub fn row(self) -> usize {
        self.row as usize
    }

    pub fn column(self) -> usize {
        self.column as usize
    }

    /// Row-major position, `row * 3 + column`.
    pub fn index(self) -> usize {
        self.row() * GRID_SIZE + self.column()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// 3x3 flags recording which cells belong to the current pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionLookup {
    used: [[bool; GRID_SIZE]; GRID_SIZE],
}

impl SelectionLookup {
    pub fn from_cells(cells: &[Cell]) -> Self {
        let mut lookup = Self::default();
        for &cell in cells {
            lookup.mark(cell);
        }
        lookup
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.used[cell.row()][cell.column()]
    }

    pub fn mark(&mut self, cell: Cell) {
        self.used[cell.row()][cell.column()] = true;
    }

    pub fn clear(&mut self) {
        self.used = [[false; GRID_SIZE]; GRID_SIZE];
    }

    pub fn count(&self) -> usize {
        self.used.iter().flatten().filter(|&&used| used).count()
    }
}
