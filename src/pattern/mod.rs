pub mod cell;
pub mod codec;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PatternError, Result};

pub use cell::{CELL_COUNT, Cell, GRID_SIZE, SelectionLookup};

/// Ordered, repeat-free sequence of cells traced by one gesture.
///
/// Serializes as its [`codec`] string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    cells: Vec<Cell>,
}

impl Pattern {
    pub fn new() -> Self {
        Self {
            cells: Vec::with_capacity(CELL_COUNT),
        }
    }

    /// Builds a pattern from `cells`, dropping any later repeat of a cell.
    pub fn from_cells(cells: &[Cell]) -> Self {
        let mut pattern = Self::new();
        for &cell in cells {
            pattern.push(cell);
        }
        pattern
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn last(&self) -> Option<Cell> {
        self.cells.last().copied()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Appends `cell`; returns false and leaves the pattern alone if the cell
    /// is already present.
    pub fn push(&mut self, cell: Cell) -> bool {
        if self.contains(cell) {
            return false;
        }
        self.cells.push(cell);
        true
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn lookup(&self) -> SelectionLookup {
        SelectionLookup::from_cells(&self.cells)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&codec::encode(&self.cells))
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self> {
        codec::decode(s)
    }
}

impl TryFrom<String> for Pattern {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self> {
        codec::decode(&value)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.to_string()
    }
}

/// How the current pattern should be presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// The pattern is being drawn, or was accepted.
    #[default]
    Correct,
    /// The pattern was rejected by the caller.
    Wrong,
    /// The pattern replays itself in a loop.
    Animate,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [DisplayMode::Correct, DisplayMode::Wrong, DisplayMode::Animate];

    pub fn ordinal(self) -> i32 {
        match self {
            DisplayMode::Correct => 0,
            DisplayMode::Wrong => 1,
            DisplayMode::Animate => 2,
        }
    }

    pub fn from_ordinal(ordinal: i32) -> Result<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(PatternError::UnknownDisplayMode(ordinal))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Correct => "correct",
            DisplayMode::Wrong => "wrong",
            DisplayMode::Animate => "animate",
        }
    }
}
