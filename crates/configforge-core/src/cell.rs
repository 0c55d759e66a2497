//! Positioned cells of a raw table

use serde::{Deserialize, Serialize};

/// A single string cell with its source position
///
/// Row and column are 0-indexed; `Display` renders them the way a
/// spreadsheet user would look them up (1-based row, lettered column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Row in the source file (0-indexed)
    pub row: usize,

    /// Column in the source file (0-indexed)
    pub col: usize,

    /// Raw text
    pub data: String,
}

impl Cell {
    /// Create a new cell
    pub fn new(row: usize, col: usize, data: impl Into<String>) -> Self {
        Self {
            row,
            col,
            data: data.into(),
        }
    }

    /// Whether the cell holds no text
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Derive a cell at the same position with different text
    ///
    /// Used when one source cell is split into several logical cells.
    pub fn with_data(&self, data: impl Into<String>) -> Self {
        Self {
            row: self.row,
            col: self.col,
            data: data.into(),
        }
    }

    /// Spreadsheet-style column letters for this cell
    pub fn col_letters(&self) -> String {
        column_letters(self.col)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row={},col={},data={}", self.row + 1, self.col_letters(), self.data)
    }
}

/// Convert a 0-indexed column into spreadsheet letters (A, B, ..., Z, AA, AB, ...)
pub fn column_letters(col: usize) -> String {
    const N: usize = 26;
    let mut letters = Vec::new();
    let mut v = col + 1;
    while v > 0 {
        let rem = (v - 1) % N;
        letters.push((b'A' + rem as u8) as char);
        v = (v - 1) / N;
    }
    letters.iter().rev().collect()
}
