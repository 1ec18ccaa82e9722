//! Deterministic state snapshots
//!
//! Snapshots capture the observable terminal state in a serializable
//! form for testing and the headless runner. The same byte stream fed in
//! the same chunks or all at once must produce identical snapshots.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Color};
use super::cursor::Cursor;
use super::state::TerminalState;

/// A complete snapshot of the observable terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub rows: usize,
    pub cols: usize,
    pub cursor: CursorSnapshot,
    /// Grid content, row-major
    pub grid: Vec<Vec<CellSnapshot>>,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// The scalar, absent for empty cells
    pub ch: Option<char>,
    pub fg: Color,
    pub bg: Color,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Snapshot of the cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub row: usize,
    pub col: usize,
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            ch: cell.ch,
            fg: cell.style.fg,
            bg: cell.style.bg,
            bold: cell.style.bold,
        }
    }
}

impl From<&Cursor> for CursorSnapshot {
    fn from(cursor: &Cursor) -> Self {
        CursorSnapshot {
            row: cursor.row,
            col: cursor.col,
        }
    }
}

impl Snapshot {
    /// Capture the current state
    pub fn from_state(state: &TerminalState) -> Self {
        let grid = state
            .grid()
            .iter_lines()
            .map(|line| line.cells().iter().map(CellSnapshot::from).collect())
            .collect();

        Snapshot {
            rows: state.rows(),
            cols: state.cols(),
            cursor: CursorSnapshot::from(state.cursor()),
            grid,
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellSnapshot> {
        self.grid.get(row).and_then(|cells| cells.get(col))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text rendering: one line per row, trailing blanks trimmed,
    /// trailing empty rows collapsed
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for row in &self.grid {
            for cell in row {
                result.push(cell.ch.unwrap_or(' '));
            }
            while result.ends_with(' ') {
                result.pop();
            }
            result.push('\n');
        }

        while result.ends_with("\n\n") {
            result.pop();
        }

        result
    }

    /// Compare grid content and dimensions, ignoring the cursor
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.grid == other.grid
    }
}
