//! Text selection over the grid
//!
//! A selection is an anchor (where the drag started) and a head (where
//! it currently is). Ordering is decided by linear cell index, row-major,
//! so a backwards drag covers exactly the same cells as a forwards one.
//! Extraction walks the covered cells, shows empty cells as spaces, trims
//! trailing blanks per row and joins rows with newlines.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::grid::Grid;

/// Upper bound on extracted selection text; longer content is truncated
const MAX_TEXT_BYTES: usize = 1 << 20;

/// A position in the grid, 0-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPoint {
    pub row: usize,
    pub col: usize,
}

impl SelectionPoint {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major cell index, the ordering key for selection endpoints
    pub fn linear(&self, cols: usize) -> usize {
        self.row * cols + self.col
    }
}

/// An anchor-and-head selection over grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Fixed endpoint, set when the selection began
    anchor: SelectionPoint,
    /// Moving endpoint, follows the drag
    head: SelectionPoint,
}

impl Selection {
    /// Begin a selection; anchor and head start at the same cell, so a
    /// fresh selection covers exactly one cell
    pub fn new(anchor: SelectionPoint) -> Self {
        Self {
            anchor,
            head: anchor,
        }
    }

    /// Move the head, keeping the anchor
    pub fn drag_to(&mut self, head: SelectionPoint) {
        self.head = head;
    }

    pub fn anchor(&self) -> SelectionPoint {
        self.anchor
    }

    pub fn head(&self) -> SelectionPoint {
        self.head
    }

    /// Endpoints in linear order: the returned pair satisfies
    /// `start.linear(cols) <= end.linear(cols)`
    pub fn bounds(&self, cols: usize) -> (SelectionPoint, SelectionPoint) {
        if self.anchor.linear(cols) <= self.head.linear(cols) {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }

    /// Whether the cell at (row, col) is covered.
    ///
    /// Equivalent to the usual three-case row predicate: the start row is
    /// covered from the start column, the end row up to the end column,
    /// and rows strictly between in full.
    pub fn contains(&self, row: usize, col: usize, cols: usize) -> bool {
        let (start, end) = self.bounds(cols);
        let idx = SelectionPoint::new(row, col).linear(cols);
        idx >= start.linear(cols) && idx <= end.linear(cols)
    }

    /// Extract the covered text from the grid
    pub fn extract(&self, grid: &Grid) -> String {
        let (start, end) = self.bounds(grid.cols());
        let mut text = String::new();
        let mut truncated = false;

        'rows: for row in start.row..=end.row {
            let first = if row == start.row { start.col } else { 0 };
            let last = if row == end.row {
                end.col
            } else {
                grid.last_col()
            };

            let mut line = String::with_capacity(last - first + 1);
            for col in first..=last {
                line.push(grid.cell(row, col).display_char());
            }
            let line = line.trim_end();

            if row != start.row {
                if text.len() + 1 > MAX_TEXT_BYTES {
                    truncated = true;
                    break;
                }
                text.push('\n');
            }
            for ch in line.chars() {
                if text.len() + ch.len_utf8() > MAX_TEXT_BYTES {
                    truncated = true;
                    break 'rows;
                }
                text.push(ch);
            }
        }

        if truncated {
            warn!(limit = MAX_TEXT_BYTES, "selection text truncated");
        }
        text
    }
}
