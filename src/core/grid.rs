//! The fixed-size character grid
//!
//! Row-major storage of cells with clamped access: every coordinate is
//! forced into range before indexing, so out-of-range requests hit the
//! nearest edge cell instead of panicking. Erase helpers treat
//! out-of-range spans as empty ranges.

use super::cell::Cell;

/// One row of cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    cells: Vec<Cell>,
}

impl Line {
    fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::default(); cols],
        }
    }

    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.erase();
        }
    }

    /// Erase columns `start..end`, clamped to the line width. An empty or
    /// fully out-of-range span does nothing.
    fn clear_cols(&mut self, start: usize, end: usize) {
        let end = end.min(self.cells.len());
        if start >= end {
            return;
        }
        for cell in &mut self.cells[start..end] {
            cell.erase();
        }
    }

    /// Printable text of the row with trailing blanks trimmed
    pub fn text(&self) -> String {
        let mut result = String::with_capacity(self.cells.len());
        for cell in &self.cells {
            result.push(cell.display_char());
        }
        result.trim_end().to_string()
    }
}

/// The character grid, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    lines: Vec<Line>,
}

impl Grid {
    /// Create an empty grid. Dimensions are clamped to at least 1x1.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows,
            cols,
            lines: (0..rows).map(|_| Line::new(cols)).collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Highest valid row index
    pub fn last_row(&self) -> usize {
        self.rows - 1
    }

    /// Highest valid column index
    pub fn last_col(&self) -> usize {
        self.cols - 1
    }

    pub fn clamp_row(&self, row: usize) -> usize {
        row.min(self.last_row())
    }

    pub fn clamp_col(&self, col: usize) -> usize {
        col.min(self.last_col())
    }

    pub fn line(&self, row: usize) -> &Line {
        &self.lines[self.clamp_row(row)]
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        let col = self.clamp_col(col);
        &self.lines[self.clamp_row(row)].cells[col]
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        let row = self.clamp_row(row);
        let col = self.clamp_col(col);
        &mut self.lines[row].cells[col]
    }

    /// Erase columns `start..end` of one row
    pub fn clear_cols(&mut self, row: usize, start: usize, end: usize) {
        let row = self.clamp_row(row);
        self.lines[row].clear_cols(start, end);
    }

    /// Erase every cell of rows `start..end`. Out-of-range rows are
    /// skipped silently.
    pub fn clear_rows(&mut self, start: usize, end: usize) {
        let end = end.min(self.rows);
        if start >= end {
            return;
        }
        for line in &mut self.lines[start..end] {
            line.clear();
        }
    }

    /// Erase the whole grid
    pub fn clear_all(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }

    /// Shift every row up by one: row 0 is discarded and the new last
    /// row comes up empty.
    pub fn scroll_up(&mut self) {
        self.lines.rotate_left(1);
        self.lines[self.rows - 1].clear();
    }

    /// Printable text of one row with trailing blanks trimmed
    pub fn row_text(&self, row: usize) -> String {
        self.line(row).text()
    }

    pub fn iter_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }
}
