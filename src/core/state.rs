//! The terminal state machine
//!
//! One owned value holding the grid, cursor, saved-cursor register and
//! selection. Every handler takes `&mut self`; there is no ambient
//! state. Interpretation of escape sequences happens a level up; this
//! type only knows grid-level operations.

use tracing::trace;
use unicode_width::UnicodeWidthChar;

use super::cell::{Color, Style};
use super::cursor::Cursor;
use super::grid::Grid;
use super::selection::{Selection, SelectionPoint};

/// Grid dimensions used when no configuration says otherwise
pub const DEFAULT_ROWS: usize = 24;
pub const DEFAULT_COLS: usize = 80;

/// Which span an erase operation covers, relative to the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EraseMode {
    /// Mode 0: cursor through the end
    ToEnd,
    /// Mode 1: start through the cursor, inclusive
    ToStart,
    /// Mode 2: everything
    All,
}

/// Grid, cursor and selection state of one terminal
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalState {
    grid: Grid,
    cursor: Cursor,
    /// One-slot save/restore register, starts at the home position
    saved_cursor: (usize, usize),
    selection: Option<Selection>,
}

impl TerminalState {
    /// Create a terminal with an empty grid. Dimensions are fixed for
    /// the life of the value.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            grid: Grid::new(rows, cols),
            cursor: Cursor::new(),
            saved_cursor: (0, 0),
            selection: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Printable text of one row with trailing blanks trimmed
    pub fn row_text(&self, row: usize) -> String {
        self.grid.row_text(row)
    }

    /// Write one scalar at the cursor with the current brush, then
    /// advance. Advancing past the last column wraps to the next row
    /// start; wrapping past the last row scrolls.
    pub fn print(&mut self, ch: char) {
        // Zero-width scalars (combining marks and friends) occupy no
        // cell and are dropped
        if ch.width().unwrap_or(0) == 0 {
            trace!(?ch, "dropping zero-width scalar");
            return;
        }
        let style = self.cursor.style;
        self.grid
            .cell_mut(self.cursor.row, self.cursor.col)
            .write(ch, style);
        self.advance();
    }

    fn advance(&mut self) {
        self.cursor.col += 1;
        if self.cursor.col >= self.grid.cols() {
            self.cursor.col = 0;
            self.step_row();
        }
    }

    /// Move down one row, scrolling when already on the last
    fn step_row(&mut self) {
        if self.cursor.row + 1 >= self.grid.rows() {
            self.grid.scroll_up();
            self.cursor.row = self.grid.last_row();
        } else {
            self.cursor.row += 1;
        }
    }

    /// Line feed: next row (scrolling at the bottom), column to 0
    pub fn linefeed(&mut self) {
        self.cursor.col = 0;
        self.step_row();
    }

    /// Carriage return: column to 0
    pub fn carriage_return(&mut self) {
        self.cursor.carriage_return();
    }

    /// Backspace: step left one column if possible and clear that cell's
    /// scalar. Never crosses a row boundary.
    pub fn backspace(&mut self) {
        if self.cursor.col == 0 {
            return;
        }
        self.cursor.col -= 1;
        self.grid
            .cell_mut(self.cursor.row, self.cursor.col)
            .clear_scalar();
    }

    pub fn cursor_up(&mut self, n: usize) {
        self.cursor.move_up(n);
    }

    pub fn cursor_down(&mut self, n: usize) {
        self.cursor.move_down(n, self.grid.rows());
    }

    pub fn cursor_forward(&mut self, n: usize) {
        self.cursor.move_right(n, self.grid.cols());
    }

    pub fn cursor_back(&mut self, n: usize) {
        self.cursor.move_left(n);
    }

    /// Absolute cursor position, 0-indexed, clamped to the grid
    pub fn set_cursor(&mut self, row: usize, col: usize) {
        self.cursor
            .move_to(row, col, self.grid.rows(), self.grid.cols());
    }

    /// Store the cursor position in the one-slot register
    pub fn save_cursor(&mut self) {
        self.saved_cursor = (self.cursor.row, self.cursor.col);
    }

    /// Return the cursor to the stored position. Restoring without a
    /// prior save goes to the home position.
    pub fn restore_cursor(&mut self) {
        let (row, col) = self.saved_cursor;
        self.set_cursor(row, col);
    }

    /// Erase a span of the display relative to the cursor. Mode `All`
    /// also homes the cursor.
    pub fn erase_in_display(&mut self, mode: EraseMode) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        match mode {
            EraseMode::ToEnd => {
                self.grid.clear_cols(row, col, self.grid.cols());
                self.grid.clear_rows(row + 1, self.grid.rows());
            }
            EraseMode::ToStart => {
                self.grid.clear_rows(0, row);
                self.grid.clear_cols(row, 0, col + 1);
            }
            EraseMode::All => {
                self.grid.clear_all();
                self.cursor.row = 0;
                self.cursor.col = 0;
            }
        }
    }

    /// Erase a span of the cursor's row. The cursor does not move.
    pub fn erase_in_line(&mut self, mode: EraseMode) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        match mode {
            EraseMode::ToEnd => self.grid.clear_cols(row, col, self.grid.cols()),
            EraseMode::ToStart => self.grid.clear_cols(row, 0, col + 1),
            EraseMode::All => self.grid.clear_cols(row, 0, self.grid.cols()),
        }
    }

    pub fn reset_style(&mut self) {
        self.cursor.reset_style();
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.cursor.style.bold = bold;
    }

    pub fn set_foreground(&mut self, color: Color) {
        self.cursor.style.fg = color;
    }

    pub fn set_background(&mut self, color: Color) {
        self.cursor.style.bg = color;
    }

    /// Anchor a new selection at (row, col), replacing any existing one
    pub fn begin_selection(&mut self, row: usize, col: usize) {
        let point = SelectionPoint::new(self.grid.clamp_row(row), self.grid.clamp_col(col));
        self.selection = Some(Selection::new(point));
    }

    /// Move the live end of the selection. Without a prior
    /// `begin_selection` this does nothing.
    pub fn update_selection(&mut self, row: usize, col: usize) {
        let point = SelectionPoint::new(self.grid.clamp_row(row), self.grid.clamp_col(col));
        if let Some(selection) = self.selection.as_mut() {
            selection.drag_to(point);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Whether the cell at (row, col) is inside the selection
    pub fn is_selected(&self, row: usize, col: usize) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|s| s.contains(row, col, self.grid.cols()))
    }

    /// Extract the selected text, if a selection exists
    pub fn selection_text(&self) -> Option<String> {
        self.selection.as_ref().map(|s| s.extract(&self.grid))
    }
}
