//! Cursor state
//!
//! Tracks the write position and the style brush that gets stamped into
//! cells. Relative motion clamps at the edges and never wraps or
//! scrolls; only printing and line feeds do that, over in the state
//! machine.

use serde::{Deserialize, Serialize};

use super::cell::Style;

/// The cursor: position plus the current style brush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Row position (0-indexed)
    pub row: usize,
    /// Column position (0-indexed)
    pub col: usize,
    /// Attributes applied to newly written cells
    pub style: Style,
}

impl Cursor {
    /// Create a cursor at the home position with the default brush
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to an absolute position, clamping to the grid
    pub fn move_to(&mut self, row: usize, col: usize, rows: usize, cols: usize) {
        self.row = row.min(rows.saturating_sub(1));
        self.col = col.min(cols.saturating_sub(1));
    }

    /// Move up by n rows, stopping at the top
    pub fn move_up(&mut self, n: usize) {
        self.row = self.row.saturating_sub(n);
    }

    /// Move down by n rows, stopping at the last row
    pub fn move_down(&mut self, n: usize, rows: usize) {
        self.row = self.row.saturating_add(n).min(rows.saturating_sub(1));
    }

    /// Move left by n columns, stopping at column 0
    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
    }

    /// Move right by n columns, stopping at the last column
    pub fn move_right(&mut self, n: usize, cols: usize) {
        self.col = self.col.saturating_add(n).min(cols.saturating_sub(1));
    }

    /// Carriage return: column to 0, row unchanged
    pub fn carriage_return(&mut self) {
        self.col = 0;
    }

    /// Reset only the style brush (SGR 0)
    pub fn reset_style(&mut self) {
        self.style = Style::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::Color;

    #[test]
    fn test_cursor_default() {
        let cursor = Cursor::default();
        assert_eq!(cursor.row, 0);
        assert_eq!(cursor.col, 0);
        assert_eq!(cursor.style, Style::default());
    }

    #[test]
    fn test_move_to_clamps() {
        let mut cursor = Cursor::new();
        cursor.move_to(10, 5, 24, 80);
        assert_eq!((cursor.row, cursor.col), (10, 5));

        cursor.move_to(50, 100, 24, 80);
        assert_eq!((cursor.row, cursor.col), (23, 79));
    }

    #[test]
    fn test_relative_movement() {
        let mut cursor = Cursor::new();
        cursor.move_to(10, 10, 24, 80);

        cursor.move_up(3);
        assert_eq!(cursor.row, 7);

        cursor.move_down(5, 24);
        assert_eq!(cursor.row, 12);

        cursor.move_left(4);
        assert_eq!(cursor.col, 6);

        cursor.move_right(10, 80);
        assert_eq!(cursor.col, 16);
    }

    #[test]
    fn test_movement_stops_at_edges() {
        let mut cursor = Cursor::new();

        cursor.move_up(100);
        assert_eq!(cursor.row, 0);

        cursor.move_left(100);
        assert_eq!(cursor.col, 0);

        cursor.move_down(100, 24);
        assert_eq!(cursor.row, 23);

        cursor.move_right(100, 80);
        assert_eq!(cursor.col, 79);
    }

    #[test]
    fn test_carriage_return_keeps_row() {
        let mut cursor = Cursor::new();
        cursor.move_to(10, 50, 24, 80);
        cursor.carriage_return();
        assert_eq!((cursor.row, cursor.col), (10, 0));
    }

    #[test]
    fn test_reset_style_keeps_position() {
        let mut cursor = Cursor::new();
        cursor.move_to(3, 4, 24, 80);
        cursor.style.fg = Color::RED;
        cursor.style.bold = true;

        cursor.reset_style();

        assert_eq!((cursor.row, cursor.col), (3, 4));
        assert_eq!(cursor.style, Style::default());
    }
}
