//! Terminal core
//!
//! Platform-independent terminal state. This module contains:
//! - Fixed-size grid of styled cells
//! - Cursor state and positioning
//! - Colors and the palette lookups
//! - Selection with text extraction
//! - Deterministic snapshot generation
//!
//! The core is completely deterministic: given the same sequence of
//! events it always produces the same state.

mod cell;
mod cursor;
mod grid;
mod selection;
mod snapshot;
mod state;

pub use cell::{indexed_rgb, Cell, Color, Rgb, Style};
pub use cursor::Cursor;
pub use grid::{Grid, Line};
pub use selection::{Selection, SelectionPoint};
pub use snapshot::{CellSnapshot, CursorSnapshot, Snapshot};
pub use state::{EraseMode, TerminalState, DEFAULT_COLS, DEFAULT_ROWS};
