//! Terminal executor
//!
//! Ties the decoder to the state machine: bytes go in, decoded events
//! are applied to the grid in order. This is the main entry point for
//! embedders; the session binaries and the headless runner both drive
//! everything through [`Terminal::process`].

use tracing::debug;

use crate::core::{Snapshot, TerminalState};
use crate::parser::{Action, ControlCode, ControlFunction, Decoder, SgrAttribute};

/// A terminal: decoder plus grid state
pub struct Terminal {
    state: TerminalState,
    decoder: Decoder,
    /// Bells seen since the last `take_bell`
    bell_pending: u32,
}

impl Terminal {
    /// Create a terminal with the given grid dimensions
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            state: TerminalState::new(rows, cols),
            decoder: Decoder::new(),
            bell_pending: 0,
        }
    }

    pub fn state(&self) -> &TerminalState {
        &self.state
    }

    /// Mutable state access, used by embedders for selection updates
    pub fn state_mut(&mut self) -> &mut TerminalState {
        &mut self.state
    }

    /// Capture a snapshot of the current state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_state(&self.state)
    }

    /// Feed output bytes read from the child. Chunk boundaries are
    /// arbitrary; sequences split across calls finish on later ones.
    pub fn process(&mut self, data: &[u8]) {
        for action in self.decoder.decode(data) {
            self.apply(action);
        }
    }

    /// True if any bell arrived since the last call; clears the flag
    pub fn take_bell(&mut self) -> bool {
        let pending = self.bell_pending > 0;
        self.bell_pending = 0;
        pending
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Print(ch) => self.state.print(ch),
            Action::Control(code) => match code {
                ControlCode::Bell => self.bell_pending += 1,
                ControlCode::Backspace => self.state.backspace(),
                ControlCode::LineFeed => self.state.linefeed(),
                ControlCode::CarriageReturn => self.state.carriage_return(),
            },
            Action::Csi(function) => self.dispatch(function),
        }
    }

    fn dispatch(&mut self, function: ControlFunction) {
        match function {
            ControlFunction::CursorUp(n) => self.state.cursor_up(n as usize),
            ControlFunction::CursorDown(n) => self.state.cursor_down(n as usize),
            ControlFunction::CursorForward(n) => self.state.cursor_forward(n as usize),
            ControlFunction::CursorBack(n) => self.state.cursor_back(n as usize),
            ControlFunction::CursorPosition { row, col } => {
                // 1-based on the wire, 0-based in the grid
                self.state.set_cursor(
                    row.saturating_sub(1) as usize,
                    col.saturating_sub(1) as usize,
                );
            }
            ControlFunction::SaveCursor => self.state.save_cursor(),
            ControlFunction::RestoreCursor => self.state.restore_cursor(),
            ControlFunction::EraseInDisplay(mode) => self.state.erase_in_display(mode),
            ControlFunction::EraseInLine(mode) => self.state.erase_in_line(mode),
            ControlFunction::SelectGraphicRendition(attrs) => {
                for attr in attrs {
                    self.apply_sgr(attr);
                }
            }
            ControlFunction::Unsupported(final_byte) => {
                debug!(
                    final_byte = %(final_byte as char),
                    "ignoring unsupported control function"
                );
            }
        }
    }

    fn apply_sgr(&mut self, attr: SgrAttribute) {
        match attr {
            SgrAttribute::Reset => self.state.reset_style(),
            SgrAttribute::Bold => self.state.set_bold(true),
            SgrAttribute::CancelBold => self.state.set_bold(false),
            SgrAttribute::Foreground(color) => self.state.set_foreground(color),
            SgrAttribute::Background(color) => self.state.set_background(color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Color, EraseMode, DEFAULT_COLS, DEFAULT_ROWS};

    fn terminal() -> Terminal {
        Terminal::new(DEFAULT_ROWS, DEFAULT_COLS)
    }

    #[test]
    fn test_plain_text() {
        let mut term = terminal();
        term.process(b"Hello, World!");
        assert_eq!(term.state().row_text(0), "Hello, World!");
    }

    #[test]
    fn test_newline_and_cr() {
        let mut term = terminal();
        term.process(b"one\r\ntwo\r\nthree");
        assert_eq!(term.state().row_text(0), "one");
        assert_eq!(term.state().row_text(1), "two");
        assert_eq!(term.state().row_text(2), "three");
    }

    #[test]
    fn test_bare_linefeed_resets_column() {
        let mut term = terminal();
        term.process(b"abc\ndef");
        assert_eq!(term.state().row_text(1), "def");
        assert_eq!(term.state().cursor().col, 3);
    }

    #[test]
    fn test_cursor_position_one_based() {
        let mut term = terminal();
        term.process(b"\x1b[3;5HX");
        assert_eq!(term.state().grid().cell(2, 4).ch, Some('X'));
    }

    #[test]
    fn test_cursor_movement_sequences() {
        let mut term = terminal();
        term.process(b"\x1b[5;5H\x1b[2A\x1b[3C\x1b[1B\x1b[4D");
        let cursor = term.state().cursor();
        // (4,4) up 2 -> (2,4), forward 3 -> (2,7), down 1 -> (3,7), back 4 -> (3,3)
        assert_eq!((cursor.row, cursor.col), (3, 3));
    }

    #[test]
    fn test_sgr_colors_applied() {
        let mut term = terminal();
        term.process(b"\x1b[31mR\x1b[0mN");

        let red = term.state().grid().cell(0, 0);
        assert_eq!(red.style.fg, Color::RED);
        let normal = term.state().grid().cell(0, 1);
        assert_eq!(normal.style.fg, Color::Default);
    }

    #[test]
    fn test_sgr_extended_color() {
        let mut term = terminal();
        term.process(b"\x1b[38;5;196m\x1b[48;5;17mX");
        let cell = term.state().grid().cell(0, 0);
        assert_eq!(cell.style.fg, Color::Indexed(196));
        assert_eq!(cell.style.bg, Color::Indexed(17));
    }

    #[test]
    fn test_erase_display_via_sequence() {
        let mut term = terminal();
        term.process(b"junk on screen\x1b[2J");
        assert_eq!(term.state().row_text(0), "");
        assert_eq!(
            (term.state().cursor().row, term.state().cursor().col),
            (0, 0)
        );
    }

    #[test]
    fn test_save_restore_via_sequence() {
        let mut term = terminal();
        term.process(b"\x1b[10;20H\x1b[s\x1b[1;1H\x1b[u");
        assert_eq!(
            (term.state().cursor().row, term.state().cursor().col),
            (9, 19)
        );
    }

    #[test]
    fn test_bell_latched_and_taken() {
        let mut term = terminal();
        assert!(!term.take_bell());
        term.process(b"ding\x07dong\x07");
        assert!(term.take_bell());
        assert!(!term.take_bell());
    }

    #[test]
    fn test_unsupported_function_is_noop() {
        let mut term = terminal();
        term.process(b"\x1b[?1049h\x1b[99ZX");
        assert_eq!(term.state().row_text(0), "X");
        assert_eq!(term.state().grid().cell(0, 0).style.fg, Color::Default);
    }

    #[test]
    fn test_erase_dispatch_maps_modes() {
        let mut term = terminal();
        term.process(b"abcdef\x1b[1;4H\x1b[K");
        // EL default mode 0: cursor at col 3, clears to line end
        assert_eq!(term.state().row_text(0), "abc");

        term.process(b"\x1b[2K");
        assert_eq!(term.state().row_text(0), "");

        // Direct state-level equivalence
        let mut term2 = terminal();
        term2.process(b"abcdef\x1b[1;4H");
        term2.state_mut().erase_in_line(EraseMode::ToEnd);
        assert_eq!(term2.state().row_text(0), "abc");
    }

    #[test]
    fn test_snapshot_reflects_processed_bytes() {
        let mut term = terminal();
        term.process(b"\x1b[1mBold");
        let snapshot = term.snapshot();
        assert!(snapshot.cell(0, 0).is_some_and(|c| c.bold));
        assert_eq!(snapshot.cursor.col, 4);
    }
}
