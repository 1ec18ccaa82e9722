//! Decoder state machine
//!
//! Incremental recognizer for the escape-sequence grammar the grid
//! understands. The decoder holds its state across calls, so a sequence
//! split at any byte boundary between reads decodes exactly as it would
//! from contiguous input.
//!
//! # States
//!
//! - Ground: printable text, C0 controls, UTF-8 assembly
//! - Escape: after ESC, deciding between CSI, OSC and two-byte sequences
//! - Csi: accumulating decimal parameters until a final byte
//! - Osc: skipping an OSC payload until BEL or ST
//! - OscEscape: saw ESC inside an OSC, checking for the ST backslash
//!
//! The grammar is deliberately small: anything it does not recognize is
//! consumed and neutralized rather than passed through, so unsupported
//! sequences can never leak bytes onto the grid.

use tracing::{debug, trace};

use super::action::{Action, ControlCode, ControlFunction};
use super::utf8::{Utf8Assembler, Utf8Result};

/// Columns a horizontal tab advances by, written as literal spaces
const TAB_WIDTH: usize = 4;

/// Upper bound on retained CSI parameters; extras are dropped
const MAX_PARAMS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    Csi,
    Osc,
    OscEscape,
}

/// The incremental escape-sequence decoder
#[derive(Debug)]
pub struct Decoder {
    state: State,
    /// Completed parameters for the sequence in progress
    params: Vec<u16>,
    /// Value of the parameter currently being accumulated
    current_param: u16,
    /// Whether the current parameter has seen a digit
    param_has_digit: bool,
    /// Set when a byte outside the grammar appeared inside the sequence;
    /// the sequence still terminates normally but dispatches as a no-op
    csi_malformed: bool,
    /// Multi-byte scalar assembly state
    utf8: Utf8Assembler,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Create a decoder in the ground state
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            params: Vec::with_capacity(16),
            current_param: 0,
            param_has_digit: false,
            csi_malformed: false,
            utf8: Utf8Assembler::new(),
        }
    }

    /// Decode a chunk of bytes into events.
    ///
    /// Incomplete trailing sequences stay buffered in the decoder and
    /// finish on a later call.
    pub fn decode(&mut self, data: &[u8]) -> Vec<Action> {
        let mut actions = Vec::new();
        for &byte in data {
            self.step(byte, &mut actions);
        }
        actions
    }

    fn step(&mut self, byte: u8, actions: &mut Vec<Action>) {
        match self.state {
            State::Ground => {
                // Finish or abort a pending multi-byte scalar before
                // looking at the byte itself
                if self.utf8.in_progress() {
                    match self.utf8.feed(byte) {
                        Utf8Result::Incomplete => return,
                        Utf8Result::Complete(ch, _) => {
                            actions.push(Action::Print(ch));
                            return;
                        }
                        Utf8Result::Invalid => {
                            trace!(byte, "dropping partial UTF-8 sequence");
                            // fall through: the byte starts something new
                        }
                    }
                }
                self.ground_byte(byte, actions);
            }

            State::Escape => match byte {
                b'[' => {
                    self.clear_sequence();
                    self.state = State::Csi;
                }
                b']' => self.state = State::Osc,
                // ESC ESC: the second ESC replaces the first and stays
                // armed, so the next byte reads as an escape introducer
                // rather than printing. Matches how hardware terminals
                // treat a restarted escape.
                0x1B => {}
                other => {
                    debug!(byte = other, "discarding two-byte escape sequence");
                    self.state = State::Ground;
                }
            },

            State::Csi => match byte {
                b'0'..=b'9' => {
                    self.current_param = self
                        .current_param
                        .saturating_mul(10)
                        .saturating_add((byte - b'0') as u16);
                    self.param_has_digit = true;
                }
                b';' => self.push_param(),
                0x40..=0x7E => {
                    if self.param_has_digit || !self.params.is_empty() {
                        self.push_param();
                    }
                    let function = if self.csi_malformed {
                        ControlFunction::Unsupported(byte)
                    } else {
                        ControlFunction::from_csi(&self.params, byte)
                    };
                    actions.push(Action::Csi(function));
                    self.state = State::Ground;
                }
                // CAN and SUB abandon the sequence outright
                0x18 | 0x1A => {
                    debug!("control sequence cancelled");
                    self.state = State::Ground;
                }
                // ESC abandons the sequence and starts a new one
                0x1B => {
                    debug!("escape restarts inside control sequence");
                    self.state = State::Escape;
                }
                other => {
                    // Private markers, intermediates and stray controls are
                    // outside the grammar; keep consuming to the final byte
                    // but neutralize the dispatch
                    trace!(byte = other, "unrecognized byte in control sequence");
                    self.csi_malformed = true;
                }
            },

            State::Osc => match byte {
                // Payload is skipped, not stored
                0x07 => self.state = State::Ground,
                0x1B => self.state = State::OscEscape,
                _ => {}
            },

            State::OscEscape => {
                if byte == b'\\' {
                    self.state = State::Ground;
                } else {
                    // The ESC ended the OSC; reprocess the byte as the
                    // second byte of a fresh escape
                    self.state = State::Escape;
                    self.step(byte, actions);
                }
            }
        }
    }

    fn ground_byte(&mut self, byte: u8, actions: &mut Vec<Action>) {
        match byte {
            0x1B => self.state = State::Escape,
            0x07 => actions.push(Action::Control(ControlCode::Bell)),
            0x08 | 0x7F => actions.push(Action::Control(ControlCode::Backspace)),
            0x09 => {
                for _ in 0..TAB_WIDTH {
                    actions.push(Action::Print(' '));
                }
            }
            0x0A => actions.push(Action::Control(ControlCode::LineFeed)),
            0x0D => actions.push(Action::Control(ControlCode::CarriageReturn)),
            0x00..=0x1F => trace!(byte, "ignoring control byte"),
            0x20..=0x7E => actions.push(Action::Print(byte as char)),
            _ => match self.utf8.feed(byte) {
                Utf8Result::Incomplete => {}
                Utf8Result::Complete(ch, _) => actions.push(Action::Print(ch)),
                Utf8Result::Invalid => trace!(byte, "dropping invalid UTF-8 byte"),
            },
        }
    }

    fn clear_sequence(&mut self) {
        self.params.clear();
        self.current_param = 0;
        self.param_has_digit = false;
        self.csi_malformed = false;
    }

    fn push_param(&mut self) {
        if self.params.len() < MAX_PARAMS {
            self.params.push(self.current_param);
        } else {
            trace!("parameter list truncated");
        }
        self.current_param = 0;
        self.param_has_digit = false;
    }
}
