//! Streaming UTF-8 assembly for the decoder
//!
//! Accumulates one byte at a time so that multi-byte scalars split across
//! read chunks decode the same as contiguous input. Invalid input is
//! reported to the caller, never substituted; the caller decides how to
//! resynchronize.

/// Incremental UTF-8 assembler
#[derive(Debug, Clone, Default)]
pub struct Utf8Assembler {
    /// Bytes accumulated for the current scalar
    buffer: [u8; 4],
    /// Number of bytes in `buffer`
    filled: usize,
    /// Total bytes the lead byte announced
    want: usize,
}

/// Result of feeding a byte to the assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Result {
    /// More bytes needed
    Incomplete,
    /// A scalar finished, with its encoded length in bytes
    Complete(char, usize),
    /// The byte cannot extend or start a sequence; accumulated bytes are
    /// dropped and the assembler is reset
    Invalid,
}

impl Utf8Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any partially accumulated sequence
    pub fn reset(&mut self) {
        self.filled = 0;
        self.want = 0;
    }

    /// True while a multi-byte sequence is partially accumulated
    pub fn in_progress(&self) -> bool {
        self.filled > 0
    }

    /// Feed one byte
    pub fn feed(&mut self, byte: u8) -> Utf8Result {
        // ASCII fast path
        if self.filled == 0 && byte < 0x80 {
            return Utf8Result::Complete(byte as char, 1);
        }

        // Lead byte
        if self.filled == 0 {
            self.want = match byte {
                0xC2..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF4 => 4,
                // Stray continuation byte, overlong lead (0xC0/0xC1) or
                // out-of-range lead (0xF5..)
                _ => return Utf8Result::Invalid,
            };
            self.buffer[0] = byte;
            self.filled = 1;
            return Utf8Result::Incomplete;
        }

        // Continuation byte
        if byte & 0b1100_0000 != 0b1000_0000 {
            self.reset();
            return Utf8Result::Invalid;
        }

        // The second byte carries the overlong / surrogate / range
        // constraints for the longer forms
        if self.filled == 1 && !second_byte_valid(self.buffer[0], byte) {
            self.reset();
            return Utf8Result::Invalid;
        }

        self.buffer[self.filled] = byte;
        self.filled += 1;

        if self.filled < self.want {
            return Utf8Result::Incomplete;
        }

        let cp = match self.want {
            2 => ((self.buffer[0] & 0x1F) as u32) << 6 | (self.buffer[1] & 0x3F) as u32,
            3 => {
                ((self.buffer[0] & 0x0F) as u32) << 12
                    | ((self.buffer[1] & 0x3F) as u32) << 6
                    | (self.buffer[2] & 0x3F) as u32
            }
            _ => {
                ((self.buffer[0] & 0x07) as u32) << 18
                    | ((self.buffer[1] & 0x3F) as u32) << 12
                    | ((self.buffer[2] & 0x3F) as u32) << 6
                    | (self.buffer[3] & 0x3F) as u32
            }
        };
        let len = self.want;
        self.reset();

        match char::from_u32(cp) {
            Some(ch) => Utf8Result::Complete(ch, len),
            None => Utf8Result::Invalid,
        }
    }
}

/// Range check for the byte after the lead, following the UTF-8 table:
/// rejects overlong encodings, surrogates, and scalars past U+10FFFF at
/// the earliest byte that determines them.
fn second_byte_valid(lead: u8, byte: u8) -> bool {
    match lead {
        0xE0 => (0xA0..=0xBF).contains(&byte),
        0xED => (0x80..=0x9F).contains(&byte),
        0xF0 => (0x90..=0xBF).contains(&byte),
        0xF4 => (0x80..=0x8F).contains(&byte),
        _ => true,
    }
}
