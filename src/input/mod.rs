//! Key to byte-sequence encoding
//!
//! Translates key events into the bytes a terminal application expects
//! on its input side. This is the write direction of the PTY; nothing
//! here touches the grid. The table is fixed: there are no application
//! cursor or keypad modes in this emulator, so every key has exactly
//! one encoding (modulo Ctrl/Alt).

/// Modifier keys held during a key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
    };

    pub fn ctrl() -> Self {
        Modifiers {
            ctrl: true,
            alt: false,
        }
    }

    pub fn alt() -> Self {
        Modifiers {
            ctrl: false,
            alt: true,
        }
    }
}

/// A key event as delivered by the hosting window layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Right,
    Left,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Backspace,
    Tab,
    Enter,
    Escape,
    /// A printable character
    Char(char),
}

/// Encode one key event into the bytes written to the PTY.
///
/// Unencodable combinations (Ctrl with a non-ASCII character, say)
/// fall back to the plain character encoding.
pub fn encode_key(key: Key, modifiers: Modifiers) -> Vec<u8> {
    match key {
        Key::Up => b"\x1b[A".to_vec(),
        Key::Down => b"\x1b[B".to_vec(),
        Key::Right => b"\x1b[C".to_vec(),
        Key::Left => b"\x1b[D".to_vec(),
        Key::Home => b"\x1b[H".to_vec(),
        Key::End => b"\x1b[F".to_vec(),
        Key::PageUp => b"\x1b[5~".to_vec(),
        Key::PageDown => b"\x1b[6~".to_vec(),
        Key::Insert => b"\x1b[2~".to_vec(),
        Key::Delete => b"\x1b[3~".to_vec(),
        // Backspace sends DEL; the decoder maps it back to a backspace
        // on the echo side
        Key::Backspace => vec![0x7F],
        Key::Tab => vec![b'\t'],
        Key::Enter => vec![b'\n'],
        Key::Escape => vec![0x1B],
        Key::Char(ch) => encode_char(ch, modifiers),
    }
}

/// Encode a printable character, applying Ctrl and Alt
pub fn encode_char(ch: char, modifiers: Modifiers) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(5);
    if modifiers.alt {
        bytes.push(0x1B);
    }

    if modifiers.ctrl {
        if let Some(ctrl) = control_byte(ch) {
            bytes.push(ctrl);
            return bytes;
        }
    }

    let mut buf = [0u8; 4];
    bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
    bytes
}

/// The control byte for Ctrl+key, if one exists.
///
/// Letters map through the usual `& 0x1F` arithmetic; the punctuation
/// forms follow the classic terminal layout (Ctrl-@ is NUL, Ctrl-[ is
/// ESC and so on).
fn control_byte(ch: char) -> Option<u8> {
    match ch {
        'a'..='z' | 'A'..='Z' => Some(ch as u8 & 0x1F),
        '@' | ' ' => Some(0x00),
        '[' => Some(0x1B),
        '\\' => Some(0x1C),
        ']' => Some(0x1D),
        '^' => Some(0x1E),
        '_' | '/' => Some(0x1F),
        '?' => Some(0x7F),
        _ => None,
    }
}
