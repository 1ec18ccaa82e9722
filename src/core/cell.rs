//! Grid cells, colors and the style brush
//!
//! A cell is one grid position: a Unicode scalar (or nothing) plus the
//! style it was written with. Colors stay symbolic in the grid; only the
//! palette lookups at the bottom of this file turn an index into concrete
//! channel values, and only a render boundary decides what `Default`
//! means.

use serde::{Deserialize, Serialize};

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The scalar in this cell, `None` when the cell is empty
    pub ch: Option<char>,
    /// Style the scalar was written with
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: None,
            style: Style::default(),
        }
    }
}

impl Cell {
    /// Replace the cell's full contents
    pub fn write(&mut self, ch: char, style: Style) {
        self.ch = Some(ch);
        self.style = style;
    }

    /// Return the cell to the empty default state
    pub fn erase(&mut self) {
        *self = Self::default();
    }

    /// Remove the scalar but keep the style, as backspace does
    pub fn clear_scalar(&mut self) {
        self.ch = None;
    }

    pub fn is_empty(&self) -> bool {
        self.ch.is_none()
    }

    /// The scalar to show for this cell; empty cells display as a space
    pub fn display_char(&self) -> char {
        self.ch.unwrap_or(' ')
    }
}

/// The style brush: what SGR state gets stamped into cells on write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
}

impl Style {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A symbolic color as stored in cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    /// The host's default foreground or background, whichever slot this
    /// color occupies
    #[default]
    Default,
    /// An entry of the 256-color palette
    Indexed(u8),
}

impl Color {
    /// Standard ANSI colors (0-7)
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);

    /// Bright ANSI colors (8-15)
    pub const BRIGHT_BLACK: Color = Color::Indexed(8);
    pub const BRIGHT_RED: Color = Color::Indexed(9);
    pub const BRIGHT_GREEN: Color = Color::Indexed(10);
    pub const BRIGHT_YELLOW: Color = Color::Indexed(11);
    pub const BRIGHT_BLUE: Color = Color::Indexed(12);
    pub const BRIGHT_MAGENTA: Color = Color::Indexed(13);
    pub const BRIGHT_CYAN: Color = Color::Indexed(14);
    pub const BRIGHT_WHITE: Color = Color::Indexed(15);

    /// Resolve to concrete channels, substituting `default` for the
    /// `Default` variant
    pub fn resolve(self, default: Rgb) -> Rgb {
        match self {
            Color::Default => default,
            Color::Indexed(n) => indexed_rgb(n),
        }
    }
}

/// Concrete color channels, produced only at a render boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The 16 base ANSI entries, xterm's classic values
const ANSI_16: [Rgb; 16] = [
    Rgb::new(0, 0, 0),       // black
    Rgb::new(205, 0, 0),     // red
    Rgb::new(0, 205, 0),     // green
    Rgb::new(205, 205, 0),   // yellow
    Rgb::new(0, 0, 238),     // blue
    Rgb::new(205, 0, 205),   // magenta
    Rgb::new(0, 205, 205),   // cyan
    Rgb::new(229, 229, 229), // white
    Rgb::new(127, 127, 127), // bright black
    Rgb::new(255, 0, 0),     // bright red
    Rgb::new(0, 255, 0),     // bright green
    Rgb::new(255, 255, 0),   // bright yellow
    Rgb::new(92, 92, 255),   // bright blue
    Rgb::new(255, 0, 255),   // bright magenta
    Rgb::new(0, 255, 255),   // bright cyan
    Rgb::new(255, 255, 255), // bright white
];

/// Channel steps for the 6x6x6 color cube
const CUBE_RAMP: [u8; 6] = [0x00, 0x33, 0x66, 0x99, 0xCC, 0xFF];

/// Look up a 256-color palette index.
///
/// 0-15 are the fixed ANSI entries, 16-231 the color cube, 232-255 a
/// 24-step grayscale ramp between black and white.
pub fn indexed_rgb(index: u8) -> Rgb {
    match index {
        0..=15 => ANSI_16[index as usize],
        16..=231 => {
            let idx = index - 16;
            let r = idx / 36;
            let g = (idx / 6) % 6;
            let b = idx % 6;
            Rgb::new(
                CUBE_RAMP[r as usize],
                CUBE_RAMP[g as usize],
                CUBE_RAMP[b as usize],
            )
        }
        232..=255 => {
            let gray = 8 + (index - 232) * 10;
            Rgb::new(gray, gray, gray)
        }
    }
}
