//! Decoded terminal events
//!
//! Semantic operations produced by the decoder. Escape sequences are
//! classified here, at decode time, so the interpreter dispatches on one
//! closed enum instead of re-inspecting raw final bytes and parameters.

use serde::{Deserialize, Serialize};

use crate::core::{Color, EraseMode};

/// One decoded event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Print a character at the cursor
    Print(char),

    /// Execute a C0 control character
    Control(ControlCode),

    /// Execute a control sequence
    Csi(ControlFunction),
}

/// C0 control characters with grid-visible effects
///
/// Controls outside this set are dropped by the decoder. Horizontal tab
/// never appears here either: the decoder expands it to literal space
/// prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCode {
    /// BEL - audible bell
    Bell,
    /// BS - move cursor left one column (DEL is routed here too)
    Backspace,
    /// LF - advance one row, column to 0
    LineFeed,
    /// CR - column to 0
    CarriageReturn,
}

/// A classified CSI control sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlFunction {
    /// CUU - cursor up by count
    CursorUp(u16),
    /// CUD - cursor down by count
    CursorDown(u16),
    /// CUF - cursor forward by count
    CursorForward(u16),
    /// CUB - cursor back by count
    CursorBack(u16),
    /// CUP/HVP - absolute position, 1-based as sent on the wire
    CursorPosition { row: u16, col: u16 },
    /// Save cursor position into the one-slot register
    SaveCursor,
    /// Restore cursor position from the one-slot register
    RestoreCursor,
    /// ED - erase a span of the display relative to the cursor
    EraseInDisplay(EraseMode),
    /// EL - erase a span of the cursor row
    EraseInLine(EraseMode),
    /// SGR - apply graphic rendition attributes in order
    SelectGraphicRendition(Vec<SgrAttribute>),
    /// Recognized sequence shape with an unknown final byte or parameter;
    /// consumed as a no-op
    Unsupported(u8),
}

/// One SGR attribute, already resolved to its effect on the brush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SgrAttribute {
    /// Code 0 - default colors, bold off
    Reset,
    /// Code 1
    Bold,
    /// Code 22
    CancelBold,
    /// Codes 30-37, 90-97, 38;5;N, 39
    Foreground(Color),
    /// Codes 40-47, 100-107, 48;5;N, 49
    Background(Color),
}

impl ControlFunction {
    /// Classify a completed CSI sequence from its accumulated parameters
    /// and final byte. Missing or zero count parameters become 1; erase
    /// selectors default to 0.
    pub fn from_csi(params: &[u16], final_byte: u8) -> Self {
        match final_byte {
            b'A' => ControlFunction::CursorUp(param_or(params, 0, 1)),
            b'B' => ControlFunction::CursorDown(param_or(params, 0, 1)),
            b'C' => ControlFunction::CursorForward(param_or(params, 0, 1)),
            b'D' => ControlFunction::CursorBack(param_or(params, 0, 1)),
            b'H' | b'f' => ControlFunction::CursorPosition {
                row: param_or(params, 0, 1),
                col: param_or(params, 1, 1),
            },
            b's' => ControlFunction::SaveCursor,
            b'u' => ControlFunction::RestoreCursor,
            b'J' => match param_at(params, 0) {
                0 => ControlFunction::EraseInDisplay(EraseMode::ToEnd),
                1 => ControlFunction::EraseInDisplay(EraseMode::ToStart),
                // 3 (erase with scrollback) folds into 2: there is no
                // scrollback here
                2 | 3 => ControlFunction::EraseInDisplay(EraseMode::All),
                _ => ControlFunction::Unsupported(b'J'),
            },
            b'K' => match param_at(params, 0) {
                0 => ControlFunction::EraseInLine(EraseMode::ToEnd),
                1 => ControlFunction::EraseInLine(EraseMode::ToStart),
                2 => ControlFunction::EraseInLine(EraseMode::All),
                _ => ControlFunction::Unsupported(b'K'),
            },
            b'm' => ControlFunction::SelectGraphicRendition(parse_sgr(params)),
            other => ControlFunction::Unsupported(other),
        }
    }
}

/// Parameter at `index`, with 0 and missing both meaning `default`
fn param_or(params: &[u16], index: usize, default: u16) -> u16 {
    match params.get(index) {
        Some(&0) | None => default,
        Some(&v) => v,
    }
}

/// Parameter at `index`, missing meaning 0
fn param_at(params: &[u16], index: usize) -> u16 {
    params.get(index).copied().unwrap_or(0)
}

/// Resolve an SGR parameter list into attribute events.
///
/// An empty list is equivalent to a single 0. Unknown standalone codes
/// are skipped without aborting the rest of the list; an extended-color
/// selector consumes its whole form even when the form is unsupported,
/// so color components never decode as stray codes.
fn parse_sgr(params: &[u16]) -> Vec<SgrAttribute> {
    if params.is_empty() {
        return vec![SgrAttribute::Reset];
    }

    let mut attrs = Vec::new();
    let mut i = 0;
    while i < params.len() {
        match params[i] {
            0 => attrs.push(SgrAttribute::Reset),
            1 => attrs.push(SgrAttribute::Bold),
            22 => attrs.push(SgrAttribute::CancelBold),
            30..=37 => attrs.push(SgrAttribute::Foreground(Color::Indexed(
                (params[i] - 30) as u8,
            ))),
            39 => attrs.push(SgrAttribute::Foreground(Color::Default)),
            40..=47 => attrs.push(SgrAttribute::Background(Color::Indexed(
                (params[i] - 40) as u8,
            ))),
            49 => attrs.push(SgrAttribute::Background(Color::Default)),
            90..=97 => attrs.push(SgrAttribute::Foreground(Color::Indexed(
                (params[i] - 90 + 8) as u8,
            ))),
            100..=107 => attrs.push(SgrAttribute::Background(Color::Indexed(
                (params[i] - 100 + 8) as u8,
            ))),
            38 | 48 => match params.get(i + 1) {
                // Indexed form selector;5;N
                Some(&5) => match params.get(i + 2) {
                    Some(&n) => {
                        let color = Color::Indexed(n.min(255) as u8);
                        attrs.push(if params[i] == 38 {
                            SgrAttribute::Foreground(color)
                        } else {
                            SgrAttribute::Background(color)
                        });
                        i += 2;
                    }
                    None => {
                        tracing::trace!(selector = params[i], "truncated extended color");
                        i += 1;
                    }
                },
                // Direct-color form selector;2;R;G;B is not supported,
                // but its components must not re-enter the list as
                // standalone codes
                Some(&2) => {
                    tracing::trace!(selector = params[i], "skipping direct-color form");
                    i += 4;
                }
                // Unknown form: the arity is unknowable, so the rest of
                // the list cannot be trusted
                Some(_) => {
                    tracing::trace!(selector = params[i], "unsupported extended color form");
                    break;
                }
                None => {
                    tracing::trace!(selector = params[i], "truncated extended color");
                    i += 1;
                }
            },
            other => tracing::trace!(code = other, "ignoring unknown graphic rendition code"),
        }
        i += 1;
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_defaults() {
        assert_eq!(
            ControlFunction::from_csi(&[], b'A'),
            ControlFunction::CursorUp(1)
        );
        assert_eq!(
            ControlFunction::from_csi(&[0], b'B'),
            ControlFunction::CursorDown(1)
        );
        assert_eq!(
            ControlFunction::from_csi(&[7], b'C'),
            ControlFunction::CursorForward(7)
        );
    }

    #[test]
    fn test_cursor_position_defaults() {
        assert_eq!(
            ControlFunction::from_csi(&[], b'H'),
            ControlFunction::CursorPosition { row: 1, col: 1 }
        );
        assert_eq!(
            ControlFunction::from_csi(&[5], b'f'),
            ControlFunction::CursorPosition { row: 5, col: 1 }
        );
        assert_eq!(
            ControlFunction::from_csi(&[0, 12], b'H'),
            ControlFunction::CursorPosition { row: 1, col: 12 }
        );
    }

    #[test]
    fn test_erase_selectors() {
        assert_eq!(
            ControlFunction::from_csi(&[], b'J'),
            ControlFunction::EraseInDisplay(EraseMode::ToEnd)
        );
        assert_eq!(
            ControlFunction::from_csi(&[1], b'J'),
            ControlFunction::EraseInDisplay(EraseMode::ToStart)
        );
        assert_eq!(
            ControlFunction::from_csi(&[2], b'J'),
            ControlFunction::EraseInDisplay(EraseMode::All)
        );
        assert_eq!(
            ControlFunction::from_csi(&[3], b'J'),
            ControlFunction::EraseInDisplay(EraseMode::All)
        );
        assert_eq!(
            ControlFunction::from_csi(&[4], b'J'),
            ControlFunction::Unsupported(b'J')
        );
        assert_eq!(
            ControlFunction::from_csi(&[2], b'K'),
            ControlFunction::EraseInLine(EraseMode::All)
        );
    }

    #[test]
    fn test_unknown_final_byte() {
        assert_eq!(
            ControlFunction::from_csi(&[1, 2], b'Z'),
            ControlFunction::Unsupported(b'Z')
        );
    }

    #[test]
    fn test_sgr_empty_is_reset() {
        assert_eq!(parse_sgr(&[]), vec![SgrAttribute::Reset]);
        assert_eq!(parse_sgr(&[0]), vec![SgrAttribute::Reset]);
    }

    #[test]
    fn test_sgr_basic_colors() {
        assert_eq!(
            parse_sgr(&[31, 42]),
            vec![
                SgrAttribute::Foreground(Color::Indexed(1)),
                SgrAttribute::Background(Color::Indexed(2)),
            ]
        );
        assert_eq!(
            parse_sgr(&[97, 100]),
            vec![
                SgrAttribute::Foreground(Color::Indexed(15)),
                SgrAttribute::Background(Color::Indexed(8)),
            ]
        );
        assert_eq!(
            parse_sgr(&[39, 49]),
            vec![
                SgrAttribute::Foreground(Color::Default),
                SgrAttribute::Background(Color::Default),
            ]
        );
    }

    #[test]
    fn test_sgr_extended_color() {
        assert_eq!(
            parse_sgr(&[38, 5, 196]),
            vec![SgrAttribute::Foreground(Color::Indexed(196))]
        );
        assert_eq!(
            parse_sgr(&[48, 5, 17, 1]),
            vec![
                SgrAttribute::Background(Color::Indexed(17)),
                SgrAttribute::Bold,
            ]
        );
        // Out-of-range index clamps to the palette
        assert_eq!(
            parse_sgr(&[38, 5, 999]),
            vec![SgrAttribute::Foreground(Color::Indexed(255))]
        );
    }

    #[test]
    fn test_sgr_truncated_extended_color() {
        assert_eq!(parse_sgr(&[38, 5]), vec![]);
        assert_eq!(parse_sgr(&[38]), vec![]);
    }

    #[test]
    fn test_sgr_direct_color_form_consumed_whole() {
        // The R;G;B components are not read back as standalone codes
        assert_eq!(parse_sgr(&[38, 2, 0, 0, 0]), vec![]);
        assert_eq!(parse_sgr(&[48, 2, 255, 128, 1]), vec![]);
        // Codes after the skipped form still apply
        assert_eq!(
            parse_sgr(&[38, 2, 10, 20, 30, 1]),
            vec![SgrAttribute::Bold]
        );
        // Truncated form at the end of the list
        assert_eq!(parse_sgr(&[38, 2, 10]), vec![]);
    }

    #[test]
    fn test_sgr_unknown_color_form_ends_list() {
        assert_eq!(parse_sgr(&[38, 7, 31]), vec![]);
        assert_eq!(parse_sgr(&[31, 48, 6, 1]), vec![SgrAttribute::Foreground(Color::Indexed(1))]);
    }

    #[test]
    fn test_sgr_unknown_codes_skipped() {
        assert_eq!(
            parse_sgr(&[4, 31, 7]),
            vec![SgrAttribute::Foreground(Color::Indexed(1))]
        );
    }

    #[test]
    fn test_sgr_bold_lifecycle() {
        assert_eq!(
            parse_sgr(&[1, 22]),
            vec![SgrAttribute::Bold, SgrAttribute::CancelBold]
        );
    }
}
