//! Escape sequence decoder
//!
//! A stateful decoder that converts a byte stream into terminal events.
//! State survives between calls so sequences may be split at arbitrary
//! read boundaries.

mod action;
mod state;
mod utf8;

pub use action::{Action, ControlCode, ControlFunction, SgrAttribute};
pub use state::Decoder;
pub use utf8::{Utf8Assembler, Utf8Result};
