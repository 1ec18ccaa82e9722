//! Dango Terminal Emulator Library
//!
//! A small character terminal emulator built without terminal emulation
//! libraries. This crate provides the state side of a terminal:
//!
//! - `parser`: incremental escape sequence decoder and UTF-8 assembly
//! - `core`: fixed-size grid, cursor, colors, selection, snapshots
//! - `pty`: Linux PTY management
//! - `input`: key event to byte sequence encoding
//! - `config`: on-disk JSON configuration
//!
//! The [`Terminal`] type ties the decoder to the grid state machine and is
//! the main entry point for embedders.

pub mod config;
pub mod core;
pub mod input;
pub mod parser;
pub mod pty;

mod terminal;

pub use terminal::Terminal;
