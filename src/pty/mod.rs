//! Pseudoterminal handling for Linux
//!
//! Spawning a child process on a PTY, non-blocking I/O against the
//! master side, window size plumbing and child lifecycle.

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::{query_window_size, Pty, DEFAULT_TERM};

/// Error type for PTY operations
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("failed to open PTY master: {0}")]
    OpenMaster(#[source] nix::Error),

    #[error("failed to grant PTY access: {0}")]
    GrantPty(#[source] nix::Error),

    #[error("failed to unlock PTY: {0}")]
    UnlockPty(#[source] nix::Error),

    #[error("failed to get PTY name: {0}")]
    PtsName(#[source] nix::Error),

    #[error("failed to open PTY child side: {0}")]
    OpenChild(#[source] nix::Error),

    #[error("failed to fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("failed to create session: {0}")]
    Setsid(#[source] nix::Error),

    #[error("failed to duplicate file descriptor: {0}")]
    Dup2(#[source] nix::Error),

    #[error("failed to execute command: {0}")]
    Exec(#[source] nix::Error),

    #[error("window size ioctl failed: {0}")]
    Winsize(#[source] nix::Error),

    #[error("failed to set non-blocking mode: {0}")]
    SetNonBlocking(#[source] nix::Error),

    #[error("failed to read from PTY: {0}")]
    Read(#[source] nix::Error),

    #[error("failed to write to PTY: {0}")]
    Write(#[source] nix::Error),

    #[error("failed to poll PTY: {0}")]
    Poll(#[source] nix::Error),

    #[error("failed to wait for child: {0}")]
    Wait(#[source] nix::Error),

    #[error("child killed by signal {0}")]
    ChildSignaled(i32),
}

/// Result type for PTY operations
pub type PtyResult<T> = Result<T, PtyError>;

/// Window size reported to the child through the PTY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
    pub pixel_width: u16,
    pub pixel_height: u16,
}

impl WindowSize {
    /// Character cell dimensions only; pixel sizes stay zero
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }

    /// Convert grid dimensions, saturating into the u16 wire type
    pub fn from_grid(rows: usize, cols: usize) -> Self {
        Self::new(
            rows.min(u16::MAX as usize) as u16,
            cols.min(u16::MAX as usize) as u16,
        )
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(24, 80)
    }
}
