//! Interactive terminal session
//!
//! Runs a shell inside the emulator while relaying raw bytes to the
//! hosting terminal. The grid is maintained from everything the child
//! writes, so the emulator state always matches what the host shows.
//! One poll(2) watches stdin and the PTY master; whichever is ready is
//! drained fully before the next wait.

use std::io::{self, Read, Write};
use std::os::fd::BorrowedFd;
use std::os::unix::io::AsRawFd;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::poll::{poll, PollFd, PollFlags};
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::termios::{self, LocalFlags, SetArg, SpecialCharacterIndices, Termios};

use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dango_terminal::config::Config;
use dango_terminal::pty::{query_window_size, Pty, WindowSize, DEFAULT_TERM};
use dango_terminal::Terminal;

/// Set by the SIGWINCH handler, drained by the session loop
static WINDOW_RESIZED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigwinch(_: i32) {
    WINDOW_RESIZED.store(true, Ordering::SeqCst);
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run() {
        Ok(code) => {
            if code == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(code.clamp(0, 255) as u8)
            }
        }
        Err(e) => {
            error!(error = %e, "session failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> io::Result<i32> {
    let config = Config::load_or_default();
    info!(rows = config.rows, cols = config.cols, "starting session");

    let size = WindowSize::from_grid(config.rows, config.cols);
    let shell = config
        .shell
        .clone()
        .or_else(|| std::env::var("SHELL").ok())
        .unwrap_or_else(|| "/bin/sh".to_string());
    let term_name = if config.term.is_empty() {
        DEFAULT_TERM
    } else {
        &config.term
    };
    let mut pty = Pty::spawn(&shell, &[], size, term_name).map_err(io::Error::other)?;

    let mut terminal = Terminal::new(config.rows, config.cols);

    let _raw = RawModeGuard::new()?;

    // SAFETY: the handler only stores to an atomic
    let action = signal::SigAction::new(
        SigHandler::Handler(handle_sigwinch),
        signal::SaFlags::SA_RESTART,
        signal::SigSet::empty(),
    );
    unsafe { signal::sigaction(Signal::SIGWINCH, &action) }.map_err(io::Error::other)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut stdin_buf = [0u8; 4096];
    let mut pty_buf = [0u8; 65536];

    loop {
        if WINDOW_RESIZED.swap(false, Ordering::SeqCst) {
            // Forward the host size to the child; the grid keeps its
            // configured dimensions
            if let Ok(host) = query_window_size(stdout.as_raw_fd()) {
                debug!(rows = host.rows, cols = host.cols, "forwarding window size");
                let _ = pty.resize(host);
            }
        }

        // SAFETY: both fds outlive the poll call
        let stdin_fd = unsafe { BorrowedFd::borrow_raw(stdin.as_raw_fd()) };
        let master_fd = unsafe { BorrowedFd::borrow_raw(pty.master_fd()) };
        let mut fds = [
            PollFd::new(&stdin_fd, PollFlags::POLLIN),
            PollFd::new(&master_fd, PollFlags::POLLIN),
        ];

        match poll(&mut fds, 100) {
            Ok(_) => {}
            // A signal (SIGWINCH, typically) interrupted the wait
            Err(nix::errno::Errno::EINTR) => continue,
            Err(e) => return Err(io::Error::other(e)),
        }

        let stdin_ready = fds[0]
            .revents()
            .is_some_and(|r| r.intersects(PollFlags::POLLIN));
        let pty_ready = fds[1]
            .revents()
            .is_some_and(|r| r.intersects(PollFlags::POLLIN | PollFlags::POLLHUP));

        if stdin_ready {
            let n = stdin.lock().read(&mut stdin_buf)?;
            if n == 0 {
                break;
            }
            pty.write_all(&stdin_buf[..n]).map_err(io::Error::other)?;
        }

        if pty_ready {
            // Drain fully: the master is non-blocking, so read until it
            // reports empty
            let mut drained_any = false;
            loop {
                match pty.read(&mut pty_buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        terminal.process(&pty_buf[..n]);
                        stdout.write_all(&pty_buf[..n])?;
                        stdout.flush()?;
                        drained_any = true;
                    }
                    Err(e) => {
                        debug!(error = %e, "master read failed, child likely gone");
                        break;
                    }
                }
            }
            if terminal.take_bell() {
                stdout.write_all(b"\x07")?;
                stdout.flush()?;
            }
            // A wakeup with nothing left to read means the child hung up
            if !drained_any && !pty.is_alive() {
                break;
            }
        } else if !pty.is_alive() {
            break;
        }
    }

    let code = pty.wait().unwrap_or(0);
    info!(code, "child exited");
    Ok(code)
}

/// Puts stdin into raw mode for the lifetime of the value
struct RawModeGuard {
    original: Termios,
}

impl RawModeGuard {
    fn new() -> io::Result<Self> {
        let original = termios::tcgetattr(io::stdin()).map_err(io::Error::other)?;

        let mut raw = original.clone();
        raw.local_flags.remove(
            LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::ISIG | LocalFlags::IEXTEN,
        );
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;

        termios::tcsetattr(io::stdin(), SetArg::TCSANOW, &raw).map_err(io::Error::other)?;
        Ok(Self { original })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = termios::tcsetattr(io::stdin(), SetArg::TCSANOW, &self.original);
    }
}
