//! PTY integration tests
//!
//! End-to-end runs with real child processes: spawn something on a PTY,
//! pump its output through the emulator, check the grid. These depend
//! on /bin/echo and /bin/sh existing, which holds on any Linux box this
//! crate targets.

use std::time::{Duration, Instant};

use dango_terminal::pty::{Pty, WindowSize, DEFAULT_TERM};
use dango_terminal::Terminal;

/// Read whatever the child produces within the deadline
fn read_pty_output(pty: &Pty, timeout_ms: u64) -> Vec<u8> {
    let mut output = Vec::new();
    let mut buf = [0u8; 4096];
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);

    while Instant::now() < deadline {
        if pty.poll_read(50).unwrap_or(false) {
            match pty.read(&mut buf) {
                Ok(0) => {}
                Ok(n) => output.extend_from_slice(&buf[..n]),
                Err(_) => break,
            }
        }
    }
    output
}

#[test]
fn test_echo_output_lands_on_row_zero() {
    let mut pty = Pty::spawn(
        "/bin/echo",
        &["hello from the pty"],
        WindowSize::new(24, 80),
        DEFAULT_TERM,
    )
    .expect("spawn echo");

    let output = read_pty_output(&pty, 2000);
    assert!(!output.is_empty(), "echo produced no output");

    let mut term = Terminal::new(24, 80);
    term.process(&output);
    assert_eq!(term.state().row_text(0), "hello from the pty");

    let _ = pty.wait();
}

#[test]
fn test_shell_command_roundtrip() {
    let pty = Pty::spawn(
        "/bin/sh",
        &["-c", "printf 'one\\ntwo\\n'"],
        WindowSize::new(24, 80),
        DEFAULT_TERM,
    )
    .expect("spawn sh");

    let output = read_pty_output(&pty, 2000);
    let mut term = Terminal::new(24, 80);
    term.process(&output);

    assert_eq!(term.state().row_text(0), "one");
    assert_eq!(term.state().row_text(1), "two");
}

#[test]
fn test_interactive_shell_write_then_read() {
    let pty = Pty::spawn("/bin/sh", &[], WindowSize::new(24, 80), DEFAULT_TERM)
        .expect("spawn sh");

    // Let the shell start and emit any prompt before we type
    let _ = read_pty_output(&pty, 300);

    pty.write_all(b"echo marker_$((40+2))\n").expect("write command");
    let output = read_pty_output(&pty, 2000);
    let text = String::from_utf8_lossy(&output);
    assert!(
        text.contains("marker_42"),
        "expected command output, got: {:?}",
        text
    );

    pty.write_all(b"exit\n").expect("write exit");
}

#[test]
fn test_escape_sequences_from_child_drive_the_grid() {
    let pty = Pty::spawn(
        "/bin/sh",
        &["-c", r"printf '\033[2J\033[3;5Hplaced'"],
        WindowSize::new(24, 80),
        DEFAULT_TERM,
    )
    .expect("spawn sh");

    let output = read_pty_output(&pty, 2000);
    let mut term = Terminal::new(24, 80);
    term.process(&output);

    assert_eq!(term.state().grid().cell(2, 4).ch, Some('p'));
    assert_eq!(term.state().row_text(2), "    placed");
}

#[test]
fn test_resize_reaches_the_child() {
    let pty = Pty::spawn("/bin/sh", &[], WindowSize::new(24, 80), DEFAULT_TERM)
        .expect("spawn sh");

    pty.resize(WindowSize::new(40, 132)).expect("resize");
    let size = pty.window_size().expect("query size");
    assert_eq!((size.rows, size.cols), (40, 132));
}

#[test]
fn test_child_exit_observed() {
    let mut pty = Pty::spawn("/bin/sh", &["-c", "exit 7"], WindowSize::new(24, 80), DEFAULT_TERM)
        .expect("spawn sh");

    assert_eq!(pty.wait().expect("wait"), 7);
    assert!(!pty.is_alive());
}
