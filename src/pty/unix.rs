//! Unix PTY implementation
//!
//! PTY creation and child process management through POSIX APIs. The
//! master side is switched to non-blocking so session loops can drain
//! it fully after each poll wakeup.

use std::ffi::CString;
use std::os::fd::BorrowedFd;
use std::os::unix::io::{AsRawFd, RawFd};

use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::poll::{poll, PollFd, PollFlags};
use nix::pty::{grantpt, posix_openpt, ptsname, unlockpt, PtyMaster};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, execvp, fork, read, setsid, write, ForkResult, Pid};

use super::{PtyError, PtyResult, WindowSize};

/// TERM value used when no configuration overrides it
pub const DEFAULT_TERM: &str = "xterm-256color";

/// A pseudoterminal with a spawned child process
pub struct Pty {
    /// The PTY master file descriptor
    master: PtyMaster,
    child_pid: Pid,
    child_alive: bool,
}

impl Pty {
    /// Open a PTY pair, fork, and exec `command` on the child side.
    ///
    /// The child gets a fresh session with the PTY as its controlling
    /// terminal and `TERM` set to `term`. The master side is returned
    /// non-blocking.
    pub fn spawn(command: &str, args: &[&str], size: WindowSize, term: &str) -> PtyResult<Self> {
        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).map_err(PtyError::OpenMaster)?;
        grantpt(&master).map_err(PtyError::GrantPty)?;
        unlockpt(&master).map_err(PtyError::UnlockPty)?;

        // SAFETY: ptsname is not thread-safe, but we call it right after
        // unlockpt with no other thread touching PTY state
        let child_path = unsafe { ptsname(&master) }.map_err(PtyError::PtsName)?;

        set_window_size(master.as_raw_fd(), size)?;

        // Converted before the fork so an embedded NUL fails in the parent
        let command_cstr =
            CString::new(command).map_err(|_| PtyError::Exec(nix::errno::Errno::EINVAL))?;
        let mut argv: Vec<CString> = Vec::with_capacity(args.len() + 1);
        argv.push(command_cstr.clone());
        for arg in args {
            argv.push(CString::new(*arg).map_err(|_| PtyError::Exec(nix::errno::Errno::EINVAL))?);
        }

        // SAFETY: the child only calls async-signal-safe-ish setup before exec
        match unsafe { fork() }.map_err(PtyError::Fork)? {
            ForkResult::Child => {
                drop(master);

                setsid().map_err(PtyError::Setsid)?;

                // Opening the PTY child side after setsid makes it the
                // controlling terminal
                let child_fd = open(child_path.as_str(), OFlag::O_RDWR, Mode::empty())
                    .map_err(PtyError::OpenChild)?;

                // SAFETY: TIOCSCTTY on the fd we just opened
                unsafe {
                    if libc::ioctl(child_fd, libc::TIOCSCTTY as _, 0) < 0 {
                        // Non-fatal on systems where open already did it
                        tracing::debug!("TIOCSCTTY failed");
                    }
                }

                dup2(child_fd, STDIN_FILENO).map_err(PtyError::Dup2)?;
                dup2(child_fd, STDOUT_FILENO).map_err(PtyError::Dup2)?;
                dup2(child_fd, STDERR_FILENO).map_err(PtyError::Dup2)?;
                if child_fd > STDERR_FILENO {
                    let _ = close(child_fd);
                }

                std::env::set_var("TERM", term);

                execvp(&command_cstr, &argv).map_err(PtyError::Exec)?;
                // execvp only returns on error
                unreachable!()
            }
            ForkResult::Parent { child } => {
                let flags = fcntl(master.as_raw_fd(), FcntlArg::F_GETFL)
                    .map_err(PtyError::SetNonBlocking)?;
                let flags = OFlag::from_bits_truncate(flags);
                fcntl(
                    master.as_raw_fd(),
                    FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK),
                )
                .map_err(PtyError::SetNonBlocking)?;

                Ok(Pty {
                    master,
                    child_pid: child,
                    child_alive: true,
                })
            }
        }
    }

    /// Spawn the user's shell from `$SHELL`, falling back to `/bin/sh`
    pub fn spawn_shell(size: WindowSize) -> PtyResult<Self> {
        let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
        Self::spawn(&shell, &[], size, DEFAULT_TERM)
    }

    /// Raw file descriptor of the master side, for poll sets
    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    /// Check whether the child is still running, reaping it if not
    pub fn is_alive(&mut self) -> bool {
        if !self.child_alive {
            return false;
        }
        match waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => true,
            Ok(_) | Err(_) => {
                self.child_alive = false;
                false
            }
        }
    }

    /// Block until the child exits and return its exit code
    pub fn wait(&mut self) -> PtyResult<i32> {
        if !self.child_alive {
            return Ok(0);
        }
        match waitpid(self.child_pid, None).map_err(PtyError::Wait)? {
            WaitStatus::Exited(_, code) => {
                self.child_alive = false;
                Ok(code)
            }
            WaitStatus::Signaled(_, signal, _) => {
                self.child_alive = false;
                Err(PtyError::ChildSignaled(signal as i32))
            }
            _ => Ok(0),
        }
    }

    /// Non-blocking read from the master. Returns 0 when no data is
    /// available right now.
    pub fn read(&self, buf: &mut [u8]) -> PtyResult<usize> {
        match read(self.master.as_raw_fd(), buf) {
            Ok(n) => Ok(n),
            // EAGAIN and EWOULDBLOCK share a value on Linux
            Err(nix::errno::Errno::EAGAIN) => Ok(0),
            Err(e) => Err(PtyError::Read(e)),
        }
    }

    /// Write to the master, returning the number of bytes accepted
    pub fn write(&self, data: &[u8]) -> PtyResult<usize> {
        write(self.master.as_raw_fd(), data).map_err(PtyError::Write)
    }

    /// Write the whole buffer, retrying short writes
    pub fn write_all(&self, mut data: &[u8]) -> PtyResult<()> {
        while !data.is_empty() {
            let n = self.write(data)?;
            data = &data[n..];
        }
        Ok(())
    }

    /// Wait up to `timeout_ms` for readable data on the master
    pub fn poll_read(&self, timeout_ms: i32) -> PtyResult<bool> {
        // SAFETY: the master fd lives as long as self
        let borrowed_fd = unsafe { BorrowedFd::borrow_raw(self.master.as_raw_fd()) };
        let mut fds = [PollFd::new(&borrowed_fd, PollFlags::POLLIN)];
        let n = poll(&mut fds, timeout_ms).map_err(PtyError::Poll)?;
        Ok(n > 0
            && fds[0]
                .revents()
                .is_some_and(|r| r.contains(PollFlags::POLLIN)))
    }

    /// Push a new window size to the child
    pub fn resize(&self, size: WindowSize) -> PtyResult<()> {
        set_window_size(self.master.as_raw_fd(), size)
    }

    /// Read back the current window size of the PTY
    pub fn window_size(&self) -> PtyResult<WindowSize> {
        query_window_size(self.master.as_raw_fd())
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        // Best-effort reap so the child doesn't linger as a zombie
        if self.child_alive {
            let _ = waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG));
        }
    }
}

fn set_window_size(fd: RawFd, size: WindowSize) -> PtyResult<()> {
    let winsize = libc::winsize {
        ws_row: size.rows,
        ws_col: size.cols,
        ws_xpixel: size.pixel_width,
        ws_ypixel: size.pixel_height,
    };

    // SAFETY: TIOCSWINSZ with a valid winsize pointer
    let result = unsafe { libc::ioctl(fd, libc::TIOCSWINSZ, &winsize) };
    if result < 0 {
        Err(PtyError::Winsize(nix::errno::Errno::last()))
    } else {
        Ok(())
    }
}

/// Query the window size of any terminal file descriptor
pub fn query_window_size(fd: RawFd) -> PtyResult<WindowSize> {
    let mut winsize = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ with a valid winsize pointer
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut winsize) };
    if result < 0 {
        Err(PtyError::Winsize(nix::errno::Errno::last()))
    } else {
        Ok(WindowSize {
            rows: winsize.ws_row,
            cols: winsize.ws_col,
            pixel_width: winsize.ws_xpixel,
            pixel_height: winsize.ws_ypixel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size_from_grid() {
        let size = WindowSize::from_grid(24, 80);
        assert_eq!(size.rows, 24);
        assert_eq!(size.cols, 80);
        assert_eq!(size.pixel_width, 0);

        let huge = WindowSize::from_grid(100_000, 80);
        assert_eq!(huge.rows, u16::MAX);
    }

    #[test]
    fn test_spawn_echo() {
        let mut pty = Pty::spawn("/bin/echo", &["hello"], WindowSize::default(), DEFAULT_TERM)
            .expect("failed to spawn");

        std::thread::sleep(std::time::Duration::from_millis(100));

        let mut buf = [0u8; 1024];
        let n = pty.read(&mut buf).expect("failed to read");
        let output = String::from_utf8_lossy(&buf[..n]);
        assert!(
            output.contains("hello") || n == 0,
            "unexpected output: {}",
            output
        );

        let _ = pty.wait();
        assert!(!pty.is_alive());
    }

    #[test]
    fn test_write_read_roundtrip() {
        let pty = Pty::spawn("/bin/cat", &[], WindowSize::default(), DEFAULT_TERM)
            .expect("failed to spawn");

        pty.write_all(b"test\n").expect("failed to write");
        std::thread::sleep(std::time::Duration::from_millis(100));

        let mut buf = [0u8; 1024];
        let n = pty.read(&mut buf).expect("failed to read");
        let output = String::from_utf8_lossy(&buf[..n]);
        assert!(
            output.contains("test") || n == 0,
            "unexpected output: {}",
            output
        );
    }

    #[test]
    fn test_resize_roundtrip() {
        let pty = Pty::spawn("/bin/sh", &[], WindowSize::new(24, 80), DEFAULT_TERM)
            .expect("failed to spawn");

        pty.resize(WindowSize::new(40, 120)).expect("failed to resize");

        let size = pty.window_size().expect("failed to query size");
        assert_eq!(size.rows, 40);
        assert_eq!(size.cols, 120);
    }

    #[test]
    fn test_poll_sees_output() {
        let pty = Pty::spawn("/bin/echo", &["poll"], WindowSize::default(), DEFAULT_TERM)
            .expect("failed to spawn");

        let mut found_data = false;
        for _ in 0..10 {
            if pty.poll_read(100).expect("failed to poll") {
                found_data = true;
                break;
            }
        }
        assert!(found_data, "no readable data within the deadline");
    }
}
