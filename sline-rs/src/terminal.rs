//! Terminal plumbing: raw (non-canonical) mode and polled byte input.
//!
//! [`RawMode`] saves the terminal attributes of a file descriptor, switches
//! off canonical line input and echo, and puts the saved attributes back when
//! it is restored or dropped, so every exit path leaves the terminal as it was
//! found.
//!
//! termios is set through `libc` rather than crossterm's
//! `enable_raw_mode`: that one applies `cfmakeraw`, which also turns off
//! `ISIG` and output post-processing, while this editor clears only `ICANON`
//! and `ECHO` and needs `VMIN = 0` / `VTIME = 1` for timed reads.
//!
//! [`TtyInput`] is the [`ByteSource`] for a real terminal: each poll waits at
//! most the configured timeout, so a blocked read still wakes up regularly.

use std::fmt;
use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::key::{ByteSource, Polled};

/// True if `fd` refers to a terminal.
pub fn is_tty(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) != 0 }
}

// ── RawMode ───────────────────────────────────────────────────────────────────

/// Scoped raw-mode guard.  Restores the saved attributes on drop.
pub struct RawMode {
    fd: RawFd,
    saved: Option<libc::termios>,
}

impl RawMode {
    /// Save the attributes of `fd` and switch it to non-canonical, no-echo
    /// input with a 100 ms read timeout (`VMIN = 0`, `VTIME = 1`).
    ///
    /// # Errors
    ///
    /// [`Error::TerminalGet`] if the attributes cannot be read (e.g. `fd` is
    /// not a terminal), [`Error::TerminalSet`] if they cannot be applied.
    pub fn enter(fd: RawFd) -> Result<Self> {
        let mut saved: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut saved) } < 0 {
            return Err(Error::TerminalGet(io::Error::last_os_error()));
        }

        let mut raw = saved;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO);
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 1;
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw) } < 0 {
            return Err(Error::TerminalSet(io::Error::last_os_error()));
        }

        tracing::debug!(fd, "entered raw mode");
        Ok(Self {
            fd,
            saved: Some(saved),
        })
    }

    /// Put the saved attributes back, reporting failure.
    pub fn restore(mut self) -> Result<()> {
        self.restore_saved()
    }

    fn restore_saved(&mut self) -> Result<()> {
        let Some(saved) = self.saved.take() else {
            return Ok(());
        };
        if unsafe { libc::tcsetattr(self.fd, libc::TCSAFLUSH, &saved) } < 0 {
            return Err(Error::TerminalSet(io::Error::last_os_error()));
        }
        tracing::debug!(fd = self.fd, "left raw mode");
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore_saved() {
            tracing::warn!(error = %e, "could not restore terminal attributes");
        }
    }
}

impl fmt::Debug for RawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawMode")
            .field("fd", &self.fd)
            .field("active", &self.saved.is_some())
            .finish()
    }
}

// ── TtyInput ──────────────────────────────────────────────────────────────────

/// Polled single-byte reader over a file descriptor.
#[derive(Debug, Clone)]
pub struct TtyInput {
    fd: RawFd,
    timeout: Duration,
}

impl TtyInput {
    pub fn new(fd: RawFd, timeout: Duration) -> Self {
        Self { fd, timeout }
    }

    /// Standard input.
    pub fn stdin(timeout: Duration) -> Self {
        Self::new(libc::STDIN_FILENO, timeout)
    }

    fn timeout_ms(&self) -> libc::c_int {
        libc::c_int::try_from(self.timeout.as_millis()).unwrap_or(libc::c_int::MAX)
    }
}

impl ByteSource for TtyInput {
    fn poll_byte(&mut self) -> io::Result<Polled> {
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&mut pfd, 1, self.timeout_ms()) };
        if ready < 0 {
            return pending_or_err(io::Error::last_os_error());
        }
        if ready == 0 {
            return Ok(Polled::Pending);
        }

        let mut byte = 0u8;
        let n = unsafe { libc::read(self.fd, (&mut byte as *mut u8).cast(), 1) };
        match n {
            1 => Ok(Polled::Byte(byte)),
            0 => Ok(Polled::Closed),
            _ => pending_or_err(io::Error::last_os_error()),
        }
    }
}

fn pending_or_err(e: io::Error) -> io::Result<Polled> {
    match e.kind() {
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(Polled::Pending),
        _ => Err(e),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
