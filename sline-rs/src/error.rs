//! Error kinds reported by a line-read session.
//!
//! [`Error`] carries the underlying cause (an [`io::Error`] for stream and
//! terminal failures); [`ErrorKind`] is the plain code a caller can stash and
//! later turn into a fixed human-readable message with
//! [`ErrorKind::message`].

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
    /// The user ended input (EOF byte, or the stream closed between keys).
    /// Not a failure: callers normally just stop reading.
    #[error("end of input")]
    EndOfInput,

    /// Reading input or writing terminal output failed.
    #[error("I/O error: {0}")]
    Stream(#[source] io::Error),

    /// History slots could not be allocated at setup.
    #[error("could not allocate internal memory: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// `tcgetattr` failed.
    #[error("could not read terminal attributes: {0}")]
    TerminalGet(#[source] io::Error),

    /// `tcsetattr` failed, entering or leaving raw mode.
    #[error("could not set terminal attributes: {0}")]
    TerminalSet(#[source] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EndOfInput => ErrorKind::EndOfInput,
            Error::Stream(_) => ErrorKind::StreamFailure,
            Error::OutOfMemory(_) => ErrorKind::OutOfMemory,
            Error::TerminalGet(_) => ErrorKind::TerminalGet,
            Error::TerminalSet(_) => ErrorKind::TerminalSet,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// True for [`Error::EndOfInput`].
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Error::EndOfInput)
    }
}

// ── ErrorKind ─────────────────────────────────────────────────────────────────

/// Copyable error code, remembered by the session as its "last error".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EndOfInput,
    StreamFailure,
    OutOfMemory,
    TerminalGet,
    TerminalSet,
    InvalidConfig,
}

impl ErrorKind {
    /// Short message suitable for `prog: <message>` style reporting.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::EndOfInput => "EOF caught.",
            ErrorKind::StreamFailure => "I/O error.",
            ErrorKind::OutOfMemory => "could not allocate internal memory.",
            ErrorKind::TerminalGet => "could not read attributes.",
            ErrorKind::TerminalSet => "could not set attributes.",
            ErrorKind::InvalidConfig => "invalid configuration.",
        }
    }

    /// Message for an optional last error; `None` reads as unknown.
    pub fn message_for(kind: Option<ErrorKind>) -> &'static str {
        kind.map_or("unknown error.", ErrorKind::message)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
