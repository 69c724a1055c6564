//! `sline`: a small line editor for VT100-compatible terminals.
//!
//! Reads keystrokes from a terminal in non-canonical mode and hands back one
//! finished line of UTF-8 text per call, with in-place editing (insert,
//! backspace, delete, cursor motion, Home/End) and Up/Down recall of earlier
//! lines.
//!
//! ```no_run
//! use sline::{Config, LineBuffer, Session};
//!
//! let mut session = Session::setup(Config::default())?;
//! let mut line = LineBuffer::new(64);
//! for n in 0.. {
//!     session.set_prompt(format_args!("{n}> "));
//!     match session.read_line(&mut line, None) {
//!         Ok(text) => println!("Input was: {text}"),
//!         Err(_) => break,
//!     }
//! }
//! session.end()?;
//! # Ok::<(), sline::Error>(())
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod history;
pub mod key;
pub mod render;
pub mod session;
pub mod terminal;
pub mod utf8;

pub use buffer::{Edit, LineBuffer};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use history::History;
pub use key::{ByteSource, Codepoint, Key, KeyDecoder, Polled, ReaderSource};
pub use render::Renderer;
pub use session::Session;
pub use terminal::{RawMode, TtyInput};

/// Library version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
