//! Read-one-line session: wires the decoder, buffer, renderer and history.
//!
//! ## States
//!
//! ```text
//!   Prompting ──▶ Editing ──Enter──▶ Committed
//!                  │  ▲ │
//!        other keys└──┘ ├──EOF────▶ Cancelled
//!                       └──failure▶ Failed
//! ```
//!
//! `Prompting` writes the prompt, resets the buffer (optionally seeded) and
//! points history browsing back at the live line.  In `Editing` each key is
//! applied to the buffer, echoed through the renderer and, for edits that
//! change content, mirrored into the live history slot.  The three end
//! states finish the current [`Session::read_line`] call; the caller calls it
//! again for the next line.
//!
//! A session built with [`Session::setup`] owns the terminal's raw mode and
//! restores it in [`Session::end`] or, failing that, when dropped.

use std::fmt::{self, Write as _};
use std::io::{self, Write};

use crate::buffer::{Edit, LineBuffer};
use crate::config::Config;
use crate::error::{Error, ErrorKind, Result};
use crate::history::History;
use crate::key::{ByteSource, Key, KeyDecoder};
use crate::render::Renderer;
use crate::terminal::{RawMode, TtyInput};
use crate::utf8::floor_boundary;

#[derive(Debug)]
enum State {
    Prompting,
    Editing,
    Committed,
    Cancelled,
    Failed(Error),
}

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Session<S, W> {
    decoder: KeyDecoder<S>,
    renderer: Renderer<W>,
    history: Option<History>,
    prompt: String,
    prompt_size: usize,
    last_error: Option<ErrorKind>,
    raw_mode: Option<RawMode>,
}

impl Session<TtyInput, io::Stdout> {
    /// Start an interactive session on stdin/stdout.
    ///
    /// History is allocated first, then the terminal is put in raw mode.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`], [`Error::OutOfMemory`],
    /// [`Error::TerminalGet`] or [`Error::TerminalSet`].
    pub fn setup(config: Config) -> Result<Self> {
        let input = TtyInput::stdin(config.poll_timeout);
        let mut session = Self::with_io(config, input, io::stdout())?;
        session.raw_mode = Some(RawMode::enter(libc::STDIN_FILENO)?);
        Ok(session)
    }
}

impl<S: ByteSource, W: Write> Session<S, W> {
    /// Build a session over any byte source and writer.  The terminal mode
    /// is left alone.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] or [`Error::OutOfMemory`].
    pub fn with_io(config: Config, source: S, out: W) -> Result<Self> {
        config.validate()?;
        let history = if config.history {
            Some(History::new(config.history_size, config.entry_size)?)
        } else {
            None
        };
        tracing::debug!(
            history = config.history,
            history_size = config.history_size,
            entry_size = config.entry_size,
            "session set up"
        );

        let mut session = Self {
            decoder: KeyDecoder::with_eof_byte(source, config.eof_byte),
            renderer: Renderer::new(out),
            history,
            prompt: String::new(),
            prompt_size: config.prompt_size,
            last_error: None,
            raw_mode: None,
        };
        session.set_prompt(&config.prompt);
        Ok(session)
    }

    // ── Prompt ────────────────────────────────────────────────────────────────

    /// Set the prompt, truncated to fit `prompt_size - 1` bytes.
    ///
    /// Accepts anything displayable, so `format_args!("{n}> ")` works
    /// without an intermediate `String`.
    pub fn set_prompt(&mut self, prompt: impl fmt::Display) {
        self.prompt.clear();
        // Writing into a String cannot fail.
        let _ = write!(self.prompt, "{prompt}");
        let end = floor_boundary(&self.prompt, self.prompt_size - 1);
        self.prompt.truncate(end);
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    // ── Reading ───────────────────────────────────────────────────────────────

    /// Read one line into `line`, optionally pre-filled with `init`.
    ///
    /// Returns the committed text on Enter.
    ///
    /// # Errors
    ///
    /// [`Error::EndOfInput`] when the user ends input, [`Error::Stream`] when
    /// reading or writing fails.  The error's kind is also remembered for
    /// [`Session::last_error`].
    pub fn read_line<'a>(&mut self, line: &'a mut LineBuffer, init: Option<&str>) -> Result<&'a str> {
        match self.run(line, init) {
            Ok(()) => Ok(line.as_str()),
            Err(e) => {
                self.last_error = Some(e.kind());
                Err(e)
            }
        }
    }

    fn run(&mut self, line: &mut LineBuffer, init: Option<&str>) -> Result<()> {
        let mut state = State::Prompting;
        loop {
            tracing::trace!(?state, "session state");
            state = match state {
                State::Prompting => {
                    self.begin(line, init).map_err(Error::Stream)?;
                    State::Editing
                }
                State::Editing => match self.decoder.next_key() {
                    Ok(key) => self.dispatch(key, line).map_err(Error::Stream)?,
                    Err(e) => {
                        tracing::warn!(error = %e, "input stream failed");
                        State::Failed(Error::Stream(e))
                    }
                },
                State::Committed => return Ok(()),
                State::Cancelled => return Err(Error::EndOfInput),
                State::Failed(e) => return Err(e),
            };
        }
    }

    fn begin(&mut self, line: &mut LineBuffer, init: Option<&str>) -> io::Result<()> {
        line.reset(init);
        if let Some(history) = self.history.as_mut() {
            history.record_live(line.as_str());
            history.reset_browse();
        }
        self.renderer.prompt(&self.prompt, line.as_bytes())?;
        self.renderer.flush()
    }

    fn dispatch(&mut self, key: Key, line: &mut LineBuffer) -> io::Result<State> {
        match key {
            Key::Character(cp) => {
                let edit = line.insert(cp);
                self.edited(edit, line)?;
            }
            Key::Backspace => {
                let edit = line.delete_backward();
                self.edited(edit, line)?;
            }
            Key::Delete => {
                let edit = line.delete_forward();
                self.edited(edit, line)?;
            }
            Key::ArrowLeft => self.show(line.move_left(), line)?,
            Key::ArrowRight => self.show(line.move_right(), line)?,
            Key::Home => self.show(line.move_home(), line)?,
            Key::End => self.show(line.move_end(), line)?,
            Key::ArrowUp => self.recall(line, true)?,
            Key::ArrowDown => self.recall(line, false)?,
            Key::Enter => {
                self.renderer.newline()?;
                self.renderer.flush()?;
                if let Some(history) = self.history.as_mut() {
                    history.commit(line.as_str());
                }
                return Ok(State::Committed);
            }
            Key::EndOfInput => {
                self.renderer.newline()?;
                self.renderer.flush()?;
                return Ok(State::Cancelled);
            }
            Key::Ignored => {}
        }
        self.renderer.flush()?;
        Ok(State::Editing)
    }

    /// Content-changing key: mirror into history and redraw.
    fn edited(&mut self, edit: Option<Edit>, line: &LineBuffer) -> io::Result<()> {
        if let Some(history) = self.history.as_mut() {
            if edit.is_some() {
                history.record_live(line.as_str());
            }
            history.reset_browse();
        }
        self.show(edit, line)
    }

    fn show(&mut self, edit: Option<Edit>, line: &LineBuffer) -> io::Result<()> {
        match edit {
            Some(edit) => self.renderer.apply(edit, line),
            None => Ok(()),
        }
    }

    fn recall(&mut self, line: &mut LineBuffer, older: bool) -> io::Result<()> {
        let Some(history) = self.history.as_mut() else {
            return Ok(());
        };
        let entry = if older {
            history.navigate_up()
        } else {
            history.navigate_down()
        };
        match entry {
            Some(text) => {
                let edit = line.replace(text);
                self.renderer.apply(edit, line)
            }
            None => Ok(()),
        }
    }

    // ── History access ────────────────────────────────────────────────────────

    /// History entry at `index` (`0` is the oldest kept line).
    pub fn history_get(&self, index: usize) -> Option<&str> {
        self.history.as_ref()?.get(index)
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    // ── Errors ────────────────────────────────────────────────────────────────

    /// Kind of the most recent failed [`Session::read_line`].  Not cleared
    /// by later successful reads.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    /// Human-readable message for [`Session::last_error`].
    pub fn error_message(&self) -> &'static str {
        ErrorKind::message_for(self.last_error)
    }

    // ── Output / teardown ─────────────────────────────────────────────────────

    pub fn output(&self) -> &W {
        self.renderer.get_ref()
    }

    /// Flush output and restore the terminal mode, if this session owns it.
    ///
    /// # Errors
    ///
    /// [`Error::TerminalSet`] if the saved attributes cannot be put back;
    /// [`Error::Stream`] if the final flush fails.
    pub fn end(mut self) -> Result<()> {
        let flushed = self.renderer.flush().map_err(Error::Stream);
        if let Some(raw_mode) = self.raw_mode.take() {
            raw_mode.restore()?;
        }
        tracing::debug!("session ended");
        flushed
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ReaderSource;
    use pretty_assertions::assert_eq;

    type TestSession<'a> = Session<ReaderSource<&'a [u8]>, Vec<u8>>;

    fn session(input: &[u8]) -> TestSession<'_> {
        Session::with_io(Config::default(), ReaderSource::new(input), Vec::new()).unwrap()
    }

    fn output(s: &TestSession<'_>) -> String {
        String::from_utf8_lossy(s.output()).into_owned()
    }

    #[test]
    fn enter_commits_line() {
        let mut s = session(b"hi\n");
        let mut line = LineBuffer::new(32);
        assert_eq!(s.read_line(&mut line, None).unwrap(), "hi");
        assert_eq!(s.history_get(0), Some("hi"));
        assert_eq!(output(&s), "> h\x1b[K\x1b7\x1b8i\x1b[K\x1b7\x1b8\r\n");
    }

    #[test]
    fn eof_cancels_and_sets_last_error() {
        let mut s = session(b"ab\x04");
        let mut line = LineBuffer::new(32);
        let err = s.read_line(&mut line, None).unwrap_err();
        assert!(err.is_end_of_input());
        assert_eq!(s.last_error(), Some(ErrorKind::EndOfInput));
        assert_eq!(s.error_message(), "EOF caught.");
        // Nothing committed, but the draft sits in the live slot.
        assert_eq!(s.history().unwrap().len(), 0);
        assert_eq!(s.history_get(0), Some("ab"));
    }

    #[test]
    fn closed_stream_cancels() {
        let mut s = session(b"");
        let mut line = LineBuffer::new(8);
        assert!(matches!(s.read_line(&mut line, None), Err(Error::EndOfInput)));
    }

    #[test]
    fn seeded_line_is_editable() {
        let mut s = session(b"\x7f!\n");
        let mut line = LineBuffer::new(32);
        assert_eq!(s.read_line(&mut line, Some("hey")).unwrap(), "he!");
        assert!(output(&s).starts_with("> hey"));
    }

    #[test]
    fn prompt_truncated_to_prompt_size() {
        let config = Config::default().with_prompt_size(4);
        let mut s: TestSession<'_> =
            Session::with_io(config, ReaderSource::new(&b""[..]), Vec::new()).unwrap();
        assert_eq!(s.prompt(), "> ");
        s.set_prompt(format_args!("{}> ", 1234));
        assert_eq!(s.prompt(), "123");
    }

    #[test]
    fn history_disabled_ignores_arrows() {
        let config = Config::default().with_history(false);
        let mut s: TestSession<'_> =
            Session::with_io(config, ReaderSource::new(&b"a\n\x1b[Ab\n"[..]), Vec::new())
                .unwrap();
        let mut line = LineBuffer::new(16);
        assert_eq!(s.read_line(&mut line, None).unwrap(), "a");
        assert_eq!(s.read_line(&mut line, None).unwrap(), "b");
        assert!(s.history().is_none());
        assert_eq!(s.history_get(0), None);
    }

    #[test]
    fn error_message_without_error() {
        let s = session(b"");
        assert_eq!(s.last_error(), None);
        assert_eq!(s.error_message(), "unknown error.");
    }

    #[test]
    fn invalid_config_rejected() {
        let config = Config::default().with_prompt_size(0);
        let r: Result<TestSession<'_>> =
            Session::with_io(config, ReaderSource::new(&b""[..]), Vec::new());
        assert!(matches!(r, Err(Error::InvalidConfig(_))));
    }
}
