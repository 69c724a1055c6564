//! Key decoding: raw input bytes → one [`Key`] per call.
//!
//! ## Byte sequences
//!
//! | Bytes | Key |
//! |-------|-----|
//! | `ESC [ A` / `B` / `C` / `D` | [`Key::ArrowUp`] / [`Key::ArrowDown`] / [`Key::ArrowRight`] / [`Key::ArrowLeft`] |
//! | `ESC [ H`, `ESC [ 1 ~`, `ESC [ 7 ~` | [`Key::Home`] |
//! | `ESC [ F`, `ESC [ 4 ~`, `ESC [ 8 ~` | [`Key::End`] |
//! | `ESC [ 3 ~` | [`Key::Delete`] |
//! | `0x7F` | [`Key::Backspace`] |
//! | EOF byte (default `0x04`, Ctrl-D) | [`Key::EndOfInput`] |
//! | `0x0A`, `0x0D` | [`Key::Enter`] |
//! | UTF-8 codepoint | [`Key::Character`] |
//!
//! Anything else (unknown or truncated escape sequences, Tab, other control
//! bytes, malformed UTF-8) decodes to [`Key::Ignored`].  Malformed input is
//! never an error.
//!
//! Input arrives through a [`ByteSource`], which separates "nothing yet"
//! ([`Polled::Pending`]) from "stream closed" ([`Polled::Closed`]) and from
//! real read failures (`Err`).

use std::fmt;
use std::io::{self, Read};

use crate::utf8::forward_width;

const ESC: u8 = 0x1B;
const BACKSPACE: u8 = 0x7F;
const TAB: u8 = 0x09;

/// Default byte that ends input (Ctrl-D).
pub const DEFAULT_EOF_BYTE: u8 = 0x04;

// ── Codepoint ─────────────────────────────────────────────────────────────────

/// One UTF-8 encoded codepoint stored inline (1–4 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Codepoint {
    bytes: [u8; 4],
    len: u8,
}

impl Codepoint {
    pub fn from_char(ch: char) -> Self {
        let mut bytes = [0u8; 4];
        let len = ch.encode_utf8(&mut bytes).len() as u8;
        Self { bytes, len }
    }

    /// Build from raw bytes, returning `None` unless they are exactly one
    /// valid UTF-8 codepoint.
    pub fn from_bytes(raw: &[u8]) -> Option<Self> {
        let s = std::str::from_utf8(raw).ok()?;
        let mut chars = s.chars();
        let ch = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self::from_char(ch))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Encoded length in bytes.
    pub fn width(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for Codepoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

// ── Key ───────────────────────────────────────────────────────────────────────

/// A decoded keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Character(Codepoint),
    Backspace,
    Delete,
    Enter,
    EndOfInput,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Ignored,
}

impl Key {
    /// Shorthand for `Key::Character(Codepoint::from_char(ch))`.
    pub fn char(ch: char) -> Self {
        Key::Character(Codepoint::from_char(ch))
    }
}

// ── ByteSource ────────────────────────────────────────────────────────────────

/// Outcome of one bounded wait for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polled {
    Byte(u8),
    /// No byte arrived within the wait; try again.
    Pending,
    /// The stream has ended.
    Closed,
}

/// Where the decoder gets its bytes from.
///
/// `poll_byte` should block for at most a short, bounded interval so that a
/// caller blocked in [`KeyDecoder::next_key`] still wakes up regularly.
pub trait ByteSource {
    fn poll_byte(&mut self) -> io::Result<Polled>;
}

impl<B: ByteSource + ?Sized> ByteSource for &mut B {
    fn poll_byte(&mut self) -> io::Result<Polled> {
        (**self).poll_byte()
    }
}

/// [`ByteSource`] over any [`Read`] implementation (pipes, files, byte
/// slices in tests).
///
/// A zero-length read is end of stream; `Interrupted` and `WouldBlock` are
/// reported as [`Polled::Pending`].
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn poll_byte(&mut self) -> io::Result<Polled> {
        let mut byte = [0u8; 1];
        match self.inner.read(&mut byte) {
            Ok(0) => Ok(Polled::Closed),
            Ok(_) => Ok(Polled::Byte(byte[0])),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                ) =>
            {
                Ok(Polled::Pending)
            }
            Err(e) => Err(e),
        }
    }
}

// ── KeyDecoder ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    /// Saw `ESC`; up to three more bytes resolve the sequence.
    InEscape,
}

/// Pulls bytes from a [`ByteSource`] and turns them into [`Key`]s.
#[derive(Debug)]
pub struct KeyDecoder<S> {
    source: S,
    eof_byte: u8,
    state: State,
}

impl<S: ByteSource> KeyDecoder<S> {
    pub fn new(source: S) -> Self {
        Self::with_eof_byte(source, DEFAULT_EOF_BYTE)
    }

    pub fn with_eof_byte(source: S, eof_byte: u8) -> Self {
        Self {
            source,
            eof_byte,
            state: State::Idle,
        }
    }

    /// Block until one key is decoded.
    ///
    /// Waiting for the first byte of a key retries through
    /// [`Polled::Pending`]; a closed stream at that point is
    /// [`Key::EndOfInput`].  An `Err` is returned only when the first read
    /// itself fails.
    pub fn next_key(&mut self) -> io::Result<Key> {
        loop {
            match self.state {
                State::Idle => {
                    let byte = match self.wait_byte()? {
                        Some(b) => b,
                        None => return Ok(Key::EndOfInput),
                    };
                    if byte == ESC {
                        self.state = State::InEscape;
                        continue;
                    }
                    let key = self.decode_plain(byte);
                    tracing::trace!(byte, ?key, "decoded key");
                    return Ok(key);
                }
                State::InEscape => {
                    self.state = State::Idle;
                    let key = self.decode_escape();
                    tracing::trace!(?key, "decoded escape sequence");
                    return Ok(key);
                }
            }
        }
    }

    // ── Internal ──────────────────────────────────────────────────────────────

    /// First byte of a key: retry until a byte, end of stream, or failure.
    fn wait_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.source.poll_byte()? {
                Polled::Byte(b) => return Ok(Some(b)),
                Polled::Pending => continue,
                Polled::Closed => return Ok(None),
            }
        }
    }

    /// A byte inside a multi-byte unit: one bounded attempt only.
    fn follow_byte(&mut self) -> Option<u8> {
        match self.source.poll_byte() {
            Ok(Polled::Byte(b)) => Some(b),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "read failed inside a key sequence");
                None
            }
        }
    }

    fn decode_escape(&mut self) -> Key {
        if self.follow_byte() != Some(b'[') {
            return Key::Ignored;
        }
        let Some(code) = self.follow_byte() else {
            return Key::Ignored;
        };
        match code {
            b'A' => Key::ArrowUp,
            b'B' => Key::ArrowDown,
            b'C' => Key::ArrowRight,
            b'D' => Key::ArrowLeft,
            b'H' => Key::Home,
            b'F' => Key::End,
            b'0'..=b'9' => {
                if self.follow_byte() != Some(b'~') {
                    return Key::Ignored;
                }
                match code {
                    b'3' => Key::Delete,
                    b'1' | b'7' => Key::Home,
                    b'4' | b'8' => Key::End,
                    _ => Key::Ignored,
                }
            }
            _ => Key::Ignored,
        }
    }

    fn decode_plain(&mut self, byte: u8) -> Key {
        match byte {
            BACKSPACE => Key::Backspace,
            b if b == self.eof_byte => Key::EndOfInput,
            b'\n' | b'\r' => Key::Enter,
            TAB => Key::Ignored,
            0x00..=0x1F => Key::Ignored,
            _ => self.decode_codepoint(byte),
        }
    }

    fn decode_codepoint(&mut self, lead: u8) -> Key {
        let width = forward_width(lead);
        let mut raw = [lead, 0, 0, 0];
        for slot in raw.iter_mut().take(width).skip(1) {
            match self.follow_byte() {
                Some(b) if b & 0xC0 == 0x80 => *slot = b,
                _ => return Key::Ignored,
            }
        }
        Codepoint::from_bytes(&raw[..width]).map_or(Key::Ignored, Key::Character)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn decoder(bytes: &[u8]) -> KeyDecoder<ReaderSource<&[u8]>> {
        KeyDecoder::new(ReaderSource::new(bytes))
    }

    fn keys(bytes: &[u8]) -> Vec<Key> {
        let mut d = decoder(bytes);
        let mut out = Vec::new();
        loop {
            let k = d.next_key().unwrap();
            if k == Key::EndOfInput {
                break;
            }
            out.push(k);
        }
        out
    }

    /// Scripted source that can interleave `Pending` and errors.
    struct Script(VecDeque<io::Result<Polled>>);

    impl ByteSource for Script {
        fn poll_byte(&mut self) -> io::Result<Polled> {
            self.0.pop_front().unwrap_or(Ok(Polled::Closed))
        }
    }

    // ── Plain bytes ───────────────────────────────────────────────────────────

    #[test]
    fn ascii_characters() {
        assert_eq!(keys(b"ab"), vec![Key::char('a'), Key::char('b')]);
    }

    #[test]
    fn control_bytes() {
        assert_eq!(
            keys(b"\x7f\n\r\t\x01"),
            vec![Key::Backspace, Key::Enter, Key::Enter, Key::Ignored, Key::Ignored]
        );
    }

    #[test]
    fn eof_byte_ends_input() {
        let mut d = decoder(b"\x04a");
        assert_eq!(d.next_key().unwrap(), Key::EndOfInput);
        assert_eq!(d.next_key().unwrap(), Key::char('a'));
    }

    #[test]
    fn custom_eof_byte() {
        let mut d = KeyDecoder::with_eof_byte(ReaderSource::new(&b"\x1a\x04"[..]), 0x1A);
        assert_eq!(d.next_key().unwrap(), Key::EndOfInput);
        // 0x04 is now just an ignored control byte.
        assert_eq!(d.next_key().unwrap(), Key::Ignored);
    }

    #[test]
    fn closed_stream_is_end_of_input() {
        assert_eq!(decoder(b"").next_key().unwrap(), Key::EndOfInput);
    }

    // ── UTF-8 ─────────────────────────────────────────────────────────────────

    #[test]
    fn multibyte_codepoints() {
        assert_eq!(
            keys("é€😀".as_bytes()),
            vec![Key::char('é'), Key::char('€'), Key::char('😀')]
        );
    }

    #[test]
    fn truncated_codepoint_is_ignored() {
        assert_eq!(keys(&[0xE2, 0x82]), vec![Key::Ignored]);
    }

    #[test]
    fn bad_continuation_is_ignored() {
        assert_eq!(keys(&[0xC3, b'a', b'b']), vec![Key::Ignored, Key::char('b')]);
    }

    #[test]
    fn stray_continuation_is_ignored() {
        assert_eq!(keys(&[0x80, b'x']), vec![Key::Ignored, Key::char('x')]);
    }

    #[test]
    fn overlong_encoding_is_ignored() {
        assert_eq!(keys(&[0xC0, 0x80]), vec![Key::Ignored]);
    }

    // ── Escape sequences ──────────────────────────────────────────────────────

    #[test]
    fn arrow_keys() {
        assert_eq!(
            keys(b"\x1b[A\x1b[B\x1b[C\x1b[D"),
            vec![Key::ArrowUp, Key::ArrowDown, Key::ArrowRight, Key::ArrowLeft]
        );
    }

    #[test]
    fn home_end_variants() {
        assert_eq!(
            keys(b"\x1b[H\x1b[1~\x1b[7~\x1b[F\x1b[4~\x1b[8~"),
            vec![Key::Home, Key::Home, Key::Home, Key::End, Key::End, Key::End]
        );
    }

    #[test]
    fn delete_sequence() {
        assert_eq!(keys(b"\x1b[3~"), vec![Key::Delete]);
    }

    #[test]
    fn unknown_letter_and_digit_are_ignored() {
        assert_eq!(keys(b"\x1b[Z\x1b[5~"), vec![Key::Ignored, Key::Ignored]);
    }

    #[test]
    fn missing_tilde_is_ignored() {
        // `x` is swallowed as the would-be terminator.
        assert_eq!(keys(b"\x1b[3xa"), vec![Key::Ignored, Key::char('a')]);
    }

    #[test]
    fn non_csi_escape_is_ignored() {
        // ESC O consumes only the second byte.
        assert_eq!(keys(b"\x1bOa"), vec![Key::Ignored, Key::char('a')]);
    }

    #[test]
    fn short_read_mid_sequence_is_ignored() {
        let mut d = decoder(b"\x1b[");
        assert_eq!(d.next_key().unwrap(), Key::Ignored);
        assert_eq!(d.next_key().unwrap(), Key::EndOfInput);
    }

    #[test]
    fn pending_mid_sequence_is_ignored() {
        let script = Script(VecDeque::from(vec![
            Ok(Polled::Byte(ESC)),
            Ok(Polled::Pending),
            Ok(Polled::Byte(b'q')),
        ]));
        let mut d = KeyDecoder::new(script);
        assert_eq!(d.next_key().unwrap(), Key::Ignored);
        assert_eq!(d.next_key().unwrap(), Key::char('q'));
    }

    // ── Waiting and failures ──────────────────────────────────────────────────

    #[test]
    fn pending_before_first_byte_is_retried() {
        let script = Script(VecDeque::from(vec![
            Ok(Polled::Pending),
            Ok(Polled::Pending),
            Ok(Polled::Byte(b'z')),
        ]));
        let mut d = KeyDecoder::new(script);
        assert_eq!(d.next_key().unwrap(), Key::char('z'));
    }

    #[test]
    fn read_failure_on_first_byte_is_error() {
        let script = Script(VecDeque::from(vec![Err(io::Error::other("gone"))]));
        let mut d = KeyDecoder::new(script);
        assert!(d.next_key().is_err());
    }

    #[test]
    fn read_failure_mid_sequence_is_ignored() {
        let script = Script(VecDeque::from(vec![
            Ok(Polled::Byte(ESC)),
            Err(io::Error::other("flaky")),
        ]));
        let mut d = KeyDecoder::new(script);
        assert_eq!(d.next_key().unwrap(), Key::Ignored);
    }

    #[test]
    fn reader_source_maps_interrupted_to_pending() {
        struct Interrupting(bool);
        impl Read for Interrupting {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if !self.0 {
                    self.0 = true;
                    return Err(io::ErrorKind::Interrupted.into());
                }
                buf[0] = b'k';
                Ok(1)
            }
        }
        let mut src = ReaderSource::new(Interrupting(false));
        assert_eq!(src.poll_byte().unwrap(), Polled::Pending);
        assert_eq!(src.poll_byte().unwrap(), Polled::Byte(b'k'));
    }

    #[test]
    fn codepoint_from_bytes_rejects_multiple_chars() {
        assert!(Codepoint::from_bytes(b"ab").is_none());
        assert_eq!(Codepoint::from_bytes("é".as_bytes()).unwrap().width(), 2);
    }
}
