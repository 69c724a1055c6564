//! Incremental redraw of the edited line.
//!
//! [`Renderer`] turns [`Edit`] deltas into the smallest VT100 output that
//! keeps the visible line in step with the buffer:
//!
//! | Edit | Output |
//! |------|--------|
//! | `Inserted` | the new codepoint, then the suffix redraw |
//! | `ErasedBackward` | one column left, then the suffix redraw |
//! | `ErasedForward` | the suffix redraw |
//! | `Moved` | `ESC [ n C` or `ESC [ n D` |
//! | `Replaced` | back to the start of the line, clear, whole line |
//!
//! The *suffix redraw* is clear-to-end-of-line, save cursor (`ESC 7`), the
//! bytes right of the cursor, restore cursor (`ESC 8`): the tail is repainted
//! while the terminal cursor stays at the edit point.
//!
//! Commands are queued with crossterm and only reach the terminal on
//! [`Renderer::flush`].  Columns are counted in codepoints.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::Print,
    terminal::{self, ClearType},
};

use crate::buffer::{Edit, LineBuffer};

// ── Renderer ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Renderer<W> {
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Apply one edit.  `line` is the buffer *after* the edit.
    pub fn apply(&mut self, edit: Edit, line: &LineBuffer) -> io::Result<()> {
        match edit {
            Edit::Inserted { width } => {
                let before = line.before_cursor();
                let inserted = &before[before.len() - width..];
                self.out.write_all(inserted)?;
                self.redraw_suffix(line.after_cursor())
            }
            Edit::ErasedBackward => {
                self.move_columns(1, 0)?;
                self.redraw_suffix(line.after_cursor())
            }
            Edit::ErasedForward => self.redraw_suffix(line.after_cursor()),
            Edit::Moved { from, to } => self.move_columns(from, to),
            Edit::Replaced { from } => self.replace_line(from, line.as_bytes()),
        }
    }

    /// Write the prompt and any seeded text; the cursor ends after both.
    pub fn prompt(&mut self, prompt: &str, seed: &[u8]) -> io::Result<()> {
        queue!(self.out, Print(prompt))?;
        self.out.write_all(seed)
    }

    /// End the visible line (commit or cancel).
    pub fn newline(&mut self) -> io::Result<()> {
        self.out.write_all(b"\r\n")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    // ── Primitives ────────────────────────────────────────────────────────────

    /// Repaint `suffix` without moving the visible cursor.
    fn redraw_suffix(&mut self, suffix: &[u8]) -> io::Result<()> {
        queue!(
            self.out,
            terminal::Clear(ClearType::UntilNewLine),
            cursor::SavePosition
        )?;
        self.out.write_all(suffix)?;
        queue!(self.out, cursor::RestorePosition)
    }

    /// Move the cursor from column `from` to column `to` on the same row.
    fn move_columns(&mut self, from: usize, to: usize) -> io::Result<()> {
        if to > from {
            queue!(self.out, cursor::MoveRight(columns(to - from)))
        } else if from > to {
            queue!(self.out, cursor::MoveLeft(columns(from - to)))
        } else {
            Ok(())
        }
    }

    /// Return to the first column after the prompt, clear, write `text`.
    fn replace_line(&mut self, from: usize, text: &[u8]) -> io::Result<()> {
        self.move_columns(from, 0)?;
        queue!(self.out, terminal::Clear(ClearType::UntilNewLine))?;
        self.out.write_all(text)
    }
}

fn columns(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
