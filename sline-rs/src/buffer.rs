//! Line buffer: fixed-capacity UTF-8 text plus a two-part cursor.
//!
//! ## Design
//!
//! The text lives in a byte buffer allocated once at construction and never
//! grown.  The last byte is reserved (the content is at most `capacity - 1`
//! bytes), so a buffer sized for a C-style string holds exactly what it
//! would there.
//!
//! The cursor is tracked twice: [`LineBuffer::byte_cursor`] is the offset of
//! the next edit and always sits on a codepoint boundary;
//! [`LineBuffer::cursor`] is the number of codepoints to its left, which is
//! the on-screen column relative to the prompt.  Every operation updates both.
//!
//! Insertions and deletions shift the suffix in place with `copy_within`;
//! no editing operation allocates.  Each one returns an [`Edit`] describing
//! what changed so the renderer can redraw incrementally, or `None` when the
//! operation was a no-op.

use std::fmt;

use crate::error::Result;
use crate::key::Codepoint;
use crate::utf8::{backward_width, codepoint_count, forward_width, truncate};

// ── Edit ──────────────────────────────────────────────────────────────────────

/// The change made by one editing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// A codepoint of `width` bytes now sits just left of the cursor.
    Inserted { width: usize },
    /// The codepoint left of the cursor was removed; the cursor moved left.
    ErasedBackward,
    /// The codepoint under the cursor was removed; the cursor stayed.
    ErasedForward,
    /// The cursor moved between codepoint columns without changing content.
    Moved { from: usize, to: usize },
    /// The whole content was replaced; `from` is the column the cursor was
    /// at beforehand.  The cursor is now at the end.
    Replaced { from: usize },
}

// ── LineBuffer ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct LineBuffer {
    buf: Box<[u8]>,
    len: usize,
    byte_cursor: usize,
    cursor: usize,
}

impl LineBuffer {
    /// Create an empty buffer of `capacity` bytes (content holds at most
    /// `capacity - 1`).  A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            len: 0,
            byte_cursor: 0,
            cursor: 0,
        }
    }

    /// Like [`LineBuffer::new`], but reports an allocation failure instead of
    /// aborting.  Use this when `capacity` comes from outside the program.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`](crate::Error::OutOfMemory) if the buffer cannot
    /// be allocated.
    pub fn try_new(capacity: usize) -> Result<Self> {
        let capacity = capacity.max(1);
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)?;
        buf.resize(capacity, 0u8);
        Ok(Self {
            buf: buf.into_boxed_slice(),
            len: 0,
            byte_cursor: 0,
            cursor: 0,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Maximum content length in bytes.
    pub fn max_len(&self) -> usize {
        self.buf.len() - 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Byte offset of the cursor.
    pub fn byte_cursor(&self) -> usize {
        self.byte_cursor
    }

    /// Codepoint offset of the cursor (its column after the prompt).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total number of codepoints.
    pub fn char_count(&self) -> usize {
        codepoint_count(self.as_bytes())
    }

    pub fn before_cursor(&self) -> &[u8] {
        &self.buf[..self.byte_cursor]
    }

    pub fn after_cursor(&self) -> &[u8] {
        &self.buf[self.byte_cursor..self.len]
    }

    // ── Whole-buffer ──────────────────────────────────────────────────────────

    /// Empty the buffer, or fill it with `seed`, leaving the cursor at the end.
    pub fn reset(&mut self, seed: Option<&str>) {
        self.clear();
        if let Some(text) = seed {
            self.fill(text);
        }
    }

    /// Replace the content with `text` (truncated to fit), cursor at the end.
    pub fn replace(&mut self, text: &str) -> Edit {
        let from = self.cursor;
        self.clear();
        self.fill(text);
        Edit::Replaced { from }
    }

    fn clear(&mut self) {
        self.buf[..self.len].fill(0);
        self.len = 0;
        self.byte_cursor = 0;
        self.cursor = 0;
    }

    fn fill(&mut self, text: &str) {
        let text = truncate(text, self.max_len());
        self.buf[..text.len()].copy_from_slice(text.as_bytes());
        self.len = text.len();
        self.byte_cursor = self.len;
        self.cursor = text.chars().count();
    }

    // ── Insertion ─────────────────────────────────────────────────────────────

    /// Insert `cp` at the cursor and step the cursor past it.
    ///
    /// Rejected (returns `None`) when the buffer cannot take another
    /// codepoint or the bytes would not fit.
    pub fn insert(&mut self, cp: Codepoint) -> Option<Edit> {
        let bytes = cp.as_bytes();
        let width = bytes.len();
        if self.cursor >= self.max_len() || self.len + width >= self.capacity() {
            return None;
        }
        let at = self.byte_cursor;
        self.buf.copy_within(at..self.len, at + width);
        self.buf[at..at + width].copy_from_slice(bytes);
        self.len += width;
        self.byte_cursor += width;
        self.cursor += 1;
        Some(Edit::Inserted { width })
    }

    // ── Deletion ──────────────────────────────────────────────────────────────

    /// Delete the codepoint before the cursor (backspace).
    pub fn delete_backward(&mut self) -> Option<Edit> {
        if self.byte_cursor == 0 {
            return None;
        }
        let width = backward_width(self.as_bytes(), self.byte_cursor);
        let at = self.byte_cursor - width;
        self.remove(at, width);
        self.byte_cursor = at;
        self.cursor -= 1;
        Some(Edit::ErasedBackward)
    }

    /// Delete the codepoint under the cursor (forward delete).
    pub fn delete_forward(&mut self) -> Option<Edit> {
        if self.byte_cursor == self.len {
            return None;
        }
        let width = forward_width(self.buf[self.byte_cursor]).min(self.len - self.byte_cursor);
        self.remove(self.byte_cursor, width);
        Some(Edit::ErasedForward)
    }

    fn remove(&mut self, at: usize, width: usize) {
        let old_len = self.len;
        self.buf.copy_within(at + width..old_len, at);
        self.len -= width;
        self.buf[self.len..old_len].fill(0);
    }

    // ── Cursor movement ───────────────────────────────────────────────────────

    pub fn move_left(&mut self) -> Option<Edit> {
        if self.byte_cursor == 0 {
            return None;
        }
        let from = self.cursor;
        self.byte_cursor -= backward_width(self.as_bytes(), self.byte_cursor);
        self.cursor -= 1;
        Some(Edit::Moved { from, to: self.cursor })
    }

    pub fn move_right(&mut self) -> Option<Edit> {
        if self.byte_cursor == self.len {
            return None;
        }
        let from = self.cursor;
        let width = forward_width(self.buf[self.byte_cursor]).min(self.len - self.byte_cursor);
        self.byte_cursor += width;
        self.cursor += 1;
        Some(Edit::Moved { from, to: self.cursor })
    }

    pub fn move_home(&mut self) -> Option<Edit> {
        if self.byte_cursor == 0 {
            return None;
        }
        let from = self.cursor;
        self.byte_cursor = 0;
        self.cursor = 0;
        Some(Edit::Moved { from, to: 0 })
    }

    pub fn move_end(&mut self) -> Option<Edit> {
        if self.byte_cursor == self.len {
            return None;
        }
        let from = self.cursor;
        let rest = codepoint_count(self.after_cursor());
        self.cursor += rest;
        self.byte_cursor = self.len;
        Some(Edit::Moved { from, to: self.cursor })
    }
}

impl fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineBuffer")
            .field("text", &self.as_str())
            .field("capacity", &self.capacity())
            .field("byte_cursor", &self.byte_cursor)
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl fmt::Display for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
