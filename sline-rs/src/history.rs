//! Input history: a bounded list of entered lines plus the live line.
//!
//! ## Layout
//!
//! Slots `0..top` hold committed lines, oldest first.  Slot `top` is the
//! *live* slot: it mirrors the line currently being edited so that browsing
//! away with Up and coming back with Down restores it.  Slots past `top` are
//! empty.
//!
//! ```text
//!   index:  0      1      2      3 (= top)   4 …
//!           "a"    "b"    "c"    "ab|"       ""
//!                         ^browse
//! ```
//!
//! All `capacity + 1` slots are allocated once, each with room for
//! `entry_size` bytes.  When a commit would push `top` past `capacity`, the
//! store *rotates*: every slot shifts down by one and the oldest line falls
//! off.
//!
//! `browse` is the entry shown by Up/Down navigation.  It is independent of
//! `top` and snaps back to `top` on any edit, on commit, and at the start of
//! each read.

use crate::error::Result;
use crate::utf8::truncate;

/// Default number of committed entries kept.
pub const DEFAULT_HISTORY_SIZE: usize = 50;

/// Default per-entry size in bytes (content holds one byte less).
pub const DEFAULT_ENTRY_SIZE: usize = 64;

// ── History ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct History {
    slots: Vec<String>,
    entry_size: usize,
    top: usize,
    browse: usize,
}

impl History {
    /// Allocate a store for `capacity` committed lines of up to
    /// `entry_size - 1` bytes each.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`](crate::Error::OutOfMemory) if the slots cannot
    /// be allocated.
    pub fn new(capacity: usize, entry_size: usize) -> Result<Self> {
        let capacity = capacity.max(1);
        let entry_size = entry_size.max(1);

        // One slot past `capacity` for the live line.  Saturating is enough:
        // a count near `usize::MAX` fails the reservation regardless.
        let slot_count = capacity.saturating_add(1);
        let mut slots = Vec::new();
        slots.try_reserve_exact(slot_count)?;
        for _ in 0..slot_count {
            let mut slot = String::new();
            slot.try_reserve_exact(entry_size)?;
            slots.push(slot);
        }
        tracing::debug!(capacity, entry_size, "history allocated");

        Ok(Self {
            slots,
            entry_size,
            top: 0,
            browse: 0,
        })
    }

    /// Maximum number of committed entries.
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn entry_size(&self) -> usize {
        self.entry_size
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        self.top
    }

    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    /// Index of the live slot.
    pub fn top(&self) -> usize {
        self.top
    }

    /// Index currently shown by navigation.
    pub fn browse(&self) -> usize {
        self.browse
    }

    /// Entry at `index` (`0..=top`; `top` is the live line).
    pub fn get(&self, index: usize) -> Option<&str> {
        if index > self.top {
            return None;
        }
        self.slots.get(index).map(String::as_str)
    }

    /// Committed entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.slots[..self.top].iter().map(String::as_str)
    }

    // ── Recording ─────────────────────────────────────────────────────────────

    /// Mirror the in-progress line into the live slot.
    pub fn record_live(&mut self, text: &str) {
        self.store(self.top, text);
    }

    /// Finish the current line.
    ///
    /// The text lands in the live slot; if it is non-empty, `top` advances
    /// (rotating out the oldest entry when full) and the new live slot starts
    /// empty.  Empty lines are never kept.  `browse` is reset either way.
    pub fn commit(&mut self, text: &str) {
        self.store(self.top, text);
        if !text.is_empty() {
            self.top += 1;
            if self.top == self.slots.len() {
                self.rotate();
            }
            self.slots[self.top].clear();
        }
        self.reset_browse();
    }

    /// Drop the oldest entry and shift the rest down one slot.
    ///
    /// The emptied first slot moves to the end, so no buffer is freed or
    /// reallocated.
    fn rotate(&mut self) {
        self.slots.rotate_left(1);
        self.top -= 1;
        tracing::trace!(top = self.top, "history rotated");
    }

    fn store(&mut self, index: usize, text: &str) {
        let slot = &mut self.slots[index];
        slot.clear();
        slot.push_str(truncate(text, self.entry_size - 1));
    }

    // ── Navigation ────────────────────────────────────────────────────────────

    /// Step one entry older.  Returns `None` (and stays put) at the oldest.
    pub fn navigate_up(&mut self) -> Option<&str> {
        if self.browse == 0 {
            return None;
        }
        self.browse -= 1;
        self.get(self.browse)
    }

    /// Step one entry newer, stopping at the live line.
    pub fn navigate_down(&mut self) -> Option<&str> {
        if self.browse < self.top {
            self.browse += 1;
        }
        self.get(self.browse)
    }

    pub fn reset_browse(&mut self) {
        self.browse = self.top;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
