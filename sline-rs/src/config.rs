//! Session configuration.
//!
//! | Setting | Default | Meaning |
//! |---------|---------|---------|
//! | `history` | `true` | record lines and allow Up/Down recall |
//! | `history_size` | 50 | committed lines kept |
//! | `entry_size` | 64 | bytes per history entry (content is one less) |
//! | `prompt` | `"> "` | prompt written before each line |
//! | `prompt_size` | 32 | bytes reserved for the prompt (content is one less) |
//! | `eof_byte` | `0x04` | byte that ends input (Ctrl-D) |
//! | `poll_timeout` | 100 ms | longest single wait for input |

use std::time::Duration;

use crate::error::{Error, Result};
use crate::history::{DEFAULT_ENTRY_SIZE, DEFAULT_HISTORY_SIZE};
use crate::key::DEFAULT_EOF_BYTE;

pub const DEFAULT_PROMPT: &str = "> ";
pub const DEFAULT_PROMPT_SIZE: usize = 32;
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub history: bool,
    pub history_size: usize,
    pub entry_size: usize,
    pub prompt: String,
    pub prompt_size: usize,
    pub eof_byte: u8,
    pub poll_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history: true,
            history_size: DEFAULT_HISTORY_SIZE,
            entry_size: DEFAULT_ENTRY_SIZE,
            prompt: DEFAULT_PROMPT.to_owned(),
            prompt_size: DEFAULT_PROMPT_SIZE,
            eof_byte: DEFAULT_EOF_BYTE,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, enabled: bool) -> Self {
        self.history = enabled;
        self
    }

    pub fn with_history_size(mut self, entries: usize) -> Self {
        self.history_size = entries;
        self
    }

    pub fn with_entry_size(mut self, bytes: usize) -> Self {
        self.entry_size = bytes;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_prompt_size(mut self, bytes: usize) -> Self {
        self.prompt_size = bytes;
        self
    }

    pub fn with_eof_byte(mut self, byte: u8) -> Self {
        self.eof_byte = byte;
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Reject settings a session cannot work with.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        if self.history && self.history_size == 0 {
            return Err(Error::InvalidConfig("history_size must be at least 1".into()));
        }
        if self.history && self.entry_size < 2 {
            return Err(Error::InvalidConfig("entry_size must be at least 2".into()));
        }
        if self.prompt_size == 0 {
            return Err(Error::InvalidConfig("prompt_size must be at least 1".into()));
        }
        if matches!(self.eof_byte, b'\n' | b'\r' | 0x1B | 0x7F) {
            return Err(Error::InvalidConfig(format!(
                "eof_byte {:#04x} is already bound to another key",
                self.eof_byte
            )));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
