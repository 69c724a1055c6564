//! Command-line argument parsing for the demo binary.
//!
//! Usage:
//!   sline [-n] [-v] [-H<entries>] [-s<entry-size>] [-b<buffer-size>] [-p<prompt>] [-i<initial>]

use sline::Config;

/// Default size of the caller's line buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 64;

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Disable history (`-n`).
    pub no_history: bool,
    /// Print the version and exit (`-v`).
    pub version: bool,
    /// History entries kept (`-H<n>`).
    pub history_size: Option<usize>,
    /// Bytes per history entry (`-s<n>`).
    pub entry_size: Option<usize>,
    /// Bytes in the line buffer (`-b<n>`).
    pub buffer_size: usize,
    /// Fixed prompt (`-p<text>`); the default counts lines, `"<n>> "`.
    pub prompt: Option<String>,
    /// Text every line starts with (`-i<text>`).
    pub initial: Option<String>,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            no_history: false,
            version: false,
            history_size: None,
            entry_size: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            prompt: None,
            initial: None,
        }
    }
}

impl CliArgs {
    /// Session configuration implied by the flags.
    pub fn config(&self) -> Config {
        let mut config = Config::default().with_history(!self.no_history);
        if let Some(n) = self.history_size {
            config = config.with_history_size(n);
        }
        if let Some(n) = self.entry_size {
            config = config.with_entry_size(n);
        }
        config
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(&raw[1..])
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();
        let Some(flags) = arg.strip_prefix('-').filter(|f| !f.is_empty()) else {
            return Err(format!("unexpected argument: {arg}"));
        };

        let chars: Vec<char> = flags.chars().collect();
        let mut j = 0;
        while j < chars.len() {
            let flag = chars[j];
            match flag {
                'n' => args.no_history = true,
                'v' => args.version = true,

                // Flags taking a value, embedded (-H10) or separate (-H 10).
                'H' | 's' | 'b' | 'p' | 'i' => {
                    let value = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err(format!("-{flag} requires an argument"));
                    };
                    match flag {
                        'H' => args.history_size = Some(parse_size(flag, &value)?),
                        's' => args.entry_size = Some(parse_size(flag, &value)?),
                        'b' => args.buffer_size = parse_size(flag, &value)?,
                        'p' => args.prompt = Some(value),
                        _ => args.initial = Some(value),
                    }
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    Ok(args)
}

fn parse_size(flag: char, value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("-{flag}: invalid size: {value}")),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
