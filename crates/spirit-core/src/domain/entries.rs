//! Text format of the flat configuration file.
//!
//! The format is minimal: one `key=value` pair per line, no
//! sections, no comments, no escaping.  A line is split on its **first** `=`,
//! so values may themselves contain `=`.  Lines without any `=` are ignored.
//! Keys and values are kept verbatim (no whitespace trimming).
//!
//! Lines end at `\n`; a `\r` directly before it is part of the terminator,
//! so a value ending in `\r` does not survive a save/load cycle.  Bytes that
//! are not valid UTF-8 are decoded lossily (U+FFFD) instead of failing the
//! whole file.

use std::borrow::Cow;
use std::collections::BTreeMap;

/// In-memory form of the configuration file, ordered by key.
pub type Entries = BTreeMap<String, String>;

/// Result of parsing a configuration file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedEntries {
    pub entries: Entries,
    /// Non-blank lines without `=`.
    pub skipped: usize,
    /// Lines that contained invalid UTF-8 and were decoded lossily.
    pub lossy: usize,
}

/// Splits one line into `(key, value)` on its first `=`.
///
/// Returns `None` when the line contains no `=`.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    line.split_once('=')
}

/// Parses raw file content.
///
/// Malformed lines are skipped; a later duplicate key replaces an earlier one.
pub fn parse_entries(content: &[u8]) -> ParsedEntries {
    let mut parsed = ParsedEntries::default();

    for raw in content.split(|b| *b == b'\n') {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw);
        if let Cow::Owned(_) = line {
            parsed.lossy += 1;
        }
        match parse_line(&line) {
            Some((key, value)) => {
                parsed.entries.insert(key.to_string(), value.to_string());
            }
            None if line.is_empty() => {}
            None => parsed.skipped += 1,
        }
    }

    parsed
}

/// Renders entries as `key=value\n` lines in key order.
pub fn render_entries(entries: &Entries) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
