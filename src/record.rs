//! Mapping records and their line format
//!
//! ## File Format
//! ```text
//! ┌──────────────┬───┬──────────────────────────────┬────┐
//! │ short_code   │ ␠ │ long_url                     │ \n │
//! └──────────────┴───┴──────────────────────────────┴────┘
//! ```
//! One record per line, exactly two space-separated fields. Neither field
//! may be empty or contain a space, `\n` or `\r`; the code also holds no
//! other whitespace. Other URL characters (tabs, non-breaking spaces, ...)
//! are stored verbatim. There is no escaping.
//! `\r\n` line endings are accepted on decode.

use std::fmt;

/// Field separator within a line
pub const FIELD_SEPARATOR: char = ' ';

/// One short code ↔ long URL pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mapping {
    pub short_code: String,
    pub long_url: String,
}

impl Mapping {
    pub fn new(short_code: impl Into<String>, long_url: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            long_url: long_url.into(),
        }
    }

    /// Parse a single line (without its terminator)
    ///
    /// Returns `None` for lines with the wrong field count or with an
    /// empty field or one holding a reserved character.
    pub fn decode(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut fields = line.split(FIELD_SEPARATOR);

        let short_code = fields.next()?;
        let long_url = fields.next()?;
        if fields.next().is_some() {
            return None;
        }
        if !is_valid_code(short_code) || !is_valid_field(long_url) {
            return None;
        }

        Some(Self::new(short_code, long_url))
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.short_code, FIELD_SEPARATOR, self.long_url)
    }
}

/// Short codes are non-empty and contain no whitespace of any kind
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && !code.chars().any(char::is_whitespace)
}

/// Characters the line format cannot carry inside a field
pub const RESERVED_CHARS: [char; 3] = [FIELD_SEPARATOR, '\n', '\r'];

/// A field must be non-empty and free of reserved characters
pub fn is_valid_field(field: &str) -> bool {
    !field.is_empty() && !field.contains(&RESERVED_CHARS[..])
}

/// Encode `(short_code, long_url)` pairs into file contents, one line each
pub fn encode_all<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    for (short_code, long_url) in pairs {
        out.push_str(short_code);
        out.push(FIELD_SEPARATOR);
        out.push_str(long_url);
        out.push('\n');
    }
    out
}

/// Result of decoding file contents
#[derive(Debug, Default)]
pub struct Decoded {
    /// Well-formed records in file order
    pub records: Vec<Mapping>,

    /// 1-based line numbers of malformed lines
    pub malformed_lines: Vec<usize>,
}

/// Decode file contents, collecting malformed lines instead of failing
///
/// Lines that are not valid UTF-8 count as malformed. Blank lines are
/// ignored and not reported.
pub fn decode_all(contents: &[u8]) -> Decoded {
    let mut decoded = Decoded::default();

    for (idx, raw) in contents.split(|&b| b == b'\n').enumerate() {
        let parsed = match std::str::from_utf8(raw) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => Mapping::decode(line),
            Err(_) => None,
        };
        match parsed {
            Some(record) => decoded.records.push(record),
            None => decoded.malformed_lines.push(idx + 1),
        }
    }

    decoded
}
