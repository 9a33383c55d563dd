//! `.env` parsing.
//!
//! Responsibilities:
//! - Decode file bytes and split them into `RawEntry` records.
//! - Strip one layer of matching quotes and coerce values into `TypedValue`s.
//! - Run the validator over content, keys and values.
//!
//! Does NOT handle:
//! - Reading files or checking paths (see `reader` and `validator`).
//! - Writing results anywhere; parsing has no side effects.
//!
//! Invariants:
//! - Blank lines and lines whose first non-whitespace character is `#` are skipped.
//! - The first `=` splits key from value; a data line without `=` is a parse error.
//! - No line continuation and no variable interpolation.
//! - Later assignments to the same key win.

use crate::error::EnvError;
use crate::validator::{validate_content, validate_key, validate_value};
use crate::value::{EnvironmentMap, TypedValue};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One data line as it appeared in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub key: String,
    pub raw_value: String,
    pub line_number: usize,
}

/// Parser switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Apply the strict key grammar and dangerous-pattern screening.
    pub strict: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn relaxed() -> Self {
        Self { strict: false }
    }
}

/// Parse raw file bytes into an [`EnvironmentMap`].
pub fn parse(content: &[u8], options: ParseOptions) -> Result<EnvironmentMap, EnvError> {
    let text = decode(content)?;
    parse_str(text, options)
}

/// Parse already-decoded text into an [`EnvironmentMap`].
pub fn parse_str(content: &str, options: ParseOptions) -> Result<EnvironmentMap, EnvError> {
    let entries = parse_entries(content, options)?;
    let mut map = EnvironmentMap::new();
    for entry in entries {
        let value = TypedValue::coerce(&entry.raw_value);
        map.insert(entry.key, value);
    }
    Ok(map)
}

/// Split text into validated [`RawEntry`] records, in file order.
pub fn parse_entries(content: &str, options: ParseOptions) -> Result<Vec<RawEntry>, EnvError> {
    validate_content(content, options.strict)?;

    let mut entries = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            return Err(EnvError::FileParsing {
                line: line_number,
                reason: "line missing '=' separator".to_string(),
            });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(EnvError::FileParsing {
                line: line_number,
                reason: "empty key".to_string(),
            });
        }
        let value = strip_quotes(value.trim());

        validate_key(key, options.strict).map_err(|e| at_line(e, line_number))?;
        validate_value(value, options.strict).map_err(|e| at_line(e, line_number))?;

        entries.push(RawEntry {
            key: key.to_string(),
            raw_value: value.to_string(),
            line_number,
        });
    }
    Ok(entries)
}

/// Remove one layer of matching single or double quotes.
pub fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn decode(content: &[u8]) -> Result<&str, EnvError> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    std::str::from_utf8(content).map_err(|e| {
        let line = content[..e.valid_up_to()]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1;
        EnvError::FileParsing {
            line,
            reason: "invalid UTF-8".to_string(),
        }
    })
}

fn at_line(error: EnvError, line_number: usize) -> EnvError {
    match error {
        EnvError::InvalidInput {
            message, pattern, ..
        } => EnvError::InvalidInput {
            message,
            line: Some(line_number),
            pattern,
        },
        other => other,
    }
}
