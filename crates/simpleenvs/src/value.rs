//! Typed values and coercion rules.
//!
//! Responsibilities:
//! - Define the closed `TypedValue` union produced by the parser.
//! - Coerce raw text into booleans, integers, or strings, decided once at parse time.
//! - Render values back to the ambient table's string form.
//!
//! Invariants:
//! - Boolean recognition runs before integer recognition, so "1" and "0" are booleans.
//! - Integers have no sign other than `-`, no leading zeros, and fit in `i64`;
//!   anything else stays a string instead of failing.
//! - `Display` renders booleans as "True"/"False", which `coerce` reads back.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{AMBIENT_FALSE, AMBIENT_TRUE, FALSE_VALUES, TRUE_VALUES};

/// A parsed `.env` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

/// Parsed key/value pairs owned by one store. Unique keys, sorted for stable output.
pub type EnvironmentMap = BTreeMap<String, TypedValue>;

impl TypedValue {
    /// Coerce a raw value (already trimmed and unquoted by the parser).
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some(flag) = parse_bool(trimmed) {
            return Self::Boolean(flag);
        }
        if let Some(number) = parse_int(trimmed) {
            return Self::Integer(number);
        }
        Self::String(raw.to_string())
    }

    /// Name of the variant, for summaries and conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of the value.
    ///
    /// Booleans read as 1/0 and strings are re-parsed leniently, so a value kept as
    /// a string by the coercion policy ("08080") still reads as a number here.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Boolean(b) => Some(i64::from(*b)),
            Self::String(s) => s.trim().parse().ok(),
        }
    }

    /// Boolean view of the value. Integers other than the recognized set do not convert.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::Integer(_) => None,
            Self::String(s) => parse_bool(s.trim()),
        }
    }

    /// String the ambient table receives for this value.
    pub fn to_ambient(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Boolean(true) => f.write_str(AMBIENT_TRUE),
            Self::Boolean(false) => f.write_str(AMBIENT_FALSE),
        }
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Recognize a boolean spelling, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    let lower = value.to_ascii_lowercase();
    if TRUE_VALUES.contains(&lower.as_str()) {
        Some(true)
    } else if FALSE_VALUES.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Recognize a canonical base-10 `i64`: optional `-`, digits, no leading zero.
pub fn parse_int(value: &str) -> Option<i64> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    value.parse().ok()
}
