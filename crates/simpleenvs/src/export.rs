//! Rendering environment maps back out: `.env` text, shell exports, summaries.
//!
//! Invariants:
//! - Output is sorted by key.
//! - `to_env_format` output parses back to the same map.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::value::{EnvironmentMap, TypedValue};

/// Number of keys listed before a summary truncates with `...`.
const SUMMARY_KEY_PREVIEW: usize = 10;

fn needs_quotes(rendered: &str) -> bool {
    rendered.is_empty()
        || rendered != rendered.trim()
        || rendered.contains(['"', '\'', ' ', '\t', '#'])
}

/// Render a map as `.env` text, one `KEY=value` line per entry.
///
/// Strings that would not survive trimming or quote stripping are wrapped in
/// double quotes; the parser removes exactly one such layer.
pub fn to_env_format(map: &EnvironmentMap) -> String {
    let mut out = String::new();
    for (key, value) in map {
        let rendered = value.to_ambient();
        match value {
            TypedValue::String(_) if needs_quotes(&rendered) => {
                let _ = writeln!(out, "{key}=\"{rendered}\"");
            }
            _ => {
                let _ = writeln!(out, "{key}={rendered}");
            }
        }
    }
    out
}

/// Quote a value for POSIX shells.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Render a map as `export KEY='value'` lines.
pub fn to_shell_format(map: &EnvironmentMap) -> String {
    let mut out = String::new();
    for (key, value) in map {
        let _ = writeln!(out, "export {key}={}", shell_quote(&value.to_ambient()));
    }
    out
}

/// Shape of a map without its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvSummary {
    pub count: usize,
    pub types: BTreeMap<&'static str, usize>,
    pub keys: Vec<String>,
    pub max_key_length: usize,
    pub max_value_length: usize,
}

pub fn summarize(map: &EnvironmentMap) -> EnvSummary {
    let mut types = BTreeMap::new();
    for value in map.values() {
        *types.entry(value.type_name()).or_insert(0) += 1;
    }
    EnvSummary {
        count: map.len(),
        types,
        keys: map.keys().cloned().collect(),
        max_key_length: map.keys().map(String::len).max().unwrap_or(0),
        max_value_length: map
            .values()
            .map(|v| v.to_ambient().len())
            .max()
            .unwrap_or(0),
    }
}

/// Human-readable summary. Values are only included when `show_values` is set.
pub fn format_summary(map: &EnvironmentMap, show_values: bool) -> String {
    let summary = summarize(map);
    let types = summary
        .types
        .iter()
        .map(|(name, count)| format!("{name}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut keys = summary
        .keys
        .iter()
        .take(SUMMARY_KEY_PREVIEW)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if summary.keys.len() > SUMMARY_KEY_PREVIEW {
        keys.push_str("...");
    }

    let mut out = format!(
        "Environment Variables Summary:\n  Total: {} variables\n  Types: {{{}}}\n  Keys: {}",
        summary.count, types, keys
    );
    if show_values && !map.is_empty() {
        out.push_str("\n\nValues:");
        for (key, value) in map {
            let _ = write!(out, "\n  {key} = {value:?}");
        }
    }
    out
}

/// Required keys absent from the map, in the order given.
pub fn missing_keys<'a, I>(map: &EnvironmentMap, required: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    required
        .into_iter()
        .filter(|key| !map.contains_key(*key))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, parse_str};

    fn sample() -> EnvironmentMap {
        parse_str(
            "NAME=My App\nPORT=8080\nDEBUG=true\nZIP=08080\nQUOTE=it's\n",
            ParseOptions::relaxed(),
        )
        .unwrap()
    }

    #[test]
    fn test_env_format_is_sorted_and_quoted() {
        let rendered = to_env_format(&sample());
        assert_eq!(
            rendered,
            "DEBUG=True\nNAME=\"My App\"\nPORT=8080\nQUOTE=\"it's\"\nZIP=08080\n"
        );
    }

    #[test]
    fn test_env_format_reparses_to_same_map() {
        let mut map = sample();
        map.insert("PADDED".into(), TypedValue::String("  both sides ".into()));
        map.insert("HASH".into(), TypedValue::String("a#b".into()));
        map.insert("WRAPPED".into(), TypedValue::String("\"x\"".into()));

        let reparsed = parse_str(&to_env_format(&map), ParseOptions::relaxed()).unwrap();
        assert_eq!(reparsed, map);
    }

    #[test]
    fn test_shell_format_escapes_single_quotes() {
        let rendered = to_shell_format(&sample());
        assert!(rendered.contains("export QUOTE='it'\\''s'\n"));
        assert!(rendered.contains("export DEBUG='True'\n"));
        assert!(rendered.starts_with("export DEBUG="));
    }

    #[test]
    fn test_summary_counts_types() {
        let summary = summarize(&sample());
        assert_eq!(summary.count, 5);
        assert_eq!(summary.types["string"], 3);
        assert_eq!(summary.types["integer"], 1);
        assert_eq!(summary.types["boolean"], 1);
        assert_eq!(summary.max_key_length, 5);
    }

    #[test]
    fn test_format_summary_hides_values_by_default() {
        let hidden = format_summary(&sample(), false);
        assert!(hidden.contains("Total: 5 variables"));
        assert!(!hidden.contains("My App"));

        let shown = format_summary(&sample(), true);
        assert!(shown.contains("My App"));
    }

    #[test]
    fn test_missing_keys_preserves_order() {
        let missing = missing_keys(&sample(), ["SECRET", "PORT", "API_KEY"]);
        assert_eq!(missing, vec!["SECRET", "API_KEY"]);
    }
}
