//! Output formatters for CLI commands.
//!
//! Provides text and JSON renderings of each command's report.

use anyhow::Result;
use serde::Serialize;
use simpleenvs::export::EnvSummary;
use simpleenvs::{Profile, SecurityInfo, TypedValue};
use std::path::PathBuf;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parse from string.
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => anyhow::bail!("Invalid output format: {}. Valid options: text, json", s),
        }
    }
}

/// Result of `check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub path: Option<PathBuf>,
    pub strict: bool,
    pub file_hash: Option<String>,
    pub summary: EnvSummary,
    pub missing: Vec<String>,
}

/// Result of `get`.
#[derive(Debug, Clone, Serialize)]
pub struct ValueReport {
    pub key: String,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub value: TypedValue,
}

/// Result of `info`.
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    pub version: &'static str,
    pub profile: Profile,
    pub integrity_verified: bool,
    pub security: SecurityInfo,
}

/// Formatter trait for different output types.
pub trait Formatter {
    fn format_check(&self, report: &CheckReport) -> Result<String>;

    fn format_value(&self, report: &ValueReport) -> Result<String>;

    fn format_keys(&self, keys: &[String]) -> Result<String>;

    fn format_info(&self, report: &InfoReport) -> Result<String>;
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_check(&self, report: &CheckReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)? + "\n")
    }

    fn format_value(&self, report: &ValueReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)? + "\n")
    }

    fn format_keys(&self, keys: &[String]) -> Result<String> {
        Ok(serde_json::to_string_pretty(keys)? + "\n")
    }

    fn format_info(&self, report: &InfoReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)? + "\n")
    }
}

/// Plain text formatter.
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_check(&self, report: &CheckReport) -> Result<String> {
        let mut out = String::new();
        if let Some(path) = &report.path {
            out.push_str(&format!("File: {}\n", path.display()));
        }
        out.push_str(&format!(
            "Mode: {}\n",
            if report.strict { "strict" } else { "lenient" }
        ));
        out.push_str(&format!("Variables: {}\n", report.summary.count));
        for (type_name, count) in &report.summary.types {
            out.push_str(&format!("  {}: {}\n", type_name, count));
        }
        if let Some(hash) = &report.file_hash {
            out.push_str(&format!("SHA-256: {}\n", hash));
        }
        if report.missing.is_empty() {
            out.push_str("OK\n");
        } else {
            out.push_str(&format!("Missing: {}\n", report.missing.join(", ")));
        }
        Ok(out)
    }

    fn format_value(&self, report: &ValueReport) -> Result<String> {
        Ok(format!("{}\n", report.value))
    }

    fn format_keys(&self, keys: &[String]) -> Result<String> {
        Ok(keys.iter().map(|k| format!("{}\n", k)).collect())
    }

    fn format_info(&self, report: &InfoReport) -> Result<String> {
        let security = &report.security;
        let mut out = format!(
            "simpleenvs {}\nProfile: {}\nSession: {}\nState: {}\nVariables: {}\nAccesses: {}\n",
            report.version,
            report.profile,
            security.session_id,
            security.state,
            security.env_count,
            security.access_count,
        );
        if let Some(source) = &security.source {
            out.push_str(&format!("Source: {}\n", source.display()));
        }
        if let Some(hash) = &security.file_hash {
            out.push_str(&format!("SHA-256: {}\n", hash));
        }
        out.push_str(&format!(
            "Integrity: {}\n",
            if report.integrity_verified {
                "verified"
            } else {
                "changed"
            }
        ));
        Ok(out)
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
