//! Error types for loading and reading `.env` data.
//!
//! Responsibilities:
//! - Define one error enum covering every failure kind of the loader.
//! - Map each kind to a stable error code for programmatic handling.
//! - Classify security-relevant failures and render profile-aware messages.
//!
//! Does NOT handle:
//! - Logging of failures (stores log their own access entries).
//! - Discovery misses, which resolve to caller defaults and never surface here.
//!
//! Invariants:
//! - Variants carry context (path, line, pattern, size vs. limit) for precise reporting.
//! - Variants NEVER embed raw values from a `.env` file, to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

use crate::profile::Profile;

/// Errors raised by the validator, parser and stores.
#[derive(Error, Debug)]
pub enum EnvError {
    /// The path escapes the allowed root, uses `..`, contains NUL, or is absolute
    /// where only relative paths are accepted.
    #[error("Path traversal detected: {attempted_path}")]
    PathTraversal { attempted_path: String },

    #[error("File too large: {size} bytes (max: {max_size}) at {}", .path.display())]
    FileSize {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A key, value, path or file failed validation.
    ///
    /// `pattern` names the dangerous signature when one matched; it never holds
    /// the offending value itself.
    #[error("Invalid input{}: {message}", line_suffix(.line))]
    InvalidInput {
        message: String,
        line: Option<usize>,
        pattern: Option<&'static str>,
    },

    /// Structural problem in the file (missing `=`, empty key, bad encoding).
    #[error("Failed to parse .env content at line {line}: {reason}")]
    FileParsing { line: usize, reason: String },

    #[error("Environment not loaded. Call load() or load_secure() before {operation}")]
    EnvNotLoaded { operation: String },

    #[error("Environment variable '{key}' not found")]
    KeyNotFound {
        key: String,
        available_keys: Vec<String>,
    },

    #[error("Cannot convert '{key}' to {target_type}")]
    TypeConversion {
        key: String,
        target_type: &'static str,
    },

    /// The file whose hash is being verified could not be read.
    #[error("Integrity check failed for {}: {kind}", .path.display())]
    Integrity { path: PathBuf, kind: ErrorKind },

    #[error("Session error ({session_id}): {issue}")]
    Session { session_id: String, issue: String },

    #[error("Memory security violation in {operation}: {reason}")]
    MemorySecurity { operation: String, reason: String },

    /// No file at the requested path, or auto-discovery found nothing.
    #[error("No .env file found{}", path_suffix(.path))]
    FileNotFound { path: Option<PathBuf> },

    #[error("Configuration error in {component}: {issue}")]
    Configuration { component: String, issue: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}

impl EnvError {
    /// Shorthand for an [`EnvError::InvalidInput`] without line or pattern context.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            line: None,
            pattern: None,
        }
    }

    /// Stable error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PathTraversal { .. } => "SE101",
            Self::FileSize { .. } => "SE102",
            Self::InvalidInput { .. } => "SE103",
            Self::Integrity { .. } => "SE105",
            Self::Session { .. } => "SE106",
            Self::MemorySecurity { .. } => "SE107",
            Self::FileParsing { .. } => "SE200",
            Self::EnvNotLoaded { .. } => "SE201",
            Self::KeyNotFound { .. } => "SE202",
            Self::TypeConversion { .. } => "SE203",
            Self::Configuration { .. } => "SE300",
            Self::FileNotFound { .. } => "SE501",
            Self::Io(_) => "SE500",
        }
    }

    /// True for the security family (path, size, input, integrity, session, memory).
    pub fn is_security(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. }
                | Self::FileSize { .. }
                | Self::InvalidInput { .. }
                | Self::Integrity { .. }
                | Self::Session { .. }
                | Self::MemorySecurity { .. }
        )
    }

    /// True for failures that indicate an attack or a broken isolation invariant.
    pub fn is_security_critical(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. } | Self::Integrity { .. } | Self::MemorySecurity { .. }
        )
    }

    /// Message suitable for end users under the given profile.
    ///
    /// Production hides details behind the error code; every other profile shows
    /// the full message.
    pub fn user_message(&self, profile: Profile) -> String {
        if profile.settings().detailed_errors {
            return self.to_string();
        }
        if self.is_security() {
            format!("Security error occurred. Error code: {}", self.code())
        } else {
            format!("Configuration error. Error code: {}", self.code())
        }
    }
}
