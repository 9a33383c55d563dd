//! Stateless security gatekeeping for paths, file metadata, keys and values.
//!
//! Responsibilities:
//! - Reject path traversal, symlinks and non-regular files before anything is read.
//! - Enforce the profile-scaled file size ceiling.
//! - Check keys and values against the key grammar, length limits and
//!   dangerous-pattern signatures.
//! - Screen a whole file's content in one pass, reporting the first violation's line.
//!
//! Does NOT handle:
//! - Reading files (see `reader`) or splitting lines into entries (see `parser`).
//!
//! Invariants:
//! - Every failure is a structured `EnvError` carrying path, pattern or size context.
//! - Dangerous-pattern matching is a case-insensitive substring search.
//! - Error messages never contain the offending value.

use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};

use crate::constants::{
    DANGEROUS_PATTERNS, MAX_KEY_LENGTH, MAX_LINES_PER_FILE, MAX_PATH_LENGTH, MAX_VALUE_LENGTH,
    PATH_TRAVERSAL_PATTERNS,
};
use crate::error::EnvError;
use crate::profile::Profile;

/// Where loadable files may live and how callers may name them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPolicy {
    root: Option<PathBuf>,
    allow_absolute: bool,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self::relative_to_cwd()
    }
}

impl PathPolicy {
    /// Relative paths only, confined to the current working directory.
    pub fn relative_to_cwd() -> Self {
        Self {
            root: None,
            allow_absolute: false,
        }
    }

    /// Paths confined to `root`. Absolute paths are accepted when they resolve inside it;
    /// relative paths are resolved against it.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            allow_absolute: true,
        }
    }

    /// The directory paths are resolved against.
    ///
    /// # Errors
    ///
    /// `Configuration` when an explicit root is not an existing directory.
    pub fn root(&self) -> Result<PathBuf, EnvError> {
        match &self.root {
            Some(root) if root.is_dir() => Ok(root.clone()),
            Some(root) => Err(EnvError::Configuration {
                component: "path_policy".to_string(),
                issue: format!("root {} is not a directory", root.display()),
            }),
            None => Ok(std::env::current_dir()?),
        }
    }

    pub fn allows_absolute(&self) -> bool {
        self.allow_absolute
    }
}

/// Validate a caller-supplied path and return its canonical form.
///
/// # Errors
///
/// - `PathTraversal` for `..` or encoded traversal signatures, NUL bytes, absolute
///   paths the policy forbids, or a canonical path outside the allowed root.
/// - `InvalidInput` for empty or overlong paths, symlinks, and non-regular files.
/// - `FileNotFound` when nothing exists at the path.
pub fn validate_path(path: &Path, policy: &PathPolicy) -> Result<PathBuf, EnvError> {
    let text = path.to_string_lossy();
    let traversal = || EnvError::PathTraversal {
        attempted_path: text.to_string(),
    };

    if text.is_empty() {
        return Err(EnvError::invalid_input("empty path"));
    }
    // Traversal screens run before the length limit so an oversized attack is
    // still reported as traversal.
    if text.contains('\0') {
        return Err(traversal());
    }
    let lower = text.to_ascii_lowercase();
    if PATH_TRAVERSAL_PATTERNS.iter().any(|p| lower.contains(p))
        || path.components().any(|c| c == Component::ParentDir)
    {
        return Err(traversal());
    }
    if path.is_absolute() && !policy.allows_absolute() {
        return Err(traversal());
    }
    if text.len() > MAX_PATH_LENGTH {
        return Err(EnvError::invalid_input(format!(
            "path too long: {} bytes (max: {})",
            text.len(),
            MAX_PATH_LENGTH
        )));
    }

    let root = policy.root()?;
    let candidate = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    let metadata = match std::fs::symlink_metadata(&candidate) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(EnvError::FileNotFound {
                path: Some(path.to_path_buf()),
            });
        }
        Err(e) => return Err(e.into()),
    };
    if metadata.file_type().is_symlink() {
        return Err(EnvError::invalid_input("symbolic links are not allowed"));
    }
    if !metadata.is_file() {
        return Err(EnvError::invalid_input("path is not a regular file"));
    }

    let canonical = candidate.canonicalize()?;
    let canonical_root = root.canonicalize()?;
    if !canonical.starts_with(&canonical_root) {
        return Err(traversal());
    }

    Ok(canonical)
}

/// Check file metadata against the profile's size ceiling.
pub fn validate_file_metadata(
    path: &Path,
    metadata: &Metadata,
    profile: Profile,
) -> Result<(), EnvError> {
    validate_file_size(path, metadata.len(), profile)
}

/// Check a byte count against the profile's size ceiling.
pub fn validate_file_size(path: &Path, size: u64, profile: Profile) -> Result<(), EnvError> {
    let max_size = profile.max_file_size();
    if size > max_size {
        return Err(EnvError::FileSize {
            path: path.to_path_buf(),
            size,
            max_size,
        });
    }
    Ok(())
}

/// Check a key against the key grammar.
///
/// Both modes reject empty and overlong keys. Strict mode requires `[A-Za-z0-9_]`
/// without a leading digit; relaxed mode only rejects whitespace, `=` and control
/// characters, which the ambient table cannot hold.
pub fn validate_key(key: &str, strict: bool) -> Result<(), EnvError> {
    if key.is_empty() {
        return Err(EnvError::invalid_input("empty key"));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(EnvError::invalid_input(format!(
            "key too long: {} chars (max: {})",
            key.len(),
            MAX_KEY_LENGTH
        )));
    }
    if strict {
        if !key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            return Err(EnvError::invalid_input("key contains invalid characters"));
        }
        if key.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(EnvError::invalid_input("key must not start with a digit"));
        }
    } else if key
        .chars()
        .any(|c| c == '=' || c.is_whitespace() || c.is_control())
    {
        return Err(EnvError::invalid_input("key contains invalid characters"));
    }
    Ok(())
}

/// Check a value's length and, in strict mode, its dangerous-pattern signatures.
pub fn validate_value(value: &str, strict: bool) -> Result<(), EnvError> {
    if value.len() > MAX_VALUE_LENGTH {
        return Err(EnvError::invalid_input(format!(
            "value too long: {} chars (max: {})",
            value.len(),
            MAX_VALUE_LENGTH
        )));
    }
    if value.contains('\0') {
        return Err(EnvError::invalid_input("null byte in value"));
    }
    if strict && let Some(pattern) = find_dangerous_pattern(value) {
        return Err(dangerous(pattern, None));
    }
    Ok(())
}

/// Screen a whole file in one pass.
///
/// NUL bytes and the line limit are enforced in both modes. In strict mode the value
/// part of every data line is checked for dangerous patterns; comment lines are skipped.
/// The first violation is reported with its 1-based line number.
pub fn validate_content(content: &str, strict: bool) -> Result<(), EnvError> {
    if let Some(offset) = content.find('\0') {
        let line = content[..offset].matches('\n').count() + 1;
        return Err(EnvError::InvalidInput {
            message: "null byte detected in file content".to_string(),
            line: Some(line),
            pattern: None,
        });
    }

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        if line_number > MAX_LINES_PER_FILE {
            return Err(EnvError::InvalidInput {
                message: format!("too many lines in file (max: {})", MAX_LINES_PER_FILE),
                line: Some(line_number),
                pattern: None,
            });
        }
        if !strict {
            continue;
        }
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((_, value)) = trimmed.split_once('=') {
            if let Some(pattern) = find_dangerous_pattern(value) {
                return Err(dangerous(pattern, Some(line_number)));
            }
        }
    }
    Ok(())
}

/// First dangerous signature contained in `value`, case-insensitively.
pub fn find_dangerous_pattern(value: &str) -> Option<&'static str> {
    let lower = value.to_ascii_lowercase();
    DANGEROUS_PATTERNS
        .iter()
        .copied()
        .find(|pattern| lower.contains(pattern))
}

fn dangerous(pattern: &'static str, line: Option<usize>) -> EnvError {
    EnvError::InvalidInput {
        message: format!("dangerous pattern detected: {}", pattern),
        line,
        pattern: Some(pattern),
    }
}
