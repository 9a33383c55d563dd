//! Path resolution for loads that do not name a file.
//!
//! Responsibilities:
//! - Define the `PathResolver` collaborator stores consult when no path is given.
//! - Provide `DirectoryScanner`, a bounded breadth-first search for `.env` files.
//!
//! Does NOT handle:
//! - Validating the returned path; stores pass it through the validator like any
//!   caller-supplied path.
//!
//! Invariants:
//! - Returned paths are relative to the search root.
//! - Symlinks, hidden directories and excluded directories are never followed.
//! - Unreadable directories are skipped, not reported.

use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{ENV_FILE_PATTERNS, EXCLUDED_DIRECTORIES, MAX_ENTRIES_PER_DIRECTORY};
use crate::error::EnvError;

/// Yields a single candidate file for `(root, max_depth)`, or `None` when nothing matches.
pub trait PathResolver: Send + Sync {
    fn resolve(&self, root: &Path, max_depth: usize) -> Result<Option<PathBuf>, EnvError>;
}

/// Breadth-first search for well-known `.env` file names.
///
/// Depth 0 inspects only the root; each level down adds one directory layer.
/// Within a directory, file names are tried in pattern order and subdirectories
/// are visited in name order.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    patterns: Vec<String>,
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self {
            patterns: ENV_FILE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl DirectoryScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search for these file names instead of the defaults, in priority order.
    pub fn with_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    fn match_in(&self, dir: &Path) -> Option<String> {
        self.patterns.iter().find_map(|pattern| {
            let candidate = dir.join(pattern);
            let metadata = fs::symlink_metadata(&candidate).ok()?;
            metadata.is_file().then(|| pattern.clone())
        })
    }
}

impl PathResolver for DirectoryScanner {
    fn resolve(&self, root: &Path, max_depth: usize) -> Result<Option<PathBuf>, EnvError> {
        let mut level = vec![PathBuf::new()];

        for depth in 0..=max_depth {
            let mut next = Vec::new();
            for relative in &level {
                let dir = root.join(relative);
                if let Some(name) = self.match_in(&dir) {
                    let found = relative.join(name);
                    tracing::debug!(path = %found.display(), depth, "Discovered .env file");
                    return Ok(Some(found));
                }
                if depth < max_depth {
                    next.extend(subdirectories(&dir)?.into_iter().map(|d| relative.join(d)));
                }
            }
            level = next;
        }
        Ok(None)
    }
}

fn subdirectories(dir: &Path) -> Result<Vec<String>, EnvError> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(Vec::new());
    };

    let mut names = Vec::new();
    for (count, entry) in entries.flatten().enumerate() {
        if count >= MAX_ENTRIES_PER_DIRECTORY {
            return Err(EnvError::invalid_input(format!(
                "too many directory entries in {} (max: {})",
                dir.display(),
                MAX_ENTRIES_PER_DIRECTORY
            )));
        }
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || EXCLUDED_DIRECTORIES.contains(&name.as_str()) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}
