//! The validate -> read -> parse pipeline shared by both stores.
//!
//! Responsibilities:
//! - Resolve the file (explicit path or resolver), validate path and metadata.
//! - Read with the size-aware strategy, then hash and parse the bytes.
//!
//! Invariants:
//! - Nothing here mutates a store or the ambient table; a `LoadedFile` is applied
//!   by the caller only after every step succeeded.
//! - Sync and async entry points differ only in the read call.

use std::path::{Path, PathBuf};

use crate::error::EnvError;
use crate::parser::{ParseOptions, parse};
use crate::profile::Profile;
use crate::reader::{content_hash, read_file, read_file_async};
use crate::resolver::PathResolver;
use crate::validator::{PathPolicy, validate_file_metadata, validate_file_size, validate_path};
use crate::value::EnvironmentMap;

/// Everything a store needs to commit a successful load.
#[derive(Debug)]
pub(crate) struct LoadedFile {
    pub path: PathBuf,
    pub map: EnvironmentMap,
    pub hash: String,
}

/// Inputs of one load.
pub(crate) struct LoadRequest<'a> {
    pub path: Option<&'a Path>,
    pub max_depth: usize,
    pub strict: bool,
    pub policy: &'a PathPolicy,
    pub resolver: &'a dyn PathResolver,
}

/// A validated file that is ready to be read.
struct Target {
    path: PathBuf,
    size: u64,
    profile: Profile,
}

impl LoadRequest<'_> {
    fn target(&self) -> Result<Target, EnvError> {
        let requested = match self.path {
            Some(path) => path.to_path_buf(),
            None => {
                let root = self.policy.root()?;
                self.resolver
                    .resolve(&root, self.max_depth)?
                    .ok_or(EnvError::FileNotFound { path: None })?
            }
        };

        let path = validate_path(&requested, self.policy)?;
        let metadata = std::fs::metadata(&path)?;
        let profile = Profile::detect();
        validate_file_metadata(&path, &metadata, profile)?;
        if self.strict && metadata.len() == 0 {
            return Err(EnvError::invalid_input("empty file"));
        }

        Ok(Target {
            path,
            size: metadata.len(),
            profile,
        })
    }

    fn finish(&self, target: Target, content: Vec<u8>) -> Result<LoadedFile, EnvError> {
        // The file may have grown between the metadata check and the read.
        validate_file_size(&target.path, content.len() as u64, target.profile)?;

        let map = parse(&content, ParseOptions { strict: self.strict })?;
        let hash = content_hash(&content);
        tracing::debug!(
            path = %target.path.display(),
            keys = map.len(),
            strict = self.strict,
            "Parsed .env file"
        );
        Ok(LoadedFile {
            path: target.path,
            map,
            hash,
        })
    }

    pub fn run(&self) -> Result<LoadedFile, EnvError> {
        let target = self.target()?;
        let content = read_file(&target.path, target.size)?;
        self.finish(target, content)
    }

    pub async fn run_async(&self) -> Result<LoadedFile, EnvError> {
        let target = self.target()?;
        let content = read_file_async(&target.path, target.size).await?;
        self.finish(target, content)
    }
}
