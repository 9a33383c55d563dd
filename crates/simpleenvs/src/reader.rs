//! File reading and content hashing.
//!
//! Responsibilities:
//! - Read small files in one pass and large files through a streaming path.
//! - Provide the same strategy for blocking and async callers.
//! - Compute SHA-256 hashes of loaded content and of files on disk.
//!
//! Invariants:
//! - The read strategy is a performance policy only: every path yields identical bytes.
//! - Async callers suspend only inside the large-file read.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::constants::{READ_BUFFER_SIZE, STREAMING_THRESHOLD};

/// Read a file, choosing one-shot or streaming by its expected size.
pub fn read_file(path: &Path, expected_size: u64) -> std::io::Result<Vec<u8>> {
    if expected_size < STREAMING_THRESHOLD {
        return std::fs::read(path);
    }

    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut content = Vec::with_capacity(expected_size as usize);
    let mut chunk = [0u8; READ_BUFFER_SIZE];
    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        content.extend_from_slice(&chunk[..read]);
    }
    Ok(content)
}

/// Async counterpart of [`read_file`].
///
/// Small files are still read synchronously; one blocking read of under 1 MiB is
/// cheaper than a trip through the blocking pool.
pub async fn read_file_async(path: &Path, expected_size: u64) -> std::io::Result<Vec<u8>> {
    if expected_size < STREAMING_THRESHOLD {
        return std::fs::read(path);
    }

    let mut file = tokio::fs::File::open(path).await?;
    let mut content = Vec::with_capacity(expected_size as usize);
    file.read_to_end(&mut content).await?;
    Ok(content)
}

/// Hex-encoded SHA-256 of in-memory content.
pub fn content_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Hex-encoded SHA-256 of a file, hashed in chunks.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, File::open(path)?);
    let mut hasher = Sha256::new();
    let mut chunk = [0u8; READ_BUFFER_SIZE];
    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        hasher.update(&chunk[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
