//! Session identity and the bounded access log of a secure store.

use chrono::{DateTime, Utc};
use rand::RngExt;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::{MAX_ACCESS_LOG_ENTRIES, SESSION_ID_LENGTH};

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identity and counters of one secure store. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecureSession {
    pub session_id: String,
    pub creation_time: DateTime<Utc>,
    pub access_count: u64,
    pub file_hash: Option<String>,
}

impl SecureSession {
    pub fn new() -> Self {
        Self::with_id(generate_session_id())
    }

    pub fn with_id(session_id: String) -> Self {
        Self {
            session_id,
            creation_time: Utc::now(),
            access_count: 0,
            file_hash: None,
        }
    }
}

impl Default for SecureSession {
    fn default() -> Self {
        Self::new()
    }
}

/// 16 hex characters from SHA-256 over time, pid, a process counter and random bytes.
pub fn generate_session_id() -> String {
    let mut noise = [0u8; 16];
    rand::rng().fill(&mut noise);

    let mut hasher = Sha256::new();
    hasher.update(
        Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_le_bytes(),
    );
    hasher.update(std::process::id().to_le_bytes());
    hasher.update(SESSION_COUNTER.fetch_add(1, Ordering::Relaxed).to_le_bytes());
    hasher.update(noise);

    let mut id = hex::encode(hasher.finalize());
    id.truncate(SESSION_ID_LENGTH);
    id
}

/// Kind of operation recorded in the access log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Load,
    Get,
    GetKeys,
    GetAll,
    IntegrityCheck,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Get => "get",
            Self::GetKeys => "get_keys",
            Self::GetAll => "get_all",
            Self::IntegrityCheck => "integrity_check",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audited operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessLogEntry {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub operation: Operation,
    pub key: Option<String>,
    pub success: bool,
    /// Session access count including this entry.
    pub access_count: u64,
    /// Error code of the failure, when the operation failed with an error.
    pub error_code: Option<&'static str>,
}

/// Ring buffer of access entries; the oldest entry is evicted past capacity.
#[derive(Debug, Clone)]
pub struct AccessLog {
    entries: VecDeque<AccessLogEntry>,
    capacity: usize,
}

impl Default for AccessLog {
    fn default() -> Self {
        Self::with_capacity(MAX_ACCESS_LOG_ENTRIES)
    }
}

impl AccessLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: AccessLogEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, oldest first.
    pub fn snapshot(&self) -> Vec<AccessLogEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(count: u64) -> AccessLogEntry {
        AccessLogEntry {
            timestamp: Utc::now(),
            session_id: "s".to_string(),
            operation: Operation::Get,
            key: Some(format!("K{count}")),
            success: true,
            access_count: count,
            error_code: None,
        }
    }

    #[test]
    fn test_session_ids_are_short_hex_and_unique() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_eq!(a.len(), SESSION_ID_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_access_log_evicts_oldest() {
        let mut log = AccessLog::with_capacity(3);
        for i in 1..=5 {
            log.push(entry(i));
        }
        let counts: Vec<u64> = log.snapshot().iter().map(|e| e.access_count).collect();
        assert_eq!(counts, vec![3, 4, 5]);
    }

    #[test]
    fn test_entry_serializes_operation_in_snake_case() {
        let mut e = entry(1);
        e.operation = Operation::IntegrityCheck;
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["operation"], "integrity_check");
        assert_eq!(json["key"], "K1");
    }
}
