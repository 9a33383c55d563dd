//! Centralized limits and policy tables for the loader.
//!
//! Every size, count and pattern limit the validator and stores enforce lives
//! here so the policy can be reviewed in one place.

// =============================================================================
// Input Size Limits
// =============================================================================

/// Maximum length of a key, in bytes.
pub const MAX_KEY_LENGTH: usize = 128;

/// Maximum length of a value after trimming and quote stripping, in bytes.
pub const MAX_VALUE_LENGTH: usize = 1024;

/// Maximum length of a path handed to the validator, in bytes.
pub const MAX_PATH_LENGTH: usize = 1024;

/// Base file size ceiling (10 MiB) before profile scaling.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum number of lines accepted in one file.
pub const MAX_LINES_PER_FILE: usize = 10_000;

// =============================================================================
// Read Strategy
// =============================================================================

/// Files at or above this size are read through the streaming path (1 MiB).
pub const STREAMING_THRESHOLD: u64 = 1024 * 1024;

/// Chunk size used by the streaming reader and the file hasher.
pub const READ_BUFFER_SIZE: usize = 8192;

// =============================================================================
// Discovery
// =============================================================================

/// Default directory depth for auto-discovery.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Deepest directory level auto-discovery may descend to.
pub const MAX_SCAN_DEPTH: usize = 3;

/// Maximum directory entries inspected per directory during discovery.
pub const MAX_ENTRIES_PER_DIRECTORY: usize = 10_000;

/// Candidate file names, in priority order.
pub const ENV_FILE_PATTERNS: &[&str] = &[
    ".env",
    ".env.local",
    ".env.development",
    ".env.production",
    ".env.staging",
    ".env.test",
];

/// Directory names never descended into during discovery.
pub const EXCLUDED_DIRECTORIES: &[&str] = &[
    "__pycache__",
    "node_modules",
    "target",
    "venv",
    "env",
    "build",
    "dist",
];

// =============================================================================
// Secure Store
// =============================================================================

/// Ring-buffer capacity of the access log.
pub const MAX_ACCESS_LOG_ENTRIES: usize = 100;

/// Length of a session identifier in hex characters.
pub const SESSION_ID_LENGTH: usize = 16;

/// Longest caller-chosen session identifier a store accepts.
pub const MAX_SESSION_ID_LENGTH: usize = 64;

/// Number of overwrite passes `secure_wipe` performs before the final zeroing.
pub const WIPE_PASSES: usize = 3;

// =============================================================================
// Security Patterns
// =============================================================================

/// Case-insensitive signatures rejected in values under strict validation.
pub const DANGEROUS_PATTERNS: &[&str] = &[
    "$(",
    "`",
    "${",
    "<!--",
    "<script",
    "</script>",
    "<iframe",
    "javascript:",
    "vbscript:",
    "data:",
    "onload=",
    "onerror=",
    "eval(",
    "exec(",
    "__import__",
    "subprocess",
    "os.system",
    "shell=true",
];

/// Encoded and literal traversal signatures rejected in paths.
pub const PATH_TRAVERSAL_PATTERNS: &[&str] = &[
    "..",
    "%2e%2e",
    "%252e%252e",
    "..%2f",
    "..%5c",
    "..%255c",
    "..%c0%af",
];

// =============================================================================
// Boolean Recognition
// =============================================================================

/// Lowercase values coerced to `true`.
pub const TRUE_VALUES: &[&str] = &[
    "true", "yes", "1", "on", "enable", "enabled", "active", "ok", "y", "t",
];

/// Lowercase values coerced to `false`.
pub const FALSE_VALUES: &[&str] = &[
    "false", "no", "0", "off", "disable", "disabled", "inactive", "n", "f", "null", "none", "",
];

/// Text written to the ambient table for boolean values.
///
/// Capitalized for drop-in compatibility with loaders that render booleans
/// this way; the boolean parser recognizes both spellings case-insensitively.
pub const AMBIENT_TRUE: &str = "True";

/// See [`AMBIENT_TRUE`].
pub const AMBIENT_FALSE: &str = "False";

// =============================================================================
// Metadata
// =============================================================================

/// Library name reported by [`crate::info`].
pub const LIBRARY_NAME: &str = "simpleenvs";

/// Library version reported by [`crate::info`].
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
