//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish failures.
//! - Map `EnvError` variants and CLI-level errors to exit codes.
//! - Render errors with profile-appropriate detail.
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.
//! - Rendered errors never contain values from the loaded file.

use simpleenvs::{EnvError, Profile};
use thiserror::Error;

/// Failures raised by the CLI itself rather than the loader.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("Key not found: {0}")]
    KeyNotFound(String),
}

/// Structured exit codes for the `simpleenvs` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - I/O or unexpected failure.
    GeneralError = 1,

    /// No file was found, or a requested key is absent.
    NotFound = 4,

    /// The file failed parsing or validation.
    ///
    /// Scripts should fix the file and not retry.
    ValidationError = 5,

    /// A security check rejected the input (traversal, integrity, memory safety).
    SecurityViolation = 6,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&EnvError> for ExitCode {
    fn from(err: &EnvError) -> Self {
        match err {
            EnvError::FileNotFound { .. }
            | EnvError::KeyNotFound { .. }
            | EnvError::EnvNotLoaded { .. } => ExitCode::NotFound,

            EnvError::InvalidInput { .. }
            | EnvError::FileParsing { .. }
            | EnvError::FileSize { .. }
            | EnvError::TypeConversion { .. }
            | EnvError::Configuration { .. } => ExitCode::ValidationError,

            EnvError::PathTraversal { .. }
            | EnvError::Integrity { .. }
            | EnvError::Session { .. }
            | EnvError::MemorySecurity { .. } => ExitCode::SecurityViolation,

            EnvError::Io(_) => ExitCode::GeneralError,
        }
    }
}

impl From<&CliError> for ExitCode {
    fn from(err: &CliError) -> Self {
        match err {
            CliError::MissingKeys(_) => ExitCode::ValidationError,
            CliError::KeyNotFound(_) => ExitCode::NotFound,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Returns ExitCode::GeneralError when nothing in the chain is recognized.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(env_err) = cause.downcast_ref::<EnvError>() {
                return ExitCode::from(env_err);
            }
            if let Some(cli_err) = cause.downcast_ref::<CliError>() {
                return ExitCode::from(cli_err);
            }
        }
        ExitCode::GeneralError
    }
}

/// Error text for stderr. Production hides loader details behind the error code.
pub fn render_error(err: &anyhow::Error, profile: Profile) -> String {
    if profile == Profile::Production
        && let Some(env_err) = err.chain().find_map(|c| c.downcast_ref::<EnvError>())
    {
        return env_err.user_message(profile);
    }
    format!("{:#}", err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_as_i32() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::NotFound.as_i32(), 4);
        assert_eq!(ExitCode::SecurityViolation.as_i32(), 6);
    }

    #[test]
    fn test_from_env_error() {
        let traversal = EnvError::PathTraversal {
            attempted_path: "../x".to_string(),
        };
        assert_eq!(ExitCode::from(&traversal), ExitCode::SecurityViolation);

        let parse = EnvError::FileParsing {
            line: 3,
            reason: "line missing '=' separator".to_string(),
        };
        assert_eq!(ExitCode::from(&parse), ExitCode::ValidationError);

        let missing = EnvError::FileNotFound {
            path: Some(PathBuf::from(".env")),
        };
        assert_eq!(ExitCode::from(&missing), ExitCode::NotFound);
    }

    #[test]
    fn test_exit_code_found_through_context() {
        let err = Err::<(), _>(EnvError::invalid_input("bad"))
            .context("Failed to load .env file")
            .unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::ValidationError);

        let err = anyhow::Error::new(CliError::MissingKeys(vec!["A".into()]));
        assert_eq!(err.exit_code(), ExitCode::ValidationError);

        let err = anyhow::anyhow!("something else");
        assert_eq!(err.exit_code(), ExitCode::GeneralError);
    }

    #[test]
    fn test_render_error_hides_details_in_production() {
        let err = anyhow::Error::new(EnvError::PathTraversal {
            attempted_path: "../../etc/passwd".to_string(),
        });
        assert!(render_error(&err, Profile::Development).contains("../../etc/passwd"));
        assert!(!render_error(&err, Profile::Production).contains("../../etc/passwd"));
    }
}
