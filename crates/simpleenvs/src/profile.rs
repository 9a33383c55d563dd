//! Deployment profile detection and per-profile policy.
//!
//! Responsibilities:
//! - Detect the active profile from `ENVIRONMENT` (falling back to `ENV`).
//! - Provide per-profile settings and limit scaling.
//!
//! Invariants:
//! - Unknown or unset profile names resolve to `Development`.
//! - Scaled limits never exceed the base limit.

use serde::Serialize;
use std::fmt;

use crate::ambient::env_var_or_none;
use crate::constants::MAX_FILE_SIZE;

/// Deployment environment type that tunes limits and error verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Development,
    Testing,
    Staging,
    Production,
}

/// Behaviour switches attached to a [`Profile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileSettings {
    pub strict_validation: bool,
    pub detailed_errors: bool,
    pub log_level: &'static str,
}

impl Profile {
    /// Detect the profile from `ENVIRONMENT`, then `ENV`.
    pub fn detect() -> Self {
        env_var_or_none("ENVIRONMENT")
            .or_else(|| env_var_or_none("ENV"))
            .map(|name| Self::from_name(&name))
            .unwrap_or(Self::Development)
    }

    /// Map a profile name (or common abbreviation) to a profile.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "testing" => Self::Testing,
            "stage" | "staging" => Self::Staging,
            _ => Self::Development,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    pub fn settings(self) -> ProfileSettings {
        match self {
            Self::Production => ProfileSettings {
                strict_validation: true,
                detailed_errors: false,
                log_level: "error",
            },
            Self::Testing => ProfileSettings {
                strict_validation: true,
                detailed_errors: true,
                log_level: "info",
            },
            Self::Development | Self::Staging => ProfileSettings {
                strict_validation: false,
                detailed_errors: true,
                log_level: "debug",
            },
        }
    }

    /// Scaling factor applied to base limits, in percent.
    fn limit_percent(self) -> u64 {
        match self {
            Self::Production => 80,
            Self::Testing => 50,
            Self::Development | Self::Staging => 100,
        }
    }

    /// Scale a base limit for this profile.
    pub fn scale_limit(self, base: u64) -> u64 {
        base / 100 * self.limit_percent() + base % 100 * self.limit_percent() / 100
    }

    /// File size ceiling for this profile.
    pub fn max_file_size(self) -> u64 {
        self.scale_limit(MAX_FILE_SIZE)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_from_name_accepts_abbreviations() {
        assert_eq!(Profile::from_name("prod"), Profile::Production);
        assert_eq!(Profile::from_name("PRODUCTION"), Profile::Production);
        assert_eq!(Profile::from_name(" test "), Profile::Testing);
        assert_eq!(Profile::from_name("stage"), Profile::Staging);
        assert_eq!(Profile::from_name("whatever"), Profile::Development);
    }

    #[test]
    fn test_max_file_size_scales_down() {
        assert_eq!(Profile::Development.max_file_size(), 10 * 1024 * 1024);
        assert_eq!(Profile::Staging.max_file_size(), 10 * 1024 * 1024);
        assert_eq!(Profile::Production.max_file_size(), 8_388_608);
        assert_eq!(Profile::Testing.max_file_size(), 5 * 1024 * 1024);
        for profile in [Profile::Production, Profile::Testing] {
            assert!(profile.max_file_size() < MAX_FILE_SIZE);
        }
    }

    #[test]
    #[serial]
    fn test_detect_prefers_environment_over_env() {
        temp_env::with_vars(
            [("ENVIRONMENT", Some("production")), ("ENV", Some("test"))],
            || assert_eq!(Profile::detect(), Profile::Production),
        );
        temp_env::with_vars([("ENVIRONMENT", None), ("ENV", Some("test"))], || {
            assert_eq!(Profile::detect(), Profile::Testing)
        });
        temp_env::with_vars(
            [("ENVIRONMENT", None::<&str>), ("ENV", None::<&str>)],
            || assert_eq!(Profile::detect(), Profile::Development),
        );
    }

    #[test]
    fn test_production_settings_hide_details() {
        let settings = Profile::Production.settings();
        assert!(settings.strict_validation);
        assert!(!settings.detailed_errors);
    }
}
