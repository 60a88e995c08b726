//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$REPOMETA_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/repometa/config.toml`
//! 3. `~/.repometa/config.toml` (canonical write location)
//!
//! # Repo Config
//!
//! Located at `repometa.toml` in the repository root (the working
//! directory the tool runs in).
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g. `accepted_formats` must name known formats).

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Metadata file formats the tool knows how to read.
pub const KNOWN_FORMATS: &[&str] = &["txt", "json", "yml"];

/// Valid diagnostic modes.
pub const VALID_WARNING_MODES: &[&str] = &["warn", "error", "ignore"];

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// warnings = "error"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default diagnostic mode ("warn", "error" or "ignore")
    pub warnings: Option<String>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(mode) = &self.warnings {
            validate_warning_mode(mode)?;
        }
        Ok(())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// accepted_formats = ["txt", "yml"]
/// warnings = "warn"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Metadata formats accepted in this repository (default: all known)
    pub accepted_formats: Option<Vec<String>>,

    /// Diagnostic mode override for this repository
    pub warnings: Option<String>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(formats) = &self.accepted_formats {
            if formats.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "accepted_formats cannot be empty".to_string(),
                ));
            }
            for format in formats {
                if !KNOWN_FORMATS.contains(&format.as_str()) {
                    return Err(ConfigError::InvalidValue(format!(
                        "unknown metadata format '{}', must be one of: {}",
                        format,
                        KNOWN_FORMATS.join(", ")
                    )));
                }
            }
        }

        if let Some(mode) = &self.warnings {
            validate_warning_mode(mode)?;
        }

        Ok(())
    }
}

fn validate_warning_mode(mode: &str) -> Result<(), ConfigError> {
    if !VALID_WARNING_MODES.contains(&mode) {
        return Err(ConfigError::InvalidValue(format!(
            "invalid warnings mode '{}', must be one of: {}",
            mode,
            VALID_WARNING_MODES.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod global_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = GlobalConfig::default();
            assert!(config.warnings.is_none());
        }

        #[test]
        fn valid_warning_mode() {
            let config = GlobalConfig {
                warnings: Some("error".to_string()),
            };
            assert!(config.validate().is_ok());
        }

        #[test]
        fn invalid_warning_mode() {
            let config = GlobalConfig {
                warnings: Some("loud".to_string()),
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn roundtrip() {
            let config = GlobalConfig {
                warnings: Some("ignore".to_string()),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: GlobalConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }
    }

    mod repo_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = RepoConfig::default();
            assert!(config.accepted_formats.is_none());
            assert!(config.warnings.is_none());
        }

        #[test]
        fn valid_formats() {
            let config = RepoConfig {
                accepted_formats: Some(vec!["txt".to_string(), "yml".to_string()]),
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }

        #[test]
        fn unknown_format_rejected() {
            let config = RepoConfig {
                accepted_formats: Some(vec!["xml".to_string()]),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn empty_formats_rejected() {
            let config = RepoConfig {
                accepted_formats: Some(vec![]),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn roundtrip() {
            let config = RepoConfig {
                accepted_formats: Some(vec!["txt".to_string()]),
                warnings: Some("warn".to_string()),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: RepoConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }

        #[test]
        fn reject_unknown_fields() {
            let toml = r#"
                accepted_formats = ["txt"]
                unknown_field = true
            "#;

            let result: Result<RepoConfig, _> = toml::from_str(toml);
            assert!(result.is_err());
        }
    }
}
