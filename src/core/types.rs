//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`AppId`] - Validated application identifier
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use repometa::core::types::AppId;
//!
//! // Valid constructions
//! let id = AppId::new("org.example.app").unwrap();
//! assert_eq!(id.as_str(), "org.example.app");
//!
//! // Invalid constructions fail at creation time
//! assert!(AppId::new("").is_err());
//! assert!(AppId::new("has space").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid app id: {0}")]
    InvalidAppId(String),
}

/// A validated application identifier.
///
/// App ids come from metadata file stems (e.g. `org.example.app` from
/// `metadata/org.example.app.txt`) and are used as keys throughout the
/// parsed repository, in description cross-references (`[[org.example.app]]`)
/// and in persisted indexes. They must be usable as both a map key and a
/// single path component:
/// - Cannot be empty
/// - Cannot contain path separators (`/`, `\`)
/// - Cannot contain whitespace or ASCII control characters
///
/// # Example
///
/// ```
/// use repometa::core::types::AppId;
///
/// let id = AppId::new("org.fdroid.fdroid").unwrap();
/// assert_eq!(id.to_string(), "org.fdroid.fdroid");
///
/// assert!(AppId::new("org/evil").is_err());
/// assert!(AppId::new("two words").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppId(String);

impl AppId {
    /// Create a new validated app id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidAppId` if the id is empty or contains
    /// path separators, whitespace, or control characters.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    fn validate(id: &str) -> Result<(), TypeError> {
        if id.is_empty() {
            return Err(TypeError::InvalidAppId("app id cannot be empty".into()));
        }

        for c in id.chars() {
            if c == '/' || c == '\\' {
                return Err(TypeError::InvalidAppId(
                    "app id cannot contain path separators".into(),
                ));
            }
            if c.is_whitespace() {
                return Err(TypeError::InvalidAppId(
                    "app id cannot contain whitespace".into(),
                ));
            }
            if c.is_ascii_control() {
                return Err(TypeError::InvalidAppId(
                    "app id cannot contain control characters".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the app id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AppId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AppId> for String {
    fn from(id: AppId) -> Self {
        id.0
    }
}

impl AsRef<str> for AppId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod app_id {
        use super::*;

        #[test]
        fn valid_package_name() {
            let id = AppId::new("org.example.app").unwrap();
            assert_eq!(id.as_str(), "org.example.app");
        }

        #[test]
        fn valid_with_underscores_and_digits() {
            assert!(AppId::new("com.example.app_2").is_ok());
        }

        #[test]
        fn empty_rejected() {
            assert!(AppId::new("").is_err());
        }

        #[test]
        fn path_separators_rejected() {
            assert!(AppId::new("org/example").is_err());
            assert!(AppId::new("org\\example").is_err());
        }

        #[test]
        fn whitespace_rejected() {
            assert!(AppId::new("two words").is_err());
            assert!(AppId::new("tab\there").is_err());
        }

        #[test]
        fn control_characters_rejected() {
            assert!(AppId::new("bad\u{1}id").is_err());
        }

        #[test]
        fn serde_roundtrip() {
            let id = AppId::new("org.example.app").unwrap();
            let json = serde_json::to_string(&id).unwrap();
            let parsed: AppId = serde_json::from_str(&json).unwrap();
            assert_eq!(id, parsed);
        }

        #[test]
        fn serde_rejects_invalid() {
            let result: Result<AppId, _> = serde_json::from_str("\"has space\"");
            assert!(result.is_err());
        }

        #[test]
        fn ordering_is_lexicographic() {
            let a = AppId::new("a.app").unwrap();
            let b = AppId::new("b.app").unwrap();
            assert!(a < b);
        }
    }
}
