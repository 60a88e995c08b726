//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! repometa has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$REPOMETA_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/repometa/config.toml`
//! 3. `~/.repometa/config.toml` (canonical write location)
//!
//! # Repo Config Location
//!
//! `repometa.toml` in the repository root.
//!
//! # Example
//!
//! ```no_run
//! use repometa::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo"))).unwrap();
//!
//! println!("Warnings mode: {}", config.warnings());
//! for format in config.accepted_formats() {
//!     println!("Accepted: {}", format);
//! }
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RepoConfig, KNOWN_FORMATS, VALID_WARNING_MODES};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the repository-scope config file.
pub const REPO_CONFIG_FILE: &str = "repometa.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Merged configuration from all sources.
///
/// This struct provides accessor methods that apply precedence rules
/// automatically. Repo config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if present)
    pub repo: Option<RepoConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `repo_path` is provided, also loads repo-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(repo_path: Option<&Path>) -> Result<Config, ConfigError> {
        let (global, global_path) = Self::load_global()?;

        let (repo, repo_path_found) = if let Some(path) = repo_path {
            Self::load_repo(path)?
        } else {
            (None, None)
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(Config {
            global,
            repo,
            global_path,
            repo_path: repo_path_found,
        })
    }

    /// Load global configuration from standard locations.
    fn load_global() -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        // 1. Check $REPOMETA_CONFIG
        if let Ok(path) = std::env::var("REPOMETA_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_toml::<GlobalConfig>(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 2. Check $XDG_CONFIG_HOME/repometa/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("repometa/config.toml");
            if path.exists() {
                let config = Self::read_toml::<GlobalConfig>(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Check ~/.repometa/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".repometa/config.toml");
            if path.exists() {
                let config = Self::read_toml::<GlobalConfig>(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // No config found, use defaults
        Ok((GlobalConfig::default(), None))
    }

    /// Load repository configuration if present.
    fn load_repo(repo_path: &Path) -> Result<(Option<RepoConfig>, Option<PathBuf>), ConfigError> {
        let path = repo_path.join(REPO_CONFIG_FILE);
        if !path.exists() {
            return Ok((None, None));
        }

        let config = Self::read_toml::<RepoConfig>(&path)?;
        Ok((Some(config), Some(path)))
    }

    /// Read and parse a TOML config file.
    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `~/.repometa/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".repometa/config.toml"))
    }

    /// Get the canonical path for repo config.
    ///
    /// Returns `repometa.toml` relative to the given repo path.
    pub fn repo_config_path(repo_path: &Path) -> PathBuf {
        repo_path.join(REPO_CONFIG_FILE)
    }

    /// Write global config atomically.
    ///
    /// Creates parent directories if needed. Uses atomic write
    /// (write to temp file, then rename) to prevent corruption.
    pub fn write_global(config: &GlobalConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::global_config_path()?;
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write repo config atomically.
    ///
    /// Uses atomic write (write to temp file, then rename) to prevent
    /// corruption.
    pub fn write_repo(repo_path: &Path, config: &RepoConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::repo_config_path(repo_path);
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write a config file atomically.
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        // Write to temp file in same directory (for atomic rename)
        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Get the diagnostic mode.
    ///
    /// Repo config overrides global; defaults to "warn".
    pub fn warnings(&self) -> &str {
        self.repo
            .as_ref()
            .and_then(|r| r.warnings.as_deref())
            .or(self.global.warnings.as_deref())
            .unwrap_or("warn")
    }

    /// Get the accepted metadata formats.
    ///
    /// Defaults to all known formats if not configured.
    pub fn accepted_formats(&self) -> Vec<&str> {
        match self.repo.as_ref().and_then(|r| r.accepted_formats.as_ref()) {
            Some(formats) => formats.iter().map(|s| s.as_str()).collect(),
            None => KNOWN_FORMATS.to_vec(),
        }
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
