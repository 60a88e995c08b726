//! metadata::store
//!
//! Persistence of the parsed metadata set.
//!
//! # Layout
//!
//! When a read is asked to persist its results, the parsed apps are written
//! as a JSON index to `tmp/apps.json` under the repository root. The index
//! is self-describing (`generated_at` timestamp, apps keyed by id) and
//! written atomically (temp file, then rename) so a crashed run never
//! leaves a truncated index behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::schema::App;
use crate::core::types::AppId;

/// Directory the index is written under, relative to the repository root.
pub const TMP_DIR: &str = "tmp";

/// Index file name.
pub const INDEX_FILE: &str = "apps.json";

/// Errors from index persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write index '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize index: {0}")]
    Serialize(String),

    #[error("failed to parse index '{path}': {message}")]
    Parse { path: PathBuf, message: String },
}

/// The persisted metadata index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataIndex {
    /// When the index was generated
    pub generated_at: DateTime<Utc>,
    /// Parsed apps, keyed by app id
    pub apps: BTreeMap<AppId, App>,
}

/// Path of the index under a repository root.
pub fn index_path(root: &Path) -> PathBuf {
    root.join(TMP_DIR).join(INDEX_FILE)
}

/// Write the parsed apps as a JSON index under `root`, atomically.
///
/// Creates `tmp/` on demand. Returns the index path.
pub fn write_index(root: &Path, apps: &BTreeMap<AppId, App>) -> Result<PathBuf, StoreError> {
    let index = MetadataIndex {
        generated_at: Utc::now(),
        apps: apps.clone(),
    };

    let path = index_path(root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let contents =
        serde_json::to_string_pretty(&index).map_err(|e| StoreError::Serialize(e.to_string()))?;

    // Write to temp file in same directory (for atomic rename)
    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| StoreError::Io {
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(contents.as_bytes())
        .map_err(|e| StoreError::Io {
            path: temp_path.clone(),
            source: e,
        })?;
    file.sync_all().map_err(|e| StoreError::Io {
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, &path).map_err(|e| StoreError::Io {
        path: path.clone(),
        source: e,
    })?;

    Ok(path)
}

/// Load a previously written index.
pub fn load_index(path: &Path) -> Result<MetadataIndex, StoreError> {
    let contents = fs::read_to_string(path).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_apps() -> BTreeMap<AppId, App> {
        let mut apps = BTreeMap::new();
        let id = AppId::new("org.example.app").unwrap();
        let app = App {
            id: Some(id.clone()),
            summary: "An app".to_string(),
            ..Default::default()
        };
        apps.insert(id, app);
        apps
    }

    #[test]
    fn write_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let apps = sample_apps();

        let path = write_index(temp.path(), &apps).unwrap();
        assert_eq!(path, temp.path().join("tmp/apps.json"));
        assert!(path.exists());

        let index = load_index(&path).unwrap();
        assert_eq!(index.apps.len(), 1);
        let app = index.apps.values().next().unwrap();
        assert_eq!(app.summary, "An app");
        // Defaults are reconstructed for values the index drops
        assert_eq!(app.license, "Unknown");
    }

    #[test]
    fn no_temp_file_left_behind() {
        let temp = TempDir::new().unwrap();
        write_index(temp.path(), &sample_apps()).unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp.path().join(TMP_DIR))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec![INDEX_FILE]);
    }

    #[test]
    fn load_missing_index_errors() {
        let temp = TempDir::new().unwrap();
        let result = load_index(&index_path(temp.path()));
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn load_corrupt_index_errors() {
        let temp = TempDir::new().unwrap();
        let path = index_path(temp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ truncated").unwrap();

        let result = load_index(&path);
        assert!(matches!(result, Err(StoreError::Parse { .. })));
    }
}
