//! metadata::yaml
//!
//! Parser and writer for the `.yml` metadata format.
//!
//! Reading tolerates the loose scalar typing YAML invites (bare strings
//! where lists are expected, integers for version codes, booleans for
//! list-typed flags); writing emits the canonical key names and drops empty
//! values and bookkeeping fields entirely.

use std::path::Path;

use super::schema::App;
use super::MetadataError;

/// Parse `.yml` metadata.
pub fn parse_yaml(content: &str, path: &Path) -> Result<App, MetadataError> {
    serde_yaml::from_str(content).map_err(|e| MetadataError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Render an app as `.yml` metadata.
pub fn write_yaml(app: &App) -> Result<String, MetadataError> {
    serde_yaml::to_string(app).map_err(|e| MetadataError::Serialize(e.to_string()))
}
