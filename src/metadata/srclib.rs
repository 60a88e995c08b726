//! metadata::srclib
//!
//! Source library index.
//!
//! Each `srclibs/*.txt` file describes one shared source library that app
//! builds may reference (`srclibs=Name@rev`). The format is plain
//! `Field:Value` lines; `#` comments and blank lines are ignored. A missing
//! `srclibs` directory simply yields an empty index.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{MetadataError, Warnings};

/// One source library definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SrcLib {
    /// VCS type of the library repository
    pub repo_type: String,
    /// Library repository location
    pub repo: String,
    /// Subdirectories to use, first match wins
    pub subdir: Option<Vec<String>>,
    /// Command to prepare the library for use
    pub prepare: Option<String>,
}

/// Parse one srclib definition.
///
/// `source` is the path label used in diagnostics.
pub fn parse_srclib(
    content: &str,
    source: &str,
    warnings: &Warnings,
) -> Result<SrcLib, MetadataError> {
    let mut srclib = SrcLib::default();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((field, value)) = line.split_once(':') else {
            warnings.emit(format!("Invalid srclib metadata in {}:{}", source, index + 1))?;
            continue;
        };

        match field {
            "Repo Type" => srclib.repo_type = value.to_string(),
            "Repo" => srclib.repo = value.to_string(),
            "Subdir" => {
                srclib.subdir = Some(value.split(',').map(str::to_string).collect());
            }
            "Prepare" => srclib.prepare = Some(value.to_string()),
            _ => {}
        }
    }

    Ok(srclib)
}

/// Read all srclib definitions from `dir`, keyed by file stem.
pub fn read_srclibs(
    dir: &Path,
    warnings: &Warnings,
) -> Result<BTreeMap<String, SrcLib>, MetadataError> {
    let mut srclibs = BTreeMap::new();

    if !dir.is_dir() {
        return Ok(srclibs);
    }

    let entries = fs::read_dir(dir).map_err(|e| MetadataError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();

    for path in paths {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let content = fs::read_to_string(&path).map_err(|e| MetadataError::Io {
            path: path.clone(),
            source: e,
        })?;
        let srclib = parse_srclib(&content, &path.display().to_string(), warnings)?;
        srclibs.insert(name.to_string(), srclib);
    }

    Ok(srclibs)
}
