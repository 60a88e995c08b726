//! metadata
//!
//! Reading, validating and writing app-repository metadata.
//!
//! # Overview
//!
//! An app repository keeps one metadata file per application under
//! `metadata/`, in `.txt`, `.json` or `.yml` format, plus shared source
//! library definitions under `srclibs/`. [`read_metadata`] loads the whole
//! set: srclibs first, then every app file (first file per app id wins),
//! with field validation, optional description cross-referencing and
//! optional persistence of the parsed result.
//!
//! # Diagnostics
//!
//! Most problems in metadata files are recoverable. Each one is routed
//! through [`Warnings`], which — depending on the configured
//! [`WarningMode`] — prints a warning, escalates to an error, or stays
//! silent. Structural failures (unreadable files, broken JSON/YAML) are
//! routed the same way so a permissive run can skip a bad file and keep
//! going.
//!
//! # Modules
//!
//! - [`schema`] - The [`App`](schema::App)/[`Build`](schema::Build) model
//! - [`fields`] - Field classification and value validation
//! - [`txt`], [`json`], [`yaml`] - Per-format parsers (and writers)
//! - [`description`] - Description markup rendering
//! - [`srclib`] - Source library index
//! - [`store`] - Persistence of the parsed set

pub mod de;
pub mod description;
pub mod fields;
pub mod json;
pub mod schema;
pub mod srclib;
pub mod store;
pub mod txt;
pub mod yaml;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::config::KNOWN_FORMATS;
use crate::core::types::AppId;
use crate::ui::output::{self, Verbosity};
use schema::App;
use srclib::SrcLib;
use store::StoreError;

/// Directory holding per-app metadata files, relative to the repo root.
pub const METADATA_DIR: &str = "metadata";

/// Directory holding srclib definitions, relative to the repo root.
pub const SRCLIBS_DIR: &str = "srclibs";

/// Errors from metadata operations.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A diagnostic escalated to an error by the warning mode.
    #[error("{0}")]
    Invalid(String),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to serialize metadata: {0}")]
    Serialize(String),

    #[error("invalid validator pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to persist metadata: {0}")]
    Store(#[from] StoreError),
}

/// What to do with a recoverable metadata problem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WarningMode {
    /// Print a warning and continue
    #[default]
    Warn,
    /// Escalate to an error
    Error,
    /// Stay silent and continue
    Ignore,
}

impl std::str::FromStr for WarningMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warn" => Ok(WarningMode::Warn),
            "error" => Ok(WarningMode::Error),
            "ignore" => Ok(WarningMode::Ignore),
            other => Err(format!("invalid warnings mode '{}'", other)),
        }
    }
}

impl std::fmt::Display for WarningMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WarningMode::Warn => "warn",
            WarningMode::Error => "error",
            WarningMode::Ignore => "ignore",
        };
        write!(f, "{}", name)
    }
}

/// Diagnostic policy for recoverable metadata problems.
#[derive(Debug, Clone, Copy)]
pub struct Warnings {
    mode: WarningMode,
    verbosity: Verbosity,
}

impl Warnings {
    /// Create a policy with the given mode and output verbosity.
    pub fn new(mode: WarningMode, verbosity: Verbosity) -> Self {
        Self { mode, verbosity }
    }

    /// Report a problem according to the configured mode.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Invalid` carrying the message when the mode
    /// is [`WarningMode::Error`].
    pub fn emit(&self, message: impl Into<String>) -> Result<(), MetadataError> {
        let message = message.into();
        match self.mode {
            WarningMode::Error => Err(MetadataError::Invalid(message)),
            WarningMode::Warn => {
                output::warn(&message, self.verbosity);
                Ok(())
            }
            WarningMode::Ignore => Ok(()),
        }
    }
}

/// Options for [`read_metadata`].
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Resolve description cross-references across the loaded set
    pub xref: bool,
    /// Persist the parsed result to the index under `tmp/`
    pub store: bool,
    /// Metadata formats accepted in this repository
    pub accepted_formats: Vec<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            xref: false,
            store: false,
            accepted_formats: KNOWN_FORMATS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The parsed repository metadata set.
#[derive(Debug, Clone)]
pub struct RepoMetadata {
    /// Apps, keyed by app id
    pub apps: BTreeMap<AppId, App>,
    /// Source libraries, keyed by name
    pub srclibs: BTreeMap<String, SrcLib>,
}

/// Read the full metadata set under `root`.
///
/// Srclibs are loaded before apps, since builds may reference them. App
/// files are processed `.txt` first, then `.json`, then `.yml`, each group
/// sorted by path; the first file parsed for an app id wins and any
/// further file for the same id is diagnosed.
///
/// With `options.xref`, every description is rendered once so dangling
/// `[[appid]]` references are caught here rather than downstream. With
/// `options.store`, the parsed set is persisted via [`store::write_index`].
///
/// A missing `metadata` directory yields an empty set; nothing is created
/// on disk except the index when storing.
pub fn read_metadata(
    root: &Path,
    options: &ReadOptions,
    warnings: &Warnings,
) -> Result<RepoMetadata, MetadataError> {
    let srclibs = srclib::read_srclibs(&root.join(SRCLIBS_DIR), warnings)?;

    let validators = fields::Validators::new()?;
    let mut apps: BTreeMap<AppId, App> = BTreeMap::new();

    for path in list_metadata_files(&root.join(METADATA_DIR))? {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let id = match AppId::new(stem) {
            Ok(id) => id,
            Err(e) => {
                warnings.emit(format!("Skipping '{}': {}", path.display(), e))?;
                continue;
            }
        };
        if apps.contains_key(&id) {
            warnings.emit(format!("Found multiple metadata files for {}", id))?;
            continue;
        }

        let Some(mut app) = parse_metadata_file(&path, &options.accepted_formats, warnings)?
        else {
            continue;
        };
        app.id = Some(id.clone());
        app.metadata_path = Some(path);
        post_parse(&mut app);
        validators.check(&app, warnings)?;
        apps.insert(id, app);
    }

    if options.xref {
        let resolver = |target: &str| match AppId::new(target) {
            Ok(id) if apps.contains_key(&id) => Ok((format!("app:{}", id), id.to_string())),
            _ => Err(MetadataError::Invalid(format!(
                "Cannot resolve app id {}",
                target
            ))),
        };
        for (id, app) in &apps {
            if let Err(e) =
                description::description_html(&app.description, Some(&resolver), warnings)
            {
                warnings.emit(format!("Problem with description of {} - {}", id, e))?;
            }
        }
    }

    if options.store {
        store::write_index(root, &apps)?;
    }

    Ok(RepoMetadata { apps, srclibs })
}

/// Parse one metadata file, dispatching on its extension.
///
/// Returns `Ok(None)` when the file was diagnosed and skipped under a
/// permissive warning mode (broken JSON/YAML, unknown extension).
pub fn parse_metadata_file(
    path: &Path,
    accepted: &[String],
    warnings: &Warnings,
) -> Result<Option<App>, MetadataError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !accepted.iter().any(|a| a == ext) {
        warnings.emit(format!(
            "'{}' is not an accepted format, convert to: {}",
            path.display(),
            accepted.join(", ")
        ))?;
    }

    let content = fs::read_to_string(path).map_err(|e| MetadataError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    match ext {
        "txt" => {
            let mut app = App::default();
            txt::parse_txt(&content, &path.display().to_string(), &mut app, warnings)?;
            Ok(Some(app))
        }
        "json" => match json::parse_json(&content, path) {
            Ok(app) => Ok(Some(app)),
            Err(e) => {
                warnings.emit(e.to_string())?;
                Ok(None)
            }
        },
        "yml" => match yaml::parse_yaml(&content, path) {
            Ok(app) => Ok(Some(app)),
            Err(e) => {
                warnings.emit(e.to_string())?;
                Ok(None)
            }
        },
        _ => {
            warnings.emit(format!("Unknown metadata format: {}", path.display()))?;
            Ok(None)
        }
    }
}

/// Render an app in the format implied by `path`'s extension.
///
/// Only `.txt` and `.yml` can be written. Returns `Ok(None)` when the
/// format was diagnosed as unwritable under a permissive warning mode.
pub fn render_metadata(
    path: &Path,
    app: &App,
    accepted: &[String],
    warnings: &Warnings,
) -> Result<Option<String>, MetadataError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !accepted.iter().any(|a| a == ext) {
        warnings.emit(format!(
            "Cannot write '{}', not an accepted format, use: {}",
            path.display(),
            accepted.join(", ")
        ))?;
    }

    match ext {
        "txt" => Ok(Some(txt::write_txt(app, warnings)?)),
        "yml" => Ok(Some(yaml::write_yaml(app)?)),
        _ => {
            warnings.emit(format!("Unknown metadata format: {}", path.display()))?;
            Ok(None)
        }
    }
}

/// Write an app's metadata to `path` in the format its extension implies.
pub fn write_metadata(
    path: &Path,
    app: &App,
    accepted: &[String],
    warnings: &Warnings,
) -> Result<(), MetadataError> {
    if let Some(content) = render_metadata(path, app, accepted, warnings)? {
        fs::write(path, content).map_err(|e| MetadataError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Metadata files under `dir`: `.txt` first, then `.json`, then `.yml`,
/// each group sorted by path. Other extensions are not metadata.
fn list_metadata_files(dir: &Path) -> Result<Vec<PathBuf>, MetadataError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|e| MetadataError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let all: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();

    let mut files = Vec::new();
    for ext in KNOWN_FORMATS {
        let mut group: Vec<PathBuf> = all
            .iter()
            .filter(|path| path.extension().is_some_and(|e| e == *ext))
            .cloned()
            .collect();
        group.sort();
        files.extend(group);
    }

    Ok(files)
}

/// Normalization applied after parsing, regardless of format.
fn post_parse(app: &mut App) {
    if app.categories.is_empty() {
        app.categories = vec!["None".to_string()];
    }

    // Stable sort by integer version code; codes that failed the integer
    // check keep their relative position at the front.
    app.builds
        .sort_by_key(|build| build.version_code.trim().parse::<i64>().unwrap_or(0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strict() -> Warnings {
        Warnings::new(WarningMode::Error, Verbosity::Quiet)
    }

    fn permissive() -> Warnings {
        Warnings::new(WarningMode::Ignore, Verbosity::Quiet)
    }

    fn write_file(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    const TXT_APP: &str = "\
Categories:System
License:MIT
Web Site:https://example.org
Source Code:https://example.org/src
Issue Tracker:https://example.org/issues
Summary:A txt app

Build:1.0,10
    commit=v1.0
    gradle=yes

Build:0.9,9
    commit=v0.9
    gradle=yes

Auto Update Mode:None
Update Check Mode:Tags
";

    const YML_APP: &str = "\
Categories:
  - Development
License: GPLv3
Summary: A yml app
";

    mod warning_mode {
        use super::*;

        #[test]
        fn from_str() {
            assert_eq!("warn".parse::<WarningMode>().unwrap(), WarningMode::Warn);
            assert_eq!("error".parse::<WarningMode>().unwrap(), WarningMode::Error);
            assert_eq!(
                "ignore".parse::<WarningMode>().unwrap(),
                WarningMode::Ignore
            );
            assert!("loud".parse::<WarningMode>().is_err());
        }

        #[test]
        fn display_roundtrip() {
            for mode in [WarningMode::Warn, WarningMode::Error, WarningMode::Ignore] {
                assert_eq!(mode.to_string().parse::<WarningMode>().unwrap(), mode);
            }
        }

        #[test]
        fn emit_escalates_only_in_error_mode() {
            assert!(strict().emit("boom").is_err());
            assert!(permissive().emit("boom").is_ok());
        }
    }

    mod reading {
        use super::*;

        #[test]
        fn empty_without_metadata_dir() {
            let temp = TempDir::new().unwrap();
            let repo = read_metadata(temp.path(), &ReadOptions::default(), &strict()).unwrap();
            assert!(repo.apps.is_empty());
            assert!(repo.srclibs.is_empty());
            // Reading creates nothing
            assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
        }

        #[test]
        fn reads_all_formats() {
            let temp = TempDir::new().unwrap();
            write_file(temp.path(), "metadata/org.example.txtapp.txt", TXT_APP);
            write_file(temp.path(), "metadata/org.example.ymlapp.yml", YML_APP);
            write_file(
                temp.path(),
                "metadata/org.example.jsonapp.json",
                r#"{"License": "Apache-2.0", "Summary": "A json app"}"#,
            );

            let repo = read_metadata(temp.path(), &ReadOptions::default(), &strict()).unwrap();
            assert_eq!(repo.apps.len(), 3);

            let txt_app = &repo.apps[&AppId::new("org.example.txtapp").unwrap()];
            assert_eq!(txt_app.summary, "A txt app");
            assert_eq!(
                txt_app.metadata_path.as_deref(),
                Some(temp.path().join("metadata/org.example.txtapp.txt").as_path())
            );

            let yml_app = &repo.apps[&AppId::new("org.example.ymlapp").unwrap()];
            assert_eq!(yml_app.license, "GPLv3");
        }

        #[test]
        fn builds_sorted_by_version_code() {
            let temp = TempDir::new().unwrap();
            write_file(temp.path(), "metadata/org.example.txtapp.txt", TXT_APP);

            let repo = read_metadata(temp.path(), &ReadOptions::default(), &strict()).unwrap();
            let app = &repo.apps[&AppId::new("org.example.txtapp").unwrap()];
            let codes: Vec<_> = app.builds.iter().map(|b| b.version_code.as_str()).collect();
            assert_eq!(codes, vec!["9", "10"]);
        }

        #[test]
        fn duplicate_app_id_diagnosed_and_first_wins() {
            let temp = TempDir::new().unwrap();
            write_file(temp.path(), "metadata/org.example.app.txt", TXT_APP);
            write_file(temp.path(), "metadata/org.example.app.yml", YML_APP);

            // Strict mode escalates
            let err =
                read_metadata(temp.path(), &ReadOptions::default(), &strict()).unwrap_err();
            assert!(err.to_string().contains("multiple metadata files"));

            // Permissive mode keeps the first (txt) parse
            let repo = read_metadata(temp.path(), &ReadOptions::default(), &permissive()).unwrap();
            let app = &repo.apps[&AppId::new("org.example.app").unwrap()];
            assert_eq!(app.summary, "A txt app");
        }

        #[test]
        fn unaccepted_format_diagnosed() {
            let temp = TempDir::new().unwrap();
            write_file(temp.path(), "metadata/org.example.app.yml", YML_APP);

            let options = ReadOptions {
                accepted_formats: vec!["txt".to_string()],
                ..Default::default()
            };
            let err = read_metadata(temp.path(), &options, &strict()).unwrap_err();
            assert!(err.to_string().contains("not an accepted format"));
        }

        #[test]
        fn broken_yaml_skipped_in_permissive_mode() {
            let temp = TempDir::new().unwrap();
            write_file(temp.path(), "metadata/org.example.bad.yml", "{{{{");
            write_file(temp.path(), "metadata/org.example.good.yml", YML_APP);

            let repo = read_metadata(temp.path(), &ReadOptions::default(), &permissive()).unwrap();
            assert_eq!(repo.apps.len(), 1);
            assert!(repo
                .apps
                .contains_key(&AppId::new("org.example.good").unwrap()));
        }

        #[test]
        fn field_validation_runs() {
            let temp = TempDir::new().unwrap();
            write_file(
                temp.path(),
                "metadata/org.example.app.yml",
                "WebSite: ftp://example.org\n",
            );

            let err = read_metadata(temp.path(), &ReadOptions::default(), &strict()).unwrap_err();
            assert!(err.to_string().contains("HTTP link"));
        }

        #[test]
        fn srclibs_loaded() {
            let temp = TempDir::new().unwrap();
            write_file(temp.path(), "metadata/org.example.app.yml", YML_APP);
            write_file(
                temp.path(),
                "srclibs/Helper.txt",
                "Repo Type:git\nRepo:https://example.org/helper.git\n",
            );

            let repo = read_metadata(temp.path(), &ReadOptions::default(), &strict()).unwrap();
            assert_eq!(repo.srclibs.len(), 1);
            assert_eq!(repo.srclibs["Helper"].repo_type, "git");
        }
    }

    mod xref {
        use super::*;

        fn repo_with_description(description: &str) -> TempDir {
            let temp = TempDir::new().unwrap();
            write_file(
                temp.path(),
                "metadata/org.example.app.yml",
                &format!("Summary: An app\nDescription: |\n  {}\n", description),
            );
            write_file(temp.path(), "metadata/org.example.other.yml", YML_APP);
            temp
        }

        #[test]
        fn valid_reference_passes() {
            let temp = repo_with_description("See also [[org.example.other]].");
            let options = ReadOptions {
                xref: true,
                ..Default::default()
            };
            assert!(read_metadata(temp.path(), &options, &strict()).is_ok());
        }

        #[test]
        fn dangling_reference_diagnosed() {
            let temp = repo_with_description("See also [[org.example.ghost]].");
            let options = ReadOptions {
                xref: true,
                ..Default::default()
            };
            let err = read_metadata(temp.path(), &options, &strict()).unwrap_err();
            assert!(err.to_string().contains("Problem with description"));
            assert!(err.to_string().contains("org.example.ghost"));
        }

        #[test]
        fn dangling_reference_ignored_without_xref() {
            let temp = repo_with_description("See also [[org.example.ghost]].");
            assert!(read_metadata(temp.path(), &ReadOptions::default(), &strict()).is_ok());
        }
    }

    mod storing {
        use super::*;

        #[test]
        fn store_writes_index() {
            let temp = TempDir::new().unwrap();
            write_file(temp.path(), "metadata/org.example.app.yml", YML_APP);

            let options = ReadOptions {
                store: true,
                ..Default::default()
            };
            read_metadata(temp.path(), &options, &strict()).unwrap();

            let index = store::load_index(&store::index_path(temp.path())).unwrap();
            assert_eq!(index.apps.len(), 1);
        }

        #[test]
        fn no_index_without_store() {
            let temp = TempDir::new().unwrap();
            write_file(temp.path(), "metadata/org.example.app.yml", YML_APP);

            read_metadata(temp.path(), &ReadOptions::default(), &strict()).unwrap();
            assert!(!temp.path().join(store::TMP_DIR).exists());
        }
    }

    mod writing {
        use super::*;

        #[test]
        fn json_is_not_writable() {
            let app = App::default();
            let err = render_metadata(
                Path::new("metadata/a.json"),
                &app,
                &ReadOptions::default().accepted_formats,
                &strict(),
            )
            .unwrap_err();
            assert!(err.to_string().contains("Unknown metadata format"));
        }

        #[test]
        fn txt_and_yml_render() {
            let app = App {
                summary: "An app".to_string(),
                ..Default::default()
            };
            let accepted = ReadOptions::default().accepted_formats;

            let txt = render_metadata(Path::new("a.txt"), &app, &accepted, &strict())
                .unwrap()
                .unwrap();
            assert!(txt.contains("Summary:An app"));

            let yml = render_metadata(Path::new("a.yml"), &app, &accepted, &strict())
                .unwrap()
                .unwrap();
            assert!(yml.contains("Summary: An app"));
        }

        #[test]
        fn write_creates_file() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("org.example.app.yml");
            let app = App {
                summary: "An app".to_string(),
                ..Default::default()
            };

            write_metadata(&path, &app, &ReadOptions::default().accepted_formats, &strict())
                .unwrap();
            assert!(path.exists());
        }
    }
}
