//! metadata::schema
//!
//! The application metadata model.
//!
//! # Structure
//!
//! [`App`] holds one application's metadata; [`Build`] one build recipe.
//! Field defaults match what a metadata file means when it omits the field
//! (e.g. an absent `Categories` means uncategorized, an absent `License`
//! means "Unknown").
//!
//! # Serde profile
//!
//! The serde derives serve the `.json`/`.yml` readers, the `.yml` writer and
//! the persisted index. Canonical (unspaced) key names are used on the wire,
//! with aliases for the spaced spellings the older formats allowed. Empty
//! values are dropped on serialization; bookkeeping fields (`id`,
//! `metadata_path`, `comments`) never appear on the wire at all.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::de;
use crate::core::types::AppId;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Where a preserved `.txt` comment block belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentTarget {
    /// Before the named field (canonical name)
    Field(String),
    /// Before the build with this version code
    Build(String),
    /// At the end of the file
    Eof,
}

/// One application's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct App {
    #[serde(
        rename = "Disabled",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub disabled: Option<String>,

    #[serde(
        rename = "AntiFeatures",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "de::string_list"
    )]
    pub anti_features: Vec<String>,

    #[serde(
        rename = "Provides",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub provides: Option<String>,

    #[serde(
        rename = "Categories",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "de::categories"
    )]
    pub categories: Vec<String>,

    #[serde(
        rename = "License",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub license: String,

    #[serde(
        rename = "AuthorName",
        alias = "Author Name",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub author_name: Option<String>,

    #[serde(
        rename = "AuthorEmail",
        alias = "Author Email",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub author_email: Option<String>,

    #[serde(
        rename = "AuthorWebSite",
        alias = "Author Web Site",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub author_web_site: Option<String>,

    #[serde(
        rename = "WebSite",
        alias = "Web Site",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub web_site: String,

    #[serde(
        rename = "SourceCode",
        alias = "Source Code",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub source_code: String,

    #[serde(
        rename = "IssueTracker",
        alias = "Issue Tracker",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub issue_tracker: String,

    #[serde(
        rename = "Changelog",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub changelog: String,

    #[serde(
        rename = "Donate",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub donate: Option<String>,

    #[serde(
        rename = "FlattrID",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub flattr_id: Option<String>,

    #[serde(
        rename = "Bitcoin",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub bitcoin: Option<String>,

    #[serde(
        rename = "Litecoin",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub litecoin: Option<String>,

    #[serde(
        rename = "Name",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub name: Option<String>,

    #[serde(
        rename = "AutoName",
        alias = "Auto Name",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub auto_name: String,

    #[serde(
        rename = "Summary",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub summary: String,

    #[serde(
        rename = "Description",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::multiline"
    )]
    pub description: String,

    #[serde(
        rename = "RequiresRoot",
        alias = "Requires Root",
        skip_serializing_if = "is_false",
        deserialize_with = "de::bool_flexible"
    )]
    pub requires_root: bool,

    #[serde(
        rename = "RepoType",
        alias = "Repo Type",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub repo_type: String,

    #[serde(
        rename = "Repo",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub repo: String,

    #[serde(
        rename = "Binaries",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub binaries: Option<String>,

    #[serde(
        rename = "MaintainerNotes",
        alias = "Maintainer Notes",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::multiline"
    )]
    pub maintainer_notes: String,

    #[serde(
        rename = "ArchivePolicy",
        alias = "Archive Policy",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub archive_policy: Option<String>,

    #[serde(
        rename = "AutoUpdateMode",
        alias = "Auto Update Mode",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub auto_update_mode: String,

    #[serde(
        rename = "UpdateCheckMode",
        alias = "Update Check Mode",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub update_check_mode: String,

    #[serde(
        rename = "UpdateCheckIgnore",
        alias = "Update Check Ignore",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub update_check_ignore: Option<String>,

    #[serde(
        rename = "VercodeOperation",
        alias = "Vercode Operation",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub vercode_operation: Option<String>,

    #[serde(
        rename = "UpdateCheckName",
        alias = "Update Check Name",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub update_check_name: Option<String>,

    #[serde(
        rename = "UpdateCheckData",
        alias = "Update Check Data",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub update_check_data: Option<String>,

    #[serde(
        rename = "CurrentVersion",
        alias = "Current Version",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub current_version: String,

    #[serde(
        rename = "CurrentVersionCode",
        alias = "Current Version Code",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::opt_string"
    )]
    pub current_version_code: Option<String>,

    #[serde(
        rename = "NoSourceSince",
        alias = "No Source Since",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub no_source_since: String,

    /// Build recipes, sorted by version code after parsing.
    #[serde(rename = "builds", skip_serializing_if = "Vec::is_empty")]
    pub builds: Vec<Build>,

    /// App id, derived from the metadata file stem.
    #[serde(skip)]
    pub id: Option<AppId>,

    /// Path the metadata was read from.
    #[serde(skip)]
    pub metadata_path: Option<PathBuf>,

    /// Comment blocks preserved from the `.txt` format.
    #[serde(skip)]
    pub comments: Vec<(CommentTarget, Vec<String>)>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            disabled: None,
            anti_features: Vec::new(),
            provides: None,
            categories: vec!["None".to_string()],
            license: "Unknown".to_string(),
            author_name: None,
            author_email: None,
            author_web_site: None,
            web_site: String::new(),
            source_code: String::new(),
            issue_tracker: String::new(),
            changelog: String::new(),
            donate: None,
            flattr_id: None,
            bitcoin: None,
            litecoin: None,
            name: None,
            auto_name: String::new(),
            summary: String::new(),
            description: String::new(),
            requires_root: false,
            repo_type: String::new(),
            repo: String::new(),
            binaries: None,
            maintainer_notes: String::new(),
            archive_policy: None,
            auto_update_mode: "None".to_string(),
            update_check_mode: "None".to_string(),
            update_check_ignore: None,
            vercode_operation: None,
            update_check_name: None,
            update_check_data: None,
            current_version: String::new(),
            current_version_code: None,
            no_source_since: String::new(),
            builds: Vec::new(),
            id: None,
            metadata_path: None,
            comments: Vec::new(),
        }
    }
}

impl App {
    /// Assign a string-typed field by canonical name.
    ///
    /// Returns `false` if the name is not a known string-typed field.
    /// `RequiresRoot` is not handled here; the `.txt` parser decodes its
    /// boolean value with a diagnostic.
    pub fn set_string_field(&mut self, name: &str, value: &str) -> bool {
        let v = value.to_string();
        match name {
            "Disabled" => self.disabled = Some(v),
            "Provides" => self.provides = Some(v),
            "License" => self.license = v,
            "AuthorName" => self.author_name = Some(v),
            "AuthorEmail" => self.author_email = Some(v),
            "AuthorWebSite" => self.author_web_site = Some(v),
            "WebSite" => self.web_site = v,
            "SourceCode" => self.source_code = v,
            "IssueTracker" => self.issue_tracker = v,
            "Changelog" => self.changelog = v,
            "Donate" => self.donate = Some(v),
            "FlattrID" => self.flattr_id = Some(v),
            "Bitcoin" => self.bitcoin = Some(v),
            "Litecoin" => self.litecoin = Some(v),
            "Name" => self.name = Some(v),
            "AutoName" => self.auto_name = v,
            "Summary" => self.summary = v,
            "RepoType" => self.repo_type = v,
            "Repo" => self.repo = v,
            "Binaries" => self.binaries = Some(v),
            "ArchivePolicy" => self.archive_policy = Some(v),
            "AutoUpdateMode" => self.auto_update_mode = v,
            "UpdateCheckMode" => self.update_check_mode = v,
            "UpdateCheckIgnore" => self.update_check_ignore = Some(v),
            "VercodeOperation" => self.vercode_operation = Some(v),
            "UpdateCheckName" => self.update_check_name = Some(v),
            "UpdateCheckData" => self.update_check_data = Some(v),
            "CurrentVersion" => self.current_version = v,
            "CurrentVersionCode" => self.current_version_code = Some(v),
            "NoSourceSince" => self.no_source_since = v,
            _ => return false,
        }
        true
    }

    /// Assign a list-typed field by canonical name.
    pub fn set_list_field(&mut self, name: &str, values: Vec<String>) -> bool {
        match name {
            "Categories" => self.categories = values,
            "AntiFeatures" => self.anti_features = values,
            _ => return false,
        }
        true
    }

    /// Assign a multiline field by canonical name.
    pub fn set_multiline_field(&mut self, name: &str, value: String) -> bool {
        match name {
            "Description" => self.description = value,
            "MaintainerNotes" => self.maintainer_notes = value,
            _ => return false,
        }
        true
    }

    /// Values of a field for format validation, by canonical name.
    ///
    /// Unset fields yield no values; list fields yield one value per
    /// element.
    pub fn validation_values(&self, name: &str) -> Vec<&str> {
        fn opt(value: &Option<String>) -> Vec<&str> {
            value.as_deref().into_iter().collect()
        }

        match name {
            "FlattrID" => opt(&self.flattr_id),
            "WebSite" => vec![self.web_site.as_str()],
            "SourceCode" => vec![self.source_code.as_str()],
            "IssueTracker" => vec![self.issue_tracker.as_str()],
            "Changelog" => vec![self.changelog.as_str()],
            "Donate" => opt(&self.donate),
            "AuthorEmail" => opt(&self.author_email),
            "Bitcoin" => opt(&self.bitcoin),
            "Litecoin" => opt(&self.litecoin),
            "RepoType" => vec![self.repo_type.as_str()],
            "Binaries" => opt(&self.binaries),
            "ArchivePolicy" => opt(&self.archive_policy),
            "AntiFeatures" => self.anti_features.iter().map(|s| s.as_str()).collect(),
            "AutoUpdateMode" => vec![self.auto_update_mode.as_str()],
            "UpdateCheckMode" => vec![self.update_check_mode.as_str()],
            _ => Vec::new(),
        }
    }

    /// Record a preserved comment block.
    pub fn add_comments(&mut self, target: CommentTarget, lines: Vec<String>) {
        if !lines.is_empty() {
            self.comments.push((target, lines));
        }
    }

    /// Comment lines preserved before the given target.
    pub fn comments_for(&self, target: &CommentTarget) -> &[String] {
        self.comments
            .iter()
            .find(|(t, _)| t == target)
            .map(|(_, lines)| lines.as_slice())
            .unwrap_or(&[])
    }
}

/// How a build is compiled (or its output obtained).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Ant,
    Maven,
    Gradle,
    Kivy,
    Buildozer,
    Raw,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Ant => "ant",
            Method::Maven => "maven",
            Method::Gradle => "gradle",
            Method::Kivy => "kivy",
            Method::Buildozer => "buildozer",
            Method::Raw => "raw",
        };
        write!(f, "{}", name)
    }
}

/// One build recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Build {
    #[serde(
        rename = "versionName",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub version_name: String,

    #[serde(
        rename = "versionCode",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "de::string"
    )]
    pub version_code: String,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string")]
    pub disable: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string")]
    pub commit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string")]
    pub subdir: Option<String>,

    #[serde(skip_serializing_if = "is_false", deserialize_with = "de::bool_flexible")]
    pub submodules: bool,

    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "de::string")]
    pub init: String,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "de::flag_list")]
    pub patch: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "de::flag_list")]
    pub gradle: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string")]
    pub maven: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string")]
    pub kivy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string")]
    pub buildozer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string")]
    pub output: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "de::flag_list")]
    pub srclibs: Vec<String>,

    #[serde(skip_serializing_if = "is_false", deserialize_with = "de::bool_flexible")]
    pub oldsdkloc: bool,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string")]
    pub encoding: Option<String>,

    #[serde(skip_serializing_if = "is_false", deserialize_with = "de::bool_flexible")]
    pub forceversion: bool,

    #[serde(skip_serializing_if = "is_false", deserialize_with = "de::bool_flexible")]
    pub forcevercode: bool,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "de::flag_list")]
    pub rm: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "de::flag_list")]
    pub extlibs: Vec<String>,

    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "de::string")]
    pub prebuild: String,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "de::flag_list")]
    pub androidupdate: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string")]
    pub target: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "de::flag_list")]
    pub scanignore: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "de::flag_list")]
    pub scandelete: Vec<String>,

    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "de::string")]
    pub build: String,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "de::flag_list")]
    pub buildjni: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string")]
    pub ndk: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "de::flag_list")]
    pub preassemble: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "de::flag_list")]
    pub gradleprops: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "de::flag_list")]
    pub antcommands: Vec<String>,

    #[serde(skip_serializing_if = "is_false", deserialize_with = "de::bool_flexible")]
    pub novcheck: bool,
}

/// A build flag value as laid out in the `.txt` format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlagValue<'a> {
    /// Single-line string value
    Str(&'a str),
    /// Comma-joined list value
    List(&'a [String]),
    /// Shell script, split on `&&` across continued lines
    Script(&'a str),
    /// Presence marker, written as `yes`
    Bool,
}

impl Build {
    /// Whether this build is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disable.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Assign a string- or script-typed flag by name.
    ///
    /// Returns `false` if the name is not a known scalar flag.
    pub fn set_scalar_flag(&mut self, name: &str, value: &str) -> bool {
        let v = value.to_string();
        match name {
            "disable" => self.disable = Some(v),
            "commit" => self.commit = Some(v),
            "subdir" => self.subdir = Some(v),
            "init" => self.init = v,
            "maven" => self.maven = Some(v),
            "kivy" => self.kivy = Some(v),
            "buildozer" => self.buildozer = Some(v),
            "output" => self.output = Some(v),
            "encoding" => self.encoding = Some(v),
            "prebuild" => self.prebuild = v,
            "target" => self.target = Some(v),
            "build" => self.build = v,
            "ndk" => self.ndk = Some(v),
            _ => return false,
        }
        true
    }

    /// Assign a list-typed flag by name.
    pub fn set_list_flag(&mut self, name: &str, values: Vec<String>) -> bool {
        match name {
            "patch" => self.patch = values,
            "gradle" => self.gradle = values,
            "srclibs" => self.srclibs = values,
            "rm" => self.rm = values,
            "extlibs" => self.extlibs = values,
            "androidupdate" => self.androidupdate = values,
            "scanignore" => self.scanignore = values,
            "scandelete" => self.scandelete = values,
            "buildjni" => self.buildjni = values,
            "preassemble" => self.preassemble = values,
            "gradleprops" => self.gradleprops = values,
            "antcommands" => self.antcommands = values,
            _ => return false,
        }
        true
    }

    /// Assign a bool-typed flag by name.
    pub fn set_bool_flag(&mut self, name: &str, value: bool) -> bool {
        match name {
            "submodules" => self.submodules = value,
            "oldsdkloc" => self.oldsdkloc = value,
            "forceversion" => self.forceversion = value,
            "forcevercode" => self.forcevercode = value,
            "novcheck" => self.novcheck = value,
            _ => return false,
        }
        true
    }

    /// The value of a flag for `.txt` layout, or `None` when unset/empty.
    pub fn flag_value(&self, name: &str) -> Option<FlagValue<'_>> {
        fn opt(value: &Option<String>) -> Option<FlagValue<'_>> {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(FlagValue::Str)
        }

        fn list(values: &[String]) -> Option<FlagValue<'_>> {
            if values.is_empty() {
                None
            } else {
                Some(FlagValue::List(values))
            }
        }

        fn script(value: &str) -> Option<FlagValue<'_>> {
            if value.is_empty() {
                None
            } else {
                Some(FlagValue::Script(value))
            }
        }

        fn flag(set: bool) -> Option<FlagValue<'static>> {
            set.then_some(FlagValue::Bool)
        }

        match name {
            "disable" => opt(&self.disable),
            "commit" => opt(&self.commit),
            "subdir" => opt(&self.subdir),
            "submodules" => flag(self.submodules),
            "init" => script(&self.init),
            "patch" => list(&self.patch),
            "gradle" => list(&self.gradle),
            "maven" => opt(&self.maven),
            "kivy" => opt(&self.kivy),
            "buildozer" => opt(&self.buildozer),
            "output" => opt(&self.output),
            "srclibs" => list(&self.srclibs),
            "oldsdkloc" => flag(self.oldsdkloc),
            "encoding" => opt(&self.encoding),
            "forceversion" => flag(self.forceversion),
            "forcevercode" => flag(self.forcevercode),
            "rm" => list(&self.rm),
            "extlibs" => list(&self.extlibs),
            "prebuild" => script(&self.prebuild),
            "androidupdate" => list(&self.androidupdate),
            "target" => opt(&self.target),
            "scanignore" => list(&self.scanignore),
            "scandelete" => list(&self.scandelete),
            "build" => script(&self.build),
            "buildjni" => list(&self.buildjni),
            "ndk" => opt(&self.ndk),
            "preassemble" => list(&self.preassemble),
            "gradleprops" => list(&self.gradleprops),
            "antcommands" => list(&self.antcommands),
            "novcheck" => flag(self.novcheck),
            _ => None,
        }
    }

    /// The method used to compile this build.
    pub fn build_method(&self) -> Method {
        if self.maven.as_deref().is_some_and(|v| !v.is_empty()) {
            Method::Maven
        } else if !self.gradle.is_empty() {
            Method::Gradle
        } else if self.kivy.as_deref().is_some_and(|v| !v.is_empty()) {
            Method::Kivy
        } else if self.buildozer.as_deref().is_some_and(|v| !v.is_empty()) {
            Method::Buildozer
        } else if self.output.is_some() {
            Method::Raw
        } else {
            Method::Ant
        }
    }

    /// Like [`build_method`](Self::build_method), but a declared output
    /// takes priority over any build system.
    pub fn output_method(&self) -> Method {
        if self.output.is_some() {
            Method::Raw
        } else {
            match self.build_method() {
                Method::Raw => Method::Ant,
                method => method,
            }
        }
    }
}
