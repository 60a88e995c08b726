//! metadata::fields
//!
//! Field and flag classification, plus regex validation of field values.
//!
//! # Field names
//!
//! The `.txt` format writes some field names with spaces ("Auto Update
//! Mode"); the canonical attribute name strips them ("AutoUpdateMode").
//! [`canonical_name`] performs the translation; [`is_app_field`] checks a
//! raw (possibly spaced) name against the known field set.

use regex::Regex;

use super::schema::App;
use super::{MetadataError, Warnings};

/// How an app field's value is laid out in a metadata file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Single-line string value
    String,
    /// Comma/semicolon separated list
    List,
    /// Multi-line block terminated by a lone `.`
    Multiline,
    /// Legacy single-line build recipe
    Build,
    /// Indented build flag block
    BuildV2,
    /// Recognized but discarded
    Obsolete,
}

/// How a build flag's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagType {
    String,
    List,
    Script,
    Bool,
}

/// App fields as they may appear in a `.txt` file, spaces included.
pub const APP_FIELDS: &[&str] = &[
    "Disabled",
    "AntiFeatures",
    "Provides",
    "Categories",
    "License",
    "Author Name",
    "Author Email",
    "Author Web Site",
    "Web Site",
    "Source Code",
    "Issue Tracker",
    "Changelog",
    "Donate",
    "FlattrID",
    "Bitcoin",
    "Litecoin",
    "Name",
    "Auto Name",
    "Summary",
    "Description",
    "Requires Root",
    "Repo Type",
    "Repo",
    "Binaries",
    "Maintainer Notes",
    "Archive Policy",
    "Auto Update Mode",
    "Update Check Mode",
    "Update Check Ignore",
    "Vercode Operation",
    "Update Check Name",
    "Update Check Data",
    "Current Version",
    "Current Version Code",
    "No Source Since",
    "Build",
];

/// Build flags in the order they are laid out in `.txt` files.
pub const BUILD_FLAGS_ORDER: &[&str] = &[
    "disable",
    "commit",
    "subdir",
    "submodules",
    "init",
    "patch",
    "gradle",
    "maven",
    "kivy",
    "buildozer",
    "output",
    "srclibs",
    "oldsdkloc",
    "encoding",
    "forceversion",
    "forcevercode",
    "rm",
    "extlibs",
    "prebuild",
    "androidupdate",
    "target",
    "scanignore",
    "scandelete",
    "build",
    "buildjni",
    "ndk",
    "preassemble",
    "gradleprops",
    "antcommands",
    "novcheck",
];

/// Check a raw (possibly spaced) field name against the known field set.
pub fn is_app_field(name: &str) -> bool {
    APP_FIELDS.contains(&name)
}

/// Translate a field name to its canonical attribute form (spaces removed).
pub fn canonical_name(name: &str) -> String {
    name.replace(' ', "")
}

/// Classify an app field by its canonical name.
pub fn field_type(canonical: &str) -> FieldType {
    match canonical {
        "Description" | "MaintainerNotes" => FieldType::Multiline,
        "Categories" | "AntiFeatures" => FieldType::List,
        "BuildVersion" => FieldType::Build,
        "Build" => FieldType::BuildV2,
        "UseBuilt" => FieldType::Obsolete,
        _ => FieldType::String,
    }
}

/// Classify a build flag by name.
pub fn flag_type(name: &str) -> FlagType {
    match name {
        "extlibs" | "srclibs" | "patch" | "rm" | "buildjni" | "preassemble" | "androidupdate"
        | "scanignore" | "scandelete" | "gradle" | "antcommands" | "gradleprops" => FlagType::List,
        "init" | "prebuild" | "build" => FlagType::Script,
        "submodules" | "oldsdkloc" | "forceversion" | "forcevercode" | "novcheck" => FlagType::Bool,
        _ => FlagType::String,
    }
}

/// Split a list-typed value on the legacy `,`/`;` separators, dropping
/// empty entries and trimming whitespace.
pub fn split_list_values(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode a yes/true/no/false value (case-tolerant on the first letter).
///
/// Returns `None` for anything unrecognized.
pub fn decode_bool(value: &str) -> Option<bool> {
    if value.starts_with("Yes")
        || value.starts_with("yes")
        || value.starts_with("True")
        || value.starts_with("true")
    {
        Some(true)
    } else if value.starts_with("No")
        || value.starts_with("no")
        || value.starts_with("False")
        || value.starts_with("false")
    {
        Some(false)
    } else {
        None
    }
}

/// A single value-format validator over one or more app fields.
struct FieldValidator {
    /// The long name of the value type
    name: &'static str,
    /// The pattern source, kept for diagnostics
    matching: &'static str,
    /// Compiled pattern
    compiled: Regex,
    /// Canonical names of the fields checked by this validator
    fields: &'static [&'static str],
}

impl FieldValidator {
    fn new(
        name: &'static str,
        matching: &'static str,
        fields: &'static [&'static str],
    ) -> Result<Self, MetadataError> {
        Ok(Self {
            name,
            matching,
            compiled: Regex::new(matching)?,
            fields,
        })
    }

    fn check(&self, app: &App, warnings: &Warnings) -> Result<(), MetadataError> {
        let appid = app
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "(unknown)".to_string());

        for field in self.fields {
            for value in app.validation_values(field) {
                if value.is_empty() {
                    continue;
                }
                if !self.compiled.is_match(value) {
                    warnings.emit(format!(
                        "'{}' is not a valid {} in {}. Regex pattern: {}",
                        value, self.name, appid, self.matching
                    ))?;
                }
            }
        }

        Ok(())
    }
}

/// The full validator set, compiled once per read.
pub struct Validators {
    validators: Vec<FieldValidator>,
}

impl Validators {
    /// Compile the validator set.
    pub fn new() -> Result<Self, MetadataError> {
        let validators = vec![
            FieldValidator::new("Hexadecimal", r"^[0-9a-f]+$", &["FlattrID"])?,
            FieldValidator::new(
                "HTTP link",
                r"^http[s]?://",
                &[
                    "WebSite",
                    "SourceCode",
                    "IssueTracker",
                    "Changelog",
                    "Donate",
                ],
            )?,
            FieldValidator::new(
                "Email",
                r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$",
                &["AuthorEmail"],
            )?,
            FieldValidator::new("Bitcoin address", r"^[a-zA-Z0-9]{27,34}$", &["Bitcoin"])?,
            FieldValidator::new("Litecoin address", r"^L[a-zA-Z0-9]{33}$", &["Litecoin"])?,
            FieldValidator::new(
                "Repo Type",
                r"^(git|git-svn|svn|hg|bzr|srclib)$",
                &["RepoType"],
            )?,
            FieldValidator::new("Binaries", r"^http[s]?://", &["Binaries"])?,
            FieldValidator::new("Archive Policy", r"^[0-9]+ versions$", &["ArchivePolicy"])?,
            FieldValidator::new(
                "Anti-Feature",
                r"^(Ads|Tracking|NonFreeNet|NonFreeDep|NonFreeAdd|UpstreamNonFree|NonFreeAssets|KnownVuln)$",
                &["AntiFeatures"],
            )?,
            FieldValidator::new("Auto Update Mode", r"^(Version .+|None)$", &["AutoUpdateMode"])?,
            FieldValidator::new(
                "Update Check Mode",
                r"^(Tags|Tags .+|RepoManifest|RepoManifest/.+|RepoTrunk|HTTP|Static|None)$",
                &["UpdateCheckMode"],
            )?,
        ];

        Ok(Self { validators })
    }

    /// Check one app's field values for format errors.
    pub fn check(&self, app: &App, warnings: &Warnings) -> Result<(), MetadataError> {
        for validator in &self.validators {
            validator.check(app, warnings)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AppId;
    use crate::metadata::WarningMode;
    use crate::ui::output::Verbosity;

    fn strict() -> Warnings {
        Warnings::new(WarningMode::Error, Verbosity::Quiet)
    }

    mod classification {
        use super::*;

        #[test]
        fn canonical_strips_spaces() {
            assert_eq!(canonical_name("Auto Update Mode"), "AutoUpdateMode");
            assert_eq!(canonical_name("Repo"), "Repo");
        }

        #[test]
        fn field_types() {
            assert_eq!(field_type("Description"), FieldType::Multiline);
            assert_eq!(field_type("Categories"), FieldType::List);
            assert_eq!(field_type("BuildVersion"), FieldType::Build);
            assert_eq!(field_type("Build"), FieldType::BuildV2);
            assert_eq!(field_type("UseBuilt"), FieldType::Obsolete);
            assert_eq!(field_type("License"), FieldType::String);
        }

        #[test]
        fn flag_types() {
            assert_eq!(flag_type("srclibs"), FlagType::List);
            assert_eq!(flag_type("prebuild"), FlagType::Script);
            assert_eq!(flag_type("novcheck"), FlagType::Bool);
            assert_eq!(flag_type("commit"), FlagType::String);
        }

        #[test]
        fn known_fields() {
            assert!(is_app_field("Auto Update Mode"));
            assert!(is_app_field("Build"));
            assert!(!is_app_field("Build Version"));
            assert!(!is_app_field("Bogus"));
        }
    }

    mod list_values {
        use super::*;

        #[test]
        fn splits_on_comma_and_semicolon() {
            assert_eq!(split_list_values("a,b;c"), vec!["a", "b", "c"]);
        }

        #[test]
        fn trims_and_drops_empties() {
            assert_eq!(split_list_values(" a , ,b,"), vec!["a", "b"]);
            assert!(split_list_values("").is_empty());
        }
    }

    mod bools {
        use super::*;

        #[test]
        fn accepted_spellings() {
            assert_eq!(decode_bool("yes"), Some(true));
            assert_eq!(decode_bool("Yes"), Some(true));
            assert_eq!(decode_bool("true"), Some(true));
            assert_eq!(decode_bool("no"), Some(false));
            assert_eq!(decode_bool("False"), Some(false));
        }

        #[test]
        fn garbage_rejected() {
            assert_eq!(decode_bool("maybe"), None);
            assert_eq!(decode_bool(""), None);
        }
    }

    mod validation {
        use super::*;

        fn sample_app() -> App {
            let mut app = App::default();
            app.id = Some(AppId::new("org.example.app").unwrap());
            app
        }

        #[test]
        fn clean_app_passes() {
            let validators = Validators::new().unwrap();
            let mut app = sample_app();
            app.web_site = "https://example.org".to_string();
            app.repo_type = "git".to_string();
            assert!(validators.check(&app, &strict()).is_ok());
        }

        #[test]
        fn empty_values_pass() {
            let validators = Validators::new().unwrap();
            let app = sample_app();
            assert!(validators.check(&app, &strict()).is_ok());
        }

        #[test]
        fn bad_website_rejected() {
            let validators = Validators::new().unwrap();
            let mut app = sample_app();
            app.web_site = "ftp://example.org".to_string();
            let err = validators.check(&app, &strict()).unwrap_err();
            assert!(err.to_string().contains("HTTP link"));
            assert!(err.to_string().contains("org.example.app"));
        }

        #[test]
        fn bad_repo_type_rejected() {
            let validators = Validators::new().unwrap();
            let mut app = sample_app();
            app.repo_type = "cvs".to_string();
            assert!(validators.check(&app, &strict()).is_err());
        }

        #[test]
        fn each_anti_feature_checked() {
            let validators = Validators::new().unwrap();
            let mut app = sample_app();
            app.anti_features = vec!["Ads".to_string(), "Bogus".to_string()];
            assert!(validators.check(&app, &strict()).is_err());
        }

        #[test]
        fn update_check_mode_variants() {
            let validators = Validators::new().unwrap();
            for mode in ["Tags", "Tags ^v", "RepoManifest", "RepoManifest/stable", "None"] {
                let mut app = sample_app();
                app.update_check_mode = mode.to_string();
                assert!(
                    validators.check(&app, &strict()).is_ok(),
                    "mode {} should be valid",
                    mode
                );
            }

            let mut app = sample_app();
            app.update_check_mode = "Sometimes".to_string();
            assert!(validators.check(&app, &strict()).is_err());
        }

        #[test]
        fn ignored_mode_swallows_problems() {
            let validators = Validators::new().unwrap();
            let mut app = sample_app();
            app.web_site = "gopher://example.org".to_string();
            let warnings = Warnings::new(WarningMode::Ignore, Verbosity::Quiet);
            assert!(validators.check(&app, &warnings).is_ok());
        }
    }
}
