//! metadata::json
//!
//! Parser for the `.json` metadata format.
//!
//! JSON metadata carries the same keys as the YAML format (with the spaced
//! spellings of the `.txt` format accepted as aliases). `Description` and
//! `Maintainer Notes` may be given as arrays of lines; numeric scalars are
//! stringified. Both are handled by the schema's deserializers.

use std::path::Path;

use super::schema::App;
use super::MetadataError;

/// Parse `.json` metadata.
pub fn parse_json(content: &str, path: &Path) -> Result<App, MetadataError> {
    serde_json::from_str(content).map_err(|e| MetadataError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_fields() {
        let content = r#"{
            "Categories": ["System"],
            "License": "MIT",
            "Web Site": "https://example.org",
            "Summary": "An app"
        }"#;

        let app = parse_json(content, Path::new("a.json")).unwrap();
        assert_eq!(app.categories, vec!["System"]);
        assert_eq!(app.license, "MIT");
        assert_eq!(app.web_site, "https://example.org");
        assert_eq!(app.summary, "An app");
    }

    #[test]
    fn description_as_lines() {
        let content = r#"{
            "Description": ["First line.", "", "Second para."],
            "Maintainer Notes": ["note one", "note two"]
        }"#;

        let app = parse_json(content, Path::new("a.json")).unwrap();
        assert_eq!(app.description, "First line.\n\nSecond para.");
        assert_eq!(app.maintainer_notes, "note one\nnote two");
    }

    #[test]
    fn builds_parsed() {
        let content = r#"{
            "builds": [
                {"versionName": "1.0", "versionCode": "1", "commit": "v1.0", "gradle": ["yes"]}
            ]
        }"#;

        let app = parse_json(content, Path::new("a.json")).unwrap();
        assert_eq!(app.builds.len(), 1);
        assert_eq!(app.builds[0].version_code, "1");
        assert_eq!(app.builds[0].gradle, vec!["yes"]);
    }

    #[test]
    fn numbers_stringified() {
        let content = r#"{"Current Version Code": 42}"#;
        let app = parse_json(content, Path::new("a.json")).unwrap();
        assert_eq!(app.current_version_code.as_deref(), Some("42"));
    }

    #[test]
    fn malformed_rejected() {
        let result = parse_json("{not json", Path::new("a.json"));
        assert!(matches!(result, Err(MetadataError::Parse { .. })));
    }

    #[test]
    fn unknown_keys_rejected() {
        let result = parse_json(r#"{"Shiny": true}"#, Path::new("a.json"));
        assert!(result.is_err());
    }
}
