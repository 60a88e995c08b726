//! metadata::txt
//!
//! Parser and writer for the `.txt` metadata format.
//!
//! # Format
//!
//! Line-oriented `Field:Value` pairs with a few extensions:
//! - `#` comments, preserved and re-attached on write
//! - Multiline fields (`Description`, `Maintainer Notes`) terminated by a
//!   lone `.`
//! - Legacy single-line build recipes (`Build Version:name,code,commit,...`)
//!   with `\` line continuation and `\,` escaping
//! - Build blocks: `Build:name,code` followed by indented `flag=value`
//!   lines, again with `\` continuation
//!
//! A build block ends at the first non-indented line, which is then
//! processed as a regular field line. A build block that is still open at
//! end of file is diagnosed and its recipe dropped.

use std::collections::HashSet;

use super::description::description_txt;
use super::fields::{
    canonical_name, decode_bool, field_type, flag_type, is_app_field, split_list_values,
    FieldType, FlagType, BUILD_FLAGS_ORDER,
};
use super::schema::{App, Build, CommentTarget, FlagValue};
use super::{MetadataError, Warnings};

/// Parser mode, driven line by line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    /// Between fields
    Free,
    /// Inside a multiline field (canonical field name)
    Multiline(String),
    /// Continuing a legacy single-line build recipe
    Continuation,
    /// Inside an indented build flag block
    BuildBlock,
}

/// Parse `.txt` metadata into `app`.
///
/// `source` is the path label used in diagnostics. Existing builds on the
/// app are discarded.
pub fn parse_txt(
    content: &str,
    source: &str,
    app: &mut App,
    warnings: &Warnings,
) -> Result<(), MetadataError> {
    let mut parser = TxtParser {
        app,
        warnings,
        source,
        mode: Mode::Free,
        build_lines: Vec::new(),
        multiline_lines: Vec::new(),
        cur_comments: Vec::new(),
        build: None,
        vc_seen: HashSet::new(),
    };
    parser.run(content)
}

struct TxtParser<'a> {
    app: &'a mut App,
    warnings: &'a Warnings,
    source: &'a str,
    mode: Mode,
    build_lines: Vec<String>,
    multiline_lines: Vec<String>,
    cur_comments: Vec<String>,
    build: Option<Build>,
    vc_seen: HashSet<String>,
}

impl TxtParser<'_> {
    fn run(&mut self, content: &str) -> Result<(), MetadataError> {
        self.app.builds.clear();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let line_desc = format!("{}:{}", self.source, index + 1);

            if self.mode == Mode::BuildBlock {
                self.build_block_line(line, &line_desc)?;
            }

            // A build block ending on this line leaves it to be processed
            // as a regular field line.
            match self.mode.clone() {
                Mode::Free => self.free_line(line, &line_desc)?,
                Mode::Multiline(field) => self.multiline_line(line, &field),
                Mode::Continuation => self.continuation_line(line, &line_desc)?,
                Mode::BuildBlock => {}
            }
        }

        let pending = std::mem::take(&mut self.cur_comments);
        self.app.add_comments(CommentTarget::Eof, pending);

        match &self.mode {
            Mode::Free => {}
            Mode::Multiline(field) => {
                self.warnings
                    .emit(format!("{} not terminated in {}", field, self.source))?;
            }
            Mode::Continuation => {
                self.warnings
                    .emit(format!("Unterminated continuation in {}", self.source))?;
            }
            Mode::BuildBlock => {
                self.warnings
                    .emit(format!("Unterminated build in {}", self.source))?;
            }
        }

        Ok(())
    }

    fn build_block_line(&mut self, line: &str, line_desc: &str) -> Result<(), MetadataError> {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(stripped) = line.strip_suffix('\\') {
                self.build_lines.push(stripped.trim_start().to_string());
            } else {
                self.build_lines.push(line.trim_start().to_string());
                let flag = self.build_lines.concat();
                let first = self.build_lines.first().cloned().unwrap_or_default();
                if let Some(build) = self.build.as_mut() {
                    add_build_flag(build, &flag, &first, line_desc, self.warnings)?;
                }
                self.build_lines.clear();
            }
            return Ok(());
        }

        // Block ended
        if let Some(build) = self.build.take() {
            if build.commit.as_deref().map_or(true, str::is_empty) && !build.is_disabled() {
                self.warnings.emit(format!(
                    "No commit specified for {} in {}",
                    build.version_name, line_desc
                ))?;
            }
            let version_code = build.version_code.clone();
            self.app.builds.push(build);
            let pending = std::mem::take(&mut self.cur_comments);
            self.app
                .add_comments(CommentTarget::Build(version_code), pending);
        }
        self.mode = Mode::Free;
        Ok(())
    }

    fn free_line(&mut self, line: &str, line_desc: &str) -> Result<(), MetadataError> {
        if line.is_empty() {
            return Ok(());
        }
        if let Some(comment) = line.strip_prefix('#') {
            self.cur_comments.push(comment.trim().to_string());
            return Ok(());
        }

        let Some((raw_field, value)) = line.split_once(':') else {
            self.warnings
                .emit(format!("Invalid metadata in {}", line_desc))?;
            return Ok(());
        };

        if !is_app_field(raw_field) {
            self.warnings
                .emit(format!("Unrecognised app field: {}", raw_field))?;
        }

        // Translate obsolete field names
        let raw_field = match raw_field {
            "Market Version" => "Current Version",
            "Market Version Code" => "Current Version Code",
            other => other,
        };

        let field = canonical_name(raw_field);
        let ftype = field_type(&field);

        if !matches!(ftype, FieldType::Build | FieldType::BuildV2) {
            let pending = std::mem::take(&mut self.cur_comments);
            self.app
                .add_comments(CommentTarget::Field(field.clone()), pending);
        }

        match ftype {
            FieldType::Multiline => {
                self.mode = Mode::Multiline(field.clone());
                if !value.is_empty() {
                    self.warnings.emit(format!(
                        "Unexpected text on same line as {} in {}",
                        field, line_desc
                    ))?;
                }
            }
            FieldType::String => {
                if field == "RequiresRoot" {
                    match decode_bool(value) {
                        Some(b) => self.app.requires_root = b,
                        None => self.warnings.emit(format!("Invalid bool '{}'", value))?,
                    }
                } else {
                    self.app.set_string_field(&field, value);
                }
            }
            FieldType::List => {
                self.app.set_list_field(&field, split_list_values(value));
            }
            FieldType::Build => {
                if let Some(stripped) = value.strip_suffix('\\') {
                    self.mode = Mode::Continuation;
                    self.build_lines.clear();
                    self.build_lines.push(stripped.to_string());
                } else {
                    let lines = [value.to_string()];
                    if let Some(build) =
                        parse_build_line(&lines, self.source, line_desc, self.warnings)?
                    {
                        self.push_legacy_build(build);
                    }
                }
            }
            FieldType::BuildV2 => {
                let parts: Vec<&str> = value.split(',').collect();
                if parts.len() != 2 {
                    self.warnings.emit(format!(
                        "Build should have comma-separated versionName and versionCode, not \"{}\", in {}",
                        value, line_desc
                    ))?;
                    return Ok(());
                }
                let build = Build {
                    version_name: parts[0].to_string(),
                    version_code: parts[1].to_string(),
                    ..Default::default()
                };
                check_version_code(&build.version_code, self.warnings)?;
                if self.vc_seen.contains(&build.version_code) {
                    self.warnings.emit(format!(
                        "Duplicate build recipe found for versionCode {} in {}",
                        build.version_code, line_desc
                    ))?;
                }
                self.vc_seen.insert(build.version_code.clone());
                self.build_lines.clear();
                self.build = Some(build);
                self.mode = Mode::BuildBlock;
            }
            FieldType::Obsolete => {}
        }

        Ok(())
    }

    fn multiline_line(&mut self, line: &str, field: &str) {
        if line == "." {
            let text = std::mem::take(&mut self.multiline_lines).join("\n");
            self.app.set_multiline_field(field, text);
            self.mode = Mode::Free;
        } else {
            self.multiline_lines.push(line.to_string());
        }
    }

    fn continuation_line(&mut self, line: &str, line_desc: &str) -> Result<(), MetadataError> {
        if let Some(stripped) = line.strip_suffix('\\') {
            self.build_lines.push(stripped.to_string());
        } else {
            self.build_lines.push(line.to_string());
            let lines = std::mem::take(&mut self.build_lines);
            if let Some(build) = parse_build_line(&lines, self.source, line_desc, self.warnings)? {
                self.push_legacy_build(build);
            }
            self.mode = Mode::Free;
        }
        Ok(())
    }

    fn push_legacy_build(&mut self, build: Build) {
        let version_code = build.version_code.clone();
        self.app.builds.push(build);
        let pending = std::mem::take(&mut self.cur_comments);
        self.app
            .add_comments(CommentTarget::Build(version_code), pending);
    }
}

/// Parse a legacy single-line build recipe (continuations already joined).
fn parse_build_line(
    lines: &[String],
    source: &str,
    line_desc: &str,
    warnings: &Warnings,
) -> Result<Option<Build>, MetadataError> {
    let joined = lines.concat();
    let parts = split_unescaped_commas(&joined);
    if parts.len() < 3 {
        warnings.emit(format!("Invalid build format: {} in {}", joined, source))?;
        return Ok(None);
    }

    let mut build = Build {
        version_name: parts[0].clone(),
        version_code: parts[1].clone(),
        ..Default::default()
    };
    check_version_code(&build.version_code, warnings)?;

    if let Some(disable) = parts[2].strip_prefix('!') {
        // Old-style disabling carries the reason inline; try to recover the
        // commit from a trailing "at <commit>)".
        build.disable = Some(disable.to_string());
        let mut commit = "unknown - see disabled".to_string();
        if let Some(index) = parts[2].rfind("at ") {
            let mut found = parts[2][index + 3..].to_string();
            if found.ends_with(')') {
                found.pop();
            }
            commit = found;
        }
        build.commit = Some(commit);
    } else {
        build.commit = Some(parts[2].clone());
    }

    let first = lines.first().cloned().unwrap_or_default();
    for part in &parts[3..] {
        add_build_flag(&mut build, part, &first, line_desc, warnings)?;
    }

    Ok(Some(build))
}

/// Apply one `flag=value` pair to a build.
fn add_build_flag(
    build: &mut Build,
    pair: &str,
    first_line: &str,
    line_desc: &str,
    warnings: &Warnings,
) -> Result<(), MetadataError> {
    if pair.trim().is_empty() {
        warnings.emit(format!("Empty build flag at {}", line_desc))?;
        return Ok(());
    }
    let Some((name, value)) = pair.split_once('=') else {
        warnings.emit(format!(
            "Invalid build flag at {} in {}",
            first_line, line_desc
        ))?;
        return Ok(());
    };

    let name = name.trim_start();
    // `update` collides with nothing here, but keeps the historical alias
    let name = if name == "update" { "androidupdate" } else { name };

    if !BUILD_FLAGS_ORDER.contains(&name) {
        warnings.emit(format!("Unrecognised build flag: {} in {}", name, line_desc))?;
        return Ok(());
    }

    match flag_type(name) {
        FlagType::List => {
            build.set_list_flag(name, split_list_values(value));
        }
        FlagType::String | FlagType::Script => {
            build.set_scalar_flag(name, value);
        }
        FlagType::Bool => match decode_bool(value) {
            Some(b) => {
                build.set_bool_flag(name, b);
            }
            None => warnings.emit(format!("Invalid bool '{}'", value))?,
        },
    }

    Ok(())
}

/// Check that a version code is an integer.
fn check_version_code(version_code: &str, warnings: &Warnings) -> Result<(), MetadataError> {
    if version_code.trim().parse::<i64>().is_err() {
        warnings.emit(format!(
            "Invalid versionCode: \"{}\" is not an integer!",
            version_code
        ))?;
    }
    Ok(())
}

/// Split a legacy build line on commas, honoring `\,` escapes.
pub fn split_unescaped_commas(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&',') {
            current.push(',');
            chars.next();
        } else if c == ',' {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

/// Render an app as canonical `.txt` metadata.
pub fn write_txt(app: &App, warnings: &Warnings) -> Result<String, MetadataError> {
    let mut out = String::new();

    fn w_comments(out: &mut String, app: &App, target: &CommentTarget) {
        for line in app.comments_for(target) {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
    }

    fn field_str(out: &mut String, app: &App, display: &str, value: &str) {
        w_comments(out, app, &CommentTarget::Field(canonical_name(display)));
        out.push_str(display);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }

    fn field_list(out: &mut String, app: &App, display: &str, values: &[String]) {
        w_comments(out, app, &CommentTarget::Field(canonical_name(display)));
        out.push_str(display);
        out.push(':');
        out.push_str(&values.join(","));
        out.push('\n');
    }

    fn field_multiline(out: &mut String, app: &App, display: &str, value: &str) {
        w_comments(out, app, &CommentTarget::Field(canonical_name(display)));
        out.push_str(display);
        out.push_str(":\n");
        out.push_str(value);
        out.push_str("\n.\n");
    }

    fn field_opt(out: &mut String, app: &App, display: &str, value: &Option<String>) {
        if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
            field_str(out, app, display, v);
        }
    }

    fn field_nonempty(out: &mut String, app: &App, display: &str, value: &str) {
        if !value.is_empty() {
            field_str(out, app, display, value);
        }
    }

    field_opt(&mut out, app, "Disabled", &app.disabled);
    if !app.anti_features.is_empty() {
        field_list(&mut out, app, "AntiFeatures", &app.anti_features);
    }
    field_opt(&mut out, app, "Provides", &app.provides);
    field_list(&mut out, app, "Categories", &app.categories);
    field_str(&mut out, app, "License", &app.license);
    field_opt(&mut out, app, "Author Name", &app.author_name);
    field_opt(&mut out, app, "Author Email", &app.author_email);
    field_opt(&mut out, app, "Author Web Site", &app.author_web_site);
    field_str(&mut out, app, "Web Site", &app.web_site);
    field_str(&mut out, app, "Source Code", &app.source_code);
    field_str(&mut out, app, "Issue Tracker", &app.issue_tracker);
    field_nonempty(&mut out, app, "Changelog", &app.changelog);
    field_opt(&mut out, app, "Donate", &app.donate);
    field_opt(&mut out, app, "FlattrID", &app.flattr_id);
    field_opt(&mut out, app, "Bitcoin", &app.bitcoin);
    field_opt(&mut out, app, "Litecoin", &app.litecoin);
    out.push('\n');

    field_opt(&mut out, app, "Name", &app.name);
    field_nonempty(&mut out, app, "Auto Name", &app.auto_name);
    field_nonempty(&mut out, app, "Summary", &app.summary);
    let description = description_txt(&app.description, warnings)?;
    if !description.is_empty() {
        field_multiline(&mut out, app, "Description", &description);
    }
    out.push('\n');

    if app.requires_root {
        field_str(&mut out, app, "Requires Root", "yes");
        out.push('\n');
    }

    if !app.repo_type.is_empty() {
        field_str(&mut out, app, "Repo Type", &app.repo_type);
        field_str(&mut out, app, "Repo", &app.repo);
        if app.binaries.is_some() {
            field_str(
                &mut out,
                app,
                "Binaries",
                app.binaries.as_deref().unwrap_or(""),
            );
        }
        out.push('\n');
    }

    for build in &app.builds {
        if build.version_name == "Ignore" {
            continue;
        }
        w_comments(
            &mut out,
            app,
            &CommentTarget::Build(build.version_code.clone()),
        );
        write_build(&mut out, build);
        out.push('\n');
    }

    if !app.maintainer_notes.is_empty() {
        field_multiline(&mut out, app, "Maintainer Notes", &app.maintainer_notes);
        out.push('\n');
    }

    field_opt(&mut out, app, "Archive Policy", &app.archive_policy);
    field_str(&mut out, app, "Auto Update Mode", &app.auto_update_mode);
    field_str(&mut out, app, "Update Check Mode", &app.update_check_mode);
    field_opt(&mut out, app, "Update Check Ignore", &app.update_check_ignore);
    field_opt(&mut out, app, "Vercode Operation", &app.vercode_operation);
    field_opt(&mut out, app, "Update Check Name", &app.update_check_name);
    field_opt(&mut out, app, "Update Check Data", &app.update_check_data);
    if !app.current_version.is_empty() {
        field_str(&mut out, app, "Current Version", &app.current_version);
        field_str(
            &mut out,
            app,
            "Current Version Code",
            app.current_version_code.as_deref().unwrap_or(""),
        );
    }
    if !app.no_source_since.is_empty() {
        out.push('\n');
        field_str(&mut out, app, "No Source Since", &app.no_source_since);
    }
    w_comments(&mut out, app, &CommentTarget::Eof);

    Ok(out)
}

/// Write one build block in `.txt` layout.
fn write_build(out: &mut String, build: &Build) {
    out.push_str("Build:");
    out.push_str(&build.version_name);
    out.push(',');
    out.push_str(&build.version_code);
    out.push('\n');

    for name in BUILD_FLAGS_ORDER {
        let name = *name;
        let Some(value) = build.flag_value(name) else {
            continue;
        };
        let display = if name == "androidupdate" { "update" } else { name };
        out.push_str("    ");
        out.push_str(display);
        out.push('=');
        match value {
            FlagValue::Str(v) => out.push_str(v),
            FlagValue::Bool => out.push_str("yes"),
            FlagValue::List(items) => out.push_str(&items.join(",")),
            FlagValue::Script(script) => {
                let mut first = true;
                for step in script.split(" && ") {
                    if first {
                        first = false;
                    } else {
                        out.push_str(" && \\\n        ");
                    }
                    out.push_str(step.trim());
                }
            }
        }
        out.push('\n');
    }
}
