//! rewrite command - Rewrite metadata files in canonical form
//!
//! Parses the selected apps and writes each one back with canonical field
//! ordering and layout. With `--to`, the converted file is written
//! alongside the original (which is left in place); with `--list`, nothing
//! is written and the ids of apps whose files would change are printed.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context as _, Result};

use crate::cli::args::RewriteFormat;
use crate::cli::Context;
use crate::core::config::Config;
use crate::core::types::AppId;
use crate::metadata::schema::App;
use crate::metadata::{self, ReadOptions, Warnings};
use crate::ui::output;

/// Rewrite the selected apps' metadata (all apps when `appids` is empty).
pub fn rewrite(
    ctx: &Context,
    appids: &[String],
    to: Option<RewriteFormat>,
    list: bool,
) -> Result<()> {
    let cwd = ctx.workdir()?;
    let verbosity = ctx.verbosity();

    if !cwd.join(metadata::METADATA_DIR).is_dir() {
        bail!("No metadata directory found in '{}'", cwd.display());
    }

    let config = Config::load(Some(&cwd)).context("Failed to load configuration")?;
    let mode = ctx
        .warnings
        .unwrap_or_else(|| config.warnings().parse().unwrap_or_default());
    let warnings = Warnings::new(mode, verbosity);

    let accepted: Vec<String> = config
        .accepted_formats()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let options = ReadOptions {
        xref: false,
        store: false,
        accepted_formats: accepted.clone(),
    };

    let repo = metadata::read_metadata(&cwd, &options, &warnings)
        .context("Failed to read metadata")?;

    let selected: Vec<&App> = if appids.is_empty() {
        repo.apps.values().collect()
    } else {
        let mut selected = Vec::with_capacity(appids.len());
        for raw in appids {
            let id = AppId::new(raw.as_str()).map_err(|e| anyhow!("{}", e))?;
            let app = repo
                .apps
                .get(&id)
                .ok_or_else(|| anyhow!("No such app id: {}", id))?;
            selected.push(app);
        }
        selected
    };

    for app in selected {
        let id = app
            .id
            .as_ref()
            .ok_or_else(|| anyhow!("App has no id"))?;
        let source = app
            .metadata_path
            .as_ref()
            .ok_or_else(|| anyhow!("No metadata path recorded for {}", id))?;

        let target: PathBuf = match to {
            None => source.clone(),
            Some(format) => source.with_extension(format.extension()),
        };

        let Some(content) = metadata::render_metadata(&target, app, &accepted, &warnings)
            .with_context(|| format!("Failed to render metadata for {}", id))?
        else {
            continue;
        };

        if list {
            let current = fs::read_to_string(&target).unwrap_or_default();
            if current != content {
                println!("{}", id);
            }
            continue;
        }

        fs::write(&target, &content)
            .with_context(|| format!("Failed to write '{}'", target.display()))?;
        output::debug(format!("wrote '{}'", target.display()), verbosity);
    }

    Ok(())
}
