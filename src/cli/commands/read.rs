//! read command - Read and validate all metadata
//!
//! This is the entry point the bare `repometa` invocation lands on. The
//! precondition comes first: without a `metadata` directory in the working
//! directory there is nothing to do and the command returns silently,
//! before any configuration is read. Only when the directory exists is the
//! metadata load performed, with cross-referencing and persistence as
//! requested (both disabled for the bare invocation).

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::core::config::Config;
use crate::metadata::{self, ReadOptions, Warnings};
use crate::ui::output;

/// Read and validate all metadata under the working directory.
pub fn read(ctx: &Context, xref: bool, store: bool) -> Result<()> {
    let cwd = ctx.workdir()?;
    let verbosity = ctx.verbosity();

    let metadata_dir = cwd.join(metadata::METADATA_DIR);
    if !metadata_dir.is_dir() {
        output::debug(
            format!("no metadata directory at '{}'", metadata_dir.display()),
            verbosity,
        );
        return Ok(());
    }

    let config = Config::load(Some(&cwd)).context("Failed to load configuration")?;
    let mode = ctx
        .warnings
        .unwrap_or_else(|| config.warnings().parse().unwrap_or_default());
    let warnings = Warnings::new(mode, verbosity);

    let options = ReadOptions {
        xref,
        store,
        accepted_formats: config
            .accepted_formats()
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    let repo = metadata::read_metadata(&cwd, &options, &warnings)
        .context("Failed to read metadata")?;

    output::debug(
        format!(
            "read {} apps and {} srclibs",
            repo.apps.len(),
            repo.srclibs.len()
        ),
        verbosity,
    );

    Ok(())
}
