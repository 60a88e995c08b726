//! config command - Get, set, or list configuration values
//!
//! Keys:
//! - `warnings` - repo-scope diagnostic mode
//! - `accepted_formats` - repo-scope accepted formats (comma-separated)
//! - `global.warnings` - user-scope diagnostic mode

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::core::config::{Config, RepoConfig};
use crate::metadata::WarningMode;

/// Get a configuration value.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let cwd = ctx.workdir()?;
    let config = Config::load(Some(&cwd)).context("Failed to load configuration")?;

    let value = match key {
        "warnings" => config.warnings().to_string(),
        "accepted_formats" => config.accepted_formats().join(","),
        "global.warnings" => config.global.warnings.clone().unwrap_or_default(),
        _ => bail!("Unknown configuration key: {}", key),
    };

    if !value.is_empty() {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let cwd = ctx.workdir()?;
    let config = Config::load(Some(&cwd)).context("Failed to load configuration")?;

    match key {
        "warnings" => {
            value
                .parse::<WarningMode>()
                .map_err(|e| anyhow::anyhow!(e))?;
            let mut repo = config.repo.unwrap_or_else(RepoConfig::default);
            repo.warnings = Some(value.to_string());
            Config::write_repo(&cwd, &repo).context("Failed to write repo config")?;
        }
        "accepted_formats" => {
            let formats: Vec<String> = value.split(',').map(str::to_string).collect();
            let mut repo = config.repo.unwrap_or_else(RepoConfig::default);
            repo.accepted_formats = Some(formats);
            repo.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
            Config::write_repo(&cwd, &repo).context("Failed to write repo config")?;
        }
        "global.warnings" => {
            value
                .parse::<WarningMode>()
                .map_err(|e| anyhow::anyhow!(e))?;
            let mut global = config.global.clone();
            global.warnings = Some(value.to_string());
            Config::write_global(&global).context("Failed to write global config")?;
        }
        _ => bail!("Unknown configuration key: {}", key),
    }

    if !ctx.quiet {
        println!("Set {} = {}", key, value);
    }
    Ok(())
}

/// List all configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    let cwd = ctx.workdir()?;
    let config = Config::load(Some(&cwd)).context("Failed to load configuration")?;

    println!("# Configuration");
    println!("warnings = {}", config.warnings());
    println!("accepted_formats = {}", config.accepted_formats().join(","));
    match &config.global.warnings {
        Some(mode) => println!("global.warnings = {}", mode),
        None => println!("global.warnings = (not set)"),
    }

    if let Some(path) = config.repo_config_loaded_from() {
        println!("# repo config: {}", path.display());
    }
    if let Some(path) = config.global_config_loaded_from() {
        println!("# global config: {}", path.display());
    }

    Ok(())
}
