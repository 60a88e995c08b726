//! cli
//!
//! Command-line interface layer for repometa.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! the command handlers, which drive [`crate::metadata`]. Running with no
//! subcommand is the `read` entry point with cross-referencing and
//! persistence disabled.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::metadata::WarningMode;
use crate::ui::output::Verbosity;
use args::{Command, WarningsChoice};

/// Execution context shared by all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override (`--cwd`)
    pub cwd: Option<PathBuf>,
    /// Debug output enabled
    pub debug: bool,
    /// Minimal output
    pub quiet: bool,
    /// Diagnostic mode override (`-W`), before configuration is consulted
    pub warnings: Option<WarningMode>,
}

impl Context {
    /// Output verbosity from the flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// The directory to operate in.
    pub fn workdir(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir().context("Failed to determine working directory"),
        }
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        warnings: cli.warnings.map(|choice| match choice {
            WarningsChoice::Warn => WarningMode::Warn,
            WarningsChoice::Error => WarningMode::Error,
            WarningsChoice::Ignore => WarningMode::Ignore,
        }),
    };

    // No subcommand is the plain metadata read: cross-referencing and
    // persistence both disabled.
    let command = cli.command.unwrap_or(Command::Read {
        xref: false,
        store: false,
    });

    commands::dispatch(command, &ctx)
}
