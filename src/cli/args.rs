//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug output
//! - `--quiet` / `-q`: Minimal output
//! - `-W <mode>`: Diagnostic mode (warn, error or ignore)

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// repometa - read, validate and rewrite app-repository metadata
#[derive(Parser, Debug)]
#[command(name = "repometa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if repometa was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// What to do with metadata problems (overrides configuration)
    #[arg(short = 'W', long = "warnings", global = true, value_enum)]
    pub warnings: Option<WarningsChoice>,

    /// Defaults to `read` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Diagnostic mode choices for `-W`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WarningsChoice {
    /// Print warnings and continue
    Warn,
    /// Escalate problems to errors
    Error,
    /// Stay silent and continue
    Ignore,
}

/// Formats the rewrite command can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RewriteFormat {
    Txt,
    Yml,
}

impl RewriteFormat {
    /// The file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            RewriteFormat::Txt => "txt",
            RewriteFormat::Yml => "yml",
        }
    }
}

/// Shells completion scripts can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read and validate all metadata (the default command)
    #[command(
        name = "read",
        long_about = "Read and validate all metadata.\n\n\
            If the working directory has no 'metadata' directory, this is a \
            silent no-op. Otherwise every metadata file is parsed and its \
            field values checked; problems are printed as warnings (or, with \
            -W error, fail the run). Nothing is printed on a clean read.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Check the repository's metadata parses cleanly
    repometa read

    # Treat every metadata problem as fatal (good for CI)
    repometa -W error read

    # Also verify description cross-references between apps
    repometa read --xref

    # Persist the parsed set to tmp/apps.json for later tooling
    repometa read --store"
    )]
    Read {
        /// Resolve description cross-references between apps
        #[arg(long)]
        xref: bool,

        /// Persist the parsed result to tmp/apps.json
        #[arg(long)]
        store: bool,
    },

    /// Rewrite metadata files in canonical form
    #[command(
        name = "rewrite",
        long_about = "Rewrite metadata files in canonical form.\n\n\
            Parses the selected apps (all of them by default) and writes each \
            one back with canonical field ordering and layout. With --to, the \
            file is converted to the given format alongside the original \
            instead of being rewritten in place.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Canonicalize every metadata file in place
    repometa rewrite

    # See which files are not in canonical form, without writing
    repometa rewrite --list

    # Convert one app's metadata to YAML (original left in place)
    repometa rewrite --to yml org.example.app"
    )]
    Rewrite {
        /// Apps to rewrite (defaults to all)
        appids: Vec<String>,

        /// Convert to this format instead of rewriting in place
        #[arg(long, value_enum)]
        to: Option<RewriteFormat>,

        /// Only list the apps whose files would change
        #[arg(long)]
        list: bool,
    },

    /// Get, set, or list configuration values
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(name = "completion")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key (warnings, accepted_formats, global.warnings)
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (warnings, accepted_formats, global.warnings)
        key: String,
        /// New value (comma-separated for accepted_formats)
        value: String,
    },
    /// List all configuration values
    List,
}
