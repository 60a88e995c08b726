//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Loads configuration and resolves the diagnostic mode
//! 3. Drives the metadata library and formats output

mod completion;
mod config_cmd;
mod read;
mod rewrite;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use read::read;
pub use rewrite::rewrite;

use anyhow::Result;

use crate::cli::args::{Command, ConfigAction};
use crate::cli::Context;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Read { xref, store } => read::read(ctx, xref, store),
        Command::Rewrite { appids, to, list } => rewrite::rewrite(ctx, &appids, to, list),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}
