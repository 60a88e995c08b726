//! repometa - a CLI for reading, validating and rewriting app-repository
//! metadata
//!
//! An app repository keeps one metadata file per application under a
//! `metadata/` directory, in `.txt`, `.json` or `.yml` format. repometa
//! loads that set, validates field values, optionally resolves description
//! cross-references between apps, optionally persists the parsed result,
//! and can rewrite files in canonical form.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to handlers)
//! - [`metadata`] - The metadata model, per-format parsers/writers,
//!   validation, description rendering, srclib index and persistence
//! - [`core`] - Domain types and configuration
//! - [`ui`] - Output formatting
//!
//! # Behavior Invariants
//!
//! 1. A plain read never writes to the filesystem; only an explicit store
//!    persists anything
//! 2. Every recoverable metadata problem flows through one diagnostic
//!    policy (warn, error or ignore)
//! 3. For one app id, the first metadata file found wins; duplicates are
//!    diagnosed, never silently merged

pub mod cli;
pub mod core;
pub mod metadata;
pub mod ui;
