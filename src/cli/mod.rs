//! cli
//!
//! Command-line interface layer for oldnew.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments
//! - Merge flags over configuration
//! - Delegate to the engine and report the result
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and hands a
//! [`crate::engine::RunRequest`] to the engine. Errors come back as
//! `anyhow::Error`; `main` prints them and exits non-zero.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::ui::{logging, output::Verbosity};
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if let Some(shell) = cli.completions {
        return commands::completion(shell);
    }

    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    logging::init(verbosity);

    commands::generate(&cli, verbosity)
}
