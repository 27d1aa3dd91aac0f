//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Usage
//!
//! ```text
//! oldnew [OPTIONS] <OUTPUT_PATH> <NEW_COMMIT> [OLD_COMMIT]
//! ```
//!
//! The output kind is inferred from the `OUTPUT_PATH` extension unless
//! `--format` names it.

use clap::Parser;
use std::path::PathBuf;

/// oldnew - write the old and new versions of every file changed by a commit
#[derive(Parser, Debug)]
#[command(name = "oldnew")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    # Files changed by HEAD, as old/ and new/ directories
    oldnew review HEAD

    # Changes between two tags, as a gzipped tarball
    oldnew release.tar.gz v1.1 v1.0

    # From another repository, with custom subdirectory names
    oldnew -r ../project --old before --new after out.zip main~3")]
pub struct Cli {
    /// Output directory or archive (.tar, .tar.gz, .tgz, .tar.xz, .txz, .tar.bz2, .tbz2, .zip)
    #[arg(value_name = "OUTPUT_PATH", required_unless_present = "completions")]
    pub output: Option<PathBuf>,

    /// Commit whose changes are materialized
    #[arg(value_name = "NEW_COMMIT", required_unless_present = "completions")]
    pub new_commit: Option<String>,

    /// Commit to compare against (default: first parent of NEW_COMMIT)
    #[arg(value_name = "OLD_COMMIT")]
    pub old_commit: Option<String>,

    /// Repository root or .git directory [default: the repository containing
    /// the current directory]
    #[arg(short, long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Name of the subdirectory holding pre-change files
    #[arg(long = "old", value_name = "NAME")]
    pub old_dir: Option<String>,

    /// Name of the subdirectory holding post-change files
    #[arg(long = "new", value_name = "NAME")]
    pub new_dir: Option<String>,

    /// Output format, overriding the extension (dir, tar, tar.gz, tar.xz, tar.bz2, zip)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Report renamed files as a deletion plus an addition
    #[arg(long)]
    pub no_renames: bool,

    /// Detect copied files
    #[arg(long)]
    pub find_copies: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Rename detection override; `None` defers to configuration.
    pub fn renames(&self) -> Option<bool> {
        self.no_renames.then_some(false)
    }

    /// Copy detection override; `None` defers to configuration.
    pub fn copies(&self) -> Option<bool> {
        self.find_copies.then_some(true)
    }
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
