//! oldnew - materialize the old and new files of a commit range
//!
//! Given two commits, oldnew writes the full pre-change and post-change
//! contents of every file that differs between them into sibling `old/`
//! and `new/` trees, packaged as a plain directory or a tar/zip archive.
//! The output is meant for external diff and preview tools.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Runs Resolve -> Enumerate -> Stage -> Package for one request
//! - [`core`] - Domain types, output formats, configuration
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - User output and log setup
//!
//! # Correctness Invariants
//!
//! 1. An existing output path is never overwritten
//! 2. Invalid requests fail before anything is written
//! 3. The staging area is removed on every exit path
//! 4. The repository is only ever read

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
