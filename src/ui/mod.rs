//! ui
//!
//! User-facing output and diagnostics.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware messages on stdout/stderr
//! - [`logging`] - `tracing` subscriber setup
//!
//! # Design
//!
//! Messages meant for the user go through [`output`]. Internal diagnostics
//! are `tracing` events, shown only when `--debug` or `RUST_LOG` asks for
//! them.

pub mod logging;
pub mod output;
