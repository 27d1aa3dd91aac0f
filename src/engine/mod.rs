//! engine
//!
//! Drives one materialization run.
//!
//! # Lifecycle
//!
//! ```text
//! Validate -> Open -> Resolve -> Enumerate -> Stage -> Package
//! ```
//!
//! 1. **Validate**: output kind, subdirectory names, target absence
//! 2. **Open/Resolve**: open the repository, resolve both commits
//! 3. **Enumerate**: diff the two trees into a change list
//! 4. **Stage**: write each change's sides into a private staging area
//! 5. **Package**: move or archive the staging tree into the target
//!
//! # Invariants
//!
//! - Nothing is written before every repository-free check has passed
//! - The staging area is owned by the run and dropped on every exit path
//! - The target is created exclusively, and removed again if packaging fails
//!
//! # Example
//!
//! ```ignore
//! use oldnew::core::config::Config;
//! use oldnew::engine::{run, RunRequest};
//!
//! let request = RunRequest::new(".", "HEAD", "review.tar.gz");
//! let report = run(request, Config::load_global()?)?;
//! println!("{} changes", report.changes);
//! ```

pub mod error;
pub mod materialize;
pub mod package;
pub mod pipeline;
pub mod staging;

pub use error::PipelineError;
pub use materialize::StagedCounts;
pub use pipeline::{run, Pipeline, PipelineState, RunReport, RunRequest};
pub use staging::StagingArea;
