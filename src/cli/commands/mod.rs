//! cli::commands
//!
//! Command handlers.
//!
//! Each handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine
//! 3. Formats and displays output

mod completion;
mod generate;

pub use completion::completion;
pub use generate::{build_request, generate};
