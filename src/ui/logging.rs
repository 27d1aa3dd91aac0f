//! ui::logging
//!
//! Installs the `tracing` subscriber for the binary.
//!
//! `RUST_LOG` wins when set. Otherwise `--debug` enables this crate's
//! debug events and everything else stays at `warn`.

use tracing_subscriber::EnvFilter;

use super::output::Verbosity;

/// Filter used when `RUST_LOG` is unset.
fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Debug => "warn,oldnew=debug",
        Verbosity::Normal | Verbosity::Quiet => "warn",
    }
}

/// Install a stderr fmt subscriber. Later calls are no-ops.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
