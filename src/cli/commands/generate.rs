//! generate command - Materialize a commit range into the output path

use crate::cli::args::Cli;
use crate::core::config::Config;
use crate::core::format::OutputKind;
use crate::engine::{self, RunRequest};
use crate::ui::output::{self, Verbosity};
use anyhow::{Context as _, Result};

/// Turn parsed arguments into an engine request.
pub fn build_request(cli: &Cli) -> Result<RunRequest> {
    let output = cli.output.clone().context("OUTPUT_PATH is required")?;
    let new_commit = cli.new_commit.clone().context("NEW_COMMIT is required")?;

    let mut request = match &cli.repo {
        Some(repo) => RunRequest::new(repo, new_commit, output),
        None => RunRequest::new(".", new_commit, output).with_discovery(),
    }
    .with_subdirs(cli.old_dir.clone(), cli.new_dir.clone());
    request.old_revision = cli.old_commit.clone();
    request.renames = cli.renames();
    request.copies = cli.copies();

    if let Some(name) = &cli.format {
        request.format = Some(OutputKind::from_name(name).map_err(engine::PipelineError::from)?);
    }

    Ok(request)
}

/// Run the pipeline and report the result.
pub fn generate(cli: &Cli, verbosity: Verbosity) -> Result<()> {
    let request = build_request(cli)?;

    let config = Config::load_global()?;
    if let Some(path) = config.global_config_loaded_from() {
        output::debug(format!("config: {}", path.display()), verbosity);
    }

    let report = engine::run(request, config)?;

    if cli.json {
        output::json(&report)?;
        return Ok(());
    }

    if report.changes == 0 {
        output::warn(
            format!(
                "no changes between {} and {}",
                report.old_commit.short(7),
                report.new_commit.short(7)
            ),
            verbosity,
        );
    }
    output::success(output::format_report(&report), verbosity);

    Ok(())
}
