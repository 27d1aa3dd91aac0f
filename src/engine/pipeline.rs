//! engine::pipeline
//!
//! The orchestrator for one materialization run.
//!
//! # Lifecycle
//!
//! ```text
//! Init -> RepoOpened -> CommitsResolved -> Staged -> Packaged -> Done
//!   \__________\______________\______________\__________\____> Failed
//! ```
//!
//! Checks that need no repository (output format, subdirectory names,
//! target existence) run first, so a bad request fails before anything is
//! opened or written. Revision errors surface before the staging area
//! exists. The staging area is created lazily, just before the first
//! blob is written, and is owned by the run; it is removed on every exit
//! path when it goes out of scope.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::config::Config;
use crate::core::format::OutputKind;
use crate::core::types::{Oid, SubdirNames};
use crate::engine::error::PipelineError;
use crate::engine::materialize::{materialize, StagedCounts};
use crate::engine::package::{ensure_absent, package};
use crate::engine::staging::StagingArea;
use crate::git::{CommitInfo, Git, GitError, SimilarityOptions};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineState {
    Init,
    RepoOpened,
    CommitsResolved,
    Staged,
    Packaged,
    Done,
    Failed,
}

impl PipelineState {
    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

/// Inputs for one run.
///
/// The `Option` fields are per-run overrides; `None` falls back to
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub repo_path: PathBuf,
    pub new_revision: String,
    pub old_revision: Option<String>,
    pub output: PathBuf,
    /// Explicit output kind. Inferred from the output name when unset.
    pub format: Option<OutputKind>,
    pub old_dir: Option<String>,
    pub new_dir: Option<String>,
    pub renames: Option<bool>,
    pub copies: Option<bool>,
    /// Search upward from `repo_path` for the enclosing repository.
    /// Off by default, so `repo_path` must itself be a repository.
    pub discover: bool,
}

impl RunRequest {
    /// A request comparing `new_revision` against its first parent.
    pub fn new(
        repo_path: impl Into<PathBuf>,
        new_revision: impl Into<String>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repo_path: repo_path.into(),
            new_revision: new_revision.into(),
            old_revision: None,
            output: output.into(),
            format: None,
            old_dir: None,
            new_dir: None,
            renames: None,
            copies: None,
            discover: false,
        }
    }

    /// Compare against `revision` instead of the first parent.
    pub fn with_old_revision(mut self, revision: impl Into<String>) -> Self {
        self.old_revision = Some(revision.into());
        self
    }

    pub fn with_format(mut self, format: OutputKind) -> Self {
        self.format = Some(format);
        self
    }

    /// Override the `old`/`new` subdirectory names.
    pub fn with_subdirs(mut self, old: Option<String>, new: Option<String>) -> Self {
        self.old_dir = old;
        self.new_dir = new;
        self
    }

    pub fn with_renames(mut self, enabled: bool) -> Self {
        self.renames = Some(enabled);
        self
    }

    pub fn with_copies(mut self, enabled: bool) -> Self {
        self.copies = Some(enabled);
        self
    }

    /// Accept any directory inside a repository, not just its root.
    pub fn with_discovery(mut self) -> Self {
        self.discover = true;
        self
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub old_commit: Oid,
    pub new_commit: Oid,
    pub output: PathBuf,
    pub format: OutputKind,
    /// Changes enumerated between the two commits.
    pub changes: usize,
    /// Files written per side.
    pub staged: StagedCounts,
}

/// One pipeline run.
#[derive(Debug)]
pub struct Pipeline {
    request: RunRequest,
    config: Config,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(request: RunRequest, config: Config) -> Self {
        Self {
            request,
            config,
            state: PipelineState::Init,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Drive the run to `Done` or `Failed`.
    pub fn run(&mut self) -> Result<RunReport, PipelineError> {
        match self.execute() {
            Ok(report) => {
                self.transition(PipelineState::Done);
                info!(
                    output = %report.output.display(),
                    changes = report.changes,
                    "run complete"
                );
                Ok(report)
            }
            Err(err) => {
                debug!(from = ?self.state, kind = err.kind(), "run failed");
                self.transition(PipelineState::Failed);
                Err(err)
            }
        }
    }

    fn execute(&mut self) -> Result<RunReport, PipelineError> {
        let target = self.request.output.clone();
        let kind = match self.request.format {
            Some(kind) => kind,
            None => OutputKind::infer(&target)?,
        };
        self.subdir_names()?;
        ensure_absent(&target)?;

        let git = if self.request.discover {
            Git::discover(&self.request.repo_path)?
        } else {
            Git::open(&self.request.repo_path)?
        };
        self.config.load_repo(git.git_dir())?;
        if let Some(path) = self.config.repo_config_loaded_from() {
            debug!(path = %path.display(), "loaded repo config");
        }
        let names = self.subdir_names()?;
        self.transition(PipelineState::RepoOpened);

        let (old, new) = self.resolve(&git)?;
        self.transition(PipelineState::CommitsResolved);

        let changes = git.diff_commits(&old.oid, &new.oid, &self.similarity())?;

        let parent = parent_dir(&target);
        fs::create_dir_all(&parent).map_err(|e| PipelineError::packaging(&parent, e))?;
        let staging_parent = (kind == OutputKind::Directory).then_some(parent.as_path());
        let staging = StagingArea::create(staging_parent, names)
            .map_err(|e| PipelineError::staging(&parent, e))?;

        let mut staged = StagedCounts::default();
        for change in &changes {
            staged += materialize(&git, change, &staging)?;
        }
        debug!(old = staged.old, new = staged.new, "materialized changes");
        self.transition(PipelineState::Staged);

        ensure_absent(&target)?;
        package(staging.root(), &target, kind)?;
        self.transition(PipelineState::Packaged);

        if let Err(e) = staging.close() {
            warn!(error = %e, "failed to remove staging area");
        }

        Ok(RunReport {
            old_commit: old.oid,
            new_commit: new.oid,
            output: target,
            format: kind,
            changes: changes.len(),
            staged,
        })
    }

    /// Resolve `(old, new)`. Without an old revision, old is new's first
    /// parent.
    fn resolve(&self, git: &Git) -> Result<(CommitInfo, CommitInfo), PipelineError> {
        let new = git.resolve_commit(&self.request.new_revision)?;
        let old = match &self.request.old_revision {
            Some(revision) => git.resolve_commit(revision)?,
            None => git.first_parent(&new).map_err(|e| match e {
                GitError::NoParent { .. } => PipelineError::NoParentCommit {
                    revision: self.request.new_revision.clone(),
                },
                other => other.into(),
            })?,
        };

        debug!(
            old = old.oid.short(7),
            new = new.oid.short(7),
            summary = %new.summary,
            "resolved commits"
        );
        Ok((old, new))
    }

    fn subdir_names(&self) -> Result<SubdirNames, PipelineError> {
        Ok(self
            .config
            .subdir_names(self.request.old_dir.as_deref(), self.request.new_dir.as_deref())?)
    }

    fn similarity(&self) -> SimilarityOptions {
        SimilarityOptions {
            renames: self.request.renames.unwrap_or_else(|| self.config.renames()),
            copies: self.request.copies.unwrap_or_else(|| self.config.copies()),
            threshold: self.config.rename_threshold(),
        }
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(from = ?self.state, to = ?next, "pipeline state");
        self.state = next;
    }
}

/// Run a request to completion.
pub fn run(request: RunRequest, config: Config) -> Result<RunReport, PipelineError> {
    Pipeline::new(request, config).run()
}

fn parent_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
