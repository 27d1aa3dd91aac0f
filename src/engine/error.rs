//! engine::error
//!
//! The error taxonomy surfaced by a pipeline run.
//!
//! Every variant is terminal for the run; none are retried. Each message
//! names the kind of failure and the offending value (path, revision or
//! extension) so the CLI can print it as-is.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::format::FormatError;
use crate::core::types::TypeError;
use crate::git::GitError;

/// Errors from a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The repository path does not exist.
    #[error("repository path not found: {path}")]
    RepositoryPathNotFound { path: PathBuf },

    /// The repository path exists but holds no repository.
    #[error("not a git repository: {path}")]
    NotAGitRepository { path: PathBuf },

    /// A revision does not name a commit.
    #[error("invalid revision: '{revision}' is not a valid commit")]
    InvalidRevision { revision: String },

    /// No old commit was given and the new commit is a root commit.
    #[error("no parent commit: '{revision}' is the first commit")]
    NoParentCommit { revision: String },

    /// The output target is already present.
    #[error("output already exists: {path}")]
    OutputAlreadyExists { path: PathBuf },

    /// The output extension names a container that is not produced.
    #[error("unsupported format: {extension}")]
    UnsupportedFormat { extension: String },

    /// The output extension is not recognised.
    #[error("unknown format: {extension}")]
    UnknownFormat { extension: String },

    /// An `old`/`new` subdirectory name is unusable.
    #[error("invalid subdirectory name '{name}': {reason}")]
    InvalidSubdirName { name: String, reason: String },

    /// Writing a blob into the staging tree failed.
    #[error("staging failed at {path}: {source}")]
    StagingIo { path: PathBuf, source: io::Error },

    /// Producing the output directory or archive failed.
    #[error("packaging failed at {path}: {source}")]
    PackagingIo { path: PathBuf, source: io::Error },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Any other repository failure.
    #[error(transparent)]
    Git(GitError),
}

impl PipelineError {
    /// Stable identifier of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::RepositoryPathNotFound { .. } => "repository-path-not-found",
            PipelineError::NotAGitRepository { .. } => "not-a-git-repository",
            PipelineError::InvalidRevision { .. } => "invalid-revision",
            PipelineError::NoParentCommit { .. } => "no-parent-commit",
            PipelineError::OutputAlreadyExists { .. } => "output-already-exists",
            PipelineError::UnsupportedFormat { .. } => "unsupported-format",
            PipelineError::UnknownFormat { .. } => "unknown-format",
            PipelineError::InvalidSubdirName { .. } => "invalid-subdir-name",
            PipelineError::StagingIo { .. } => "staging-io",
            PipelineError::PackagingIo { .. } => "packaging-io",
            PipelineError::Config(_) => "config",
            PipelineError::Git(_) => "git",
        }
    }

    pub(crate) fn staging(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PipelineError::StagingIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn packaging(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PipelineError::PackagingIo {
            path: path.into(),
            source,
        }
    }
}

impl From<GitError> for PipelineError {
    fn from(err: GitError) -> Self {
        match err {
            GitError::PathNotFound { path } => PipelineError::RepositoryPathNotFound { path },
            GitError::NotARepo { path } => PipelineError::NotAGitRepository { path },
            GitError::InvalidRevision { revision } => PipelineError::InvalidRevision { revision },
            GitError::NoParent { oid } => PipelineError::NoParentCommit { revision: oid },
            other => PipelineError::Git(other),
        }
    }
}

impl From<FormatError> for PipelineError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Unsupported { extension } => {
                PipelineError::UnsupportedFormat { extension }
            }
            FormatError::Unknown { extension } => PipelineError::UnknownFormat { extension },
        }
    }
}

impl From<TypeError> for PipelineError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidSubdirName { name, reason } => {
                PipelineError::InvalidSubdirName { name, reason }
            }
            other => PipelineError::Git(other.into()),
        }
    }
}
