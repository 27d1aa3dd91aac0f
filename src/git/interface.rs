//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to the repository. The
//! pipeline only ever needs read access: open a repository, resolve
//! revisions to commits, diff two commit trees, and lend out blob bytes.
//! Errors are normalized into typed failure categories.
//!
//! # Error Handling
//!
//! - [`GitError::PathNotFound`]: The repository path does not exist
//! - [`GitError::NotARepo`]: The path exists but no repository was found
//! - [`GitError::InvalidRevision`]: A revision does not name a commit
//! - [`GitError::NoParent`]: A root commit has no parent to diff against
//!
//! # Example
//!
//! ```ignore
//! use oldnew::git::{Git, SimilarityOptions};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let new = git.resolve_commit("HEAD")?;
//! let old = git.first_parent(&new)?;
//! for change in git.diff_commits(&old.oid, &new.oid, &SimilarityOptions::default())? {
//!     println!("{}", change);
//! }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

use crate::core::types::{Change, ChangeKind, ChangeSide, FileMode, Oid, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The repository path does not exist.
    #[error("repository path does not exist: {path}")]
    PathNotFound {
        /// The path that was given
        path: PathBuf,
    },

    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// The revision string does not name an existing commit.
    #[error("not a valid commit: {revision}")]
    InvalidRevision {
        /// The revision as given by the caller
        revision: String,
    },

    /// The commit is a root commit.
    #[error("commit {oid} has no parent")]
    NoParent {
        /// The parentless commit
        oid: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// A diff entry could not be turned into a change.
    #[error("malformed diff entry: {message}")]
    MalformedChange {
        /// Description of the problem
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::ObjectNotFound {
                oid: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            other => GitError::MalformedChange {
                message: other.to_string(),
            },
        }
    }
}

/// Information about a resolved commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// Parent OIDs in order (empty for a root commit)
    pub parents: Vec<Oid>,
    /// First line of the commit message
    pub summary: String,
}

impl CommitInfo {
    /// Whether this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Similarity detection applied after the tree-to-tree diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityOptions {
    /// Classify delete+add pairs of similar files as renames.
    pub renames: bool,
    /// Classify additions similar to a modified file as copies.
    pub copies: bool,
    /// Similarity percentage (1-100) for both detections.
    pub threshold: u16,
}

impl Default for SimilarityOptions {
    fn default() -> Self {
        Self {
            renames: true,
            copies: false,
            threshold: crate::core::config::DEFAULT_RENAME_THRESHOLD,
        }
    }
}

/// Source of blob bytes.
///
/// [`Git`] is the production implementation; the seam lets staging be
/// exercised without a repository. Contents are lent to `f` rather than
/// returned, so a blob is never copied out of the object database.
pub trait BlobSource {
    /// Look up a blob and hand its contents to `f`.
    fn with_blob<R>(&self, oid: &Oid, f: impl FnOnce(&[u8]) -> R) -> Result<R, GitError>;
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// imports `git2`.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening
    // =========================================================================

    /// Open the repository at exactly `path`.
    ///
    /// `path` must be a working tree root, a `.git` directory, or a bare
    /// repository. Subdirectories of a working tree are rejected; use
    /// [`Git::discover`] to search upward.
    ///
    /// # Errors
    ///
    /// - [`GitError::PathNotFound`] if `path` does not exist
    /// - [`GitError::NotARepo`] if `path` is not itself a repository
    pub fn open(path: &Path) -> Result<Self, GitError> {
        Self::open_with(path, |p| git2::Repository::open(p))
    }

    /// Find the repository containing `path`, searching parent
    /// directories.
    ///
    /// # Errors
    ///
    /// - [`GitError::PathNotFound`] if `path` does not exist
    /// - [`GitError::NotARepo`] if no enclosing repository is found
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        Self::open_with(path, |p| git2::Repository::discover(p))
    }

    fn open_with(
        path: &Path,
        opener: impl FnOnce(&Path) -> Result<git2::Repository, git2::Error>,
    ) -> Result<Self, GitError> {
        if !path.exists() {
            return Err(GitError::PathNotFound {
                path: path.to_path_buf(),
            });
        }

        let repo = opener(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        debug!(git_dir = %repo.path().display(), "opened repository");
        Ok(Self { repo })
    }

    /// Get direct access to the .git directory path.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    // =========================================================================
    // Revision Resolution
    // =========================================================================

    /// Resolve a revision string (hash, short hash, tag, branch, `HEAD~2`,
    /// ...) to a commit.
    ///
    /// Annotated tags are peeled to the commit they point at.
    ///
    /// # Errors
    ///
    /// - [`GitError::InvalidRevision`] if the string is malformed, unknown,
    ///   or names an object that is not a commit
    pub fn resolve_commit(&self, revision: &str) -> Result<CommitInfo, GitError> {
        let invalid = || GitError::InvalidRevision {
            revision: revision.to_string(),
        };

        let object = self.repo.revparse_single(revision).map_err(|e| {
            trace!(revision, error = %e.message(), "revparse failed");
            invalid()
        })?;
        let commit = object.peel_to_commit().map_err(|_| invalid())?;

        self.commit_info_of(&commit)
    }

    /// Look up a commit by OID.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let commit = self.find_commit(oid)?;
        self.commit_info_of(&commit)
    }

    /// The first parent of a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::NoParent`] if the commit is a root commit
    pub fn first_parent(&self, commit: &CommitInfo) -> Result<CommitInfo, GitError> {
        let parent = commit.parents.first().ok_or_else(|| GitError::NoParent {
            oid: commit.oid.to_string(),
        })?;
        self.commit_info(parent)
    }

    fn find_commit(&self, oid: &Oid) -> Result<git2::Commit<'_>, GitError> {
        let git_oid =
            git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        self.repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }

    fn commit_info_of(&self, commit: &git2::Commit<'_>) -> Result<CommitInfo, GitError> {
        let mut parents = Vec::new();
        for id in commit.parent_ids() {
            parents.push(Oid::new(id.to_string())?);
        }

        Ok(CommitInfo {
            oid: Oid::new(commit.id().to_string())?,
            parents,
            summary: commit.summary().unwrap_or("").to_string(),
        })
    }

    // =========================================================================
    // Change Enumeration
    // =========================================================================

    /// Diff the trees of two commits into an ordered list of changes.
    ///
    /// Order is libgit2's (sorted by path), which is stable for a fixed
    /// pair of commits. Deltas that are not file changes (unmodified,
    /// ignored, untracked, conflicted) are skipped.
    pub fn diff_commits(
        &self,
        old: &Oid,
        new: &Oid,
        similarity: &SimilarityOptions,
    ) -> Result<Vec<Change>, GitError> {
        let old_tree = self
            .find_commit(old)?
            .tree()
            .map_err(|e| GitError::from_git2(e, old.as_str()))?;
        let new_tree = self
            .find_commit(new)?
            .tree()
            .map_err(|e| GitError::from_git2(e, new.as_str()))?;

        let mut opts = git2::DiffOptions::new();
        opts.include_typechange(true);

        let mut diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut opts))
            .map_err(|e| GitError::Internal {
                message: format!("diff {}..{}: {}", old.short(7), new.short(7), e.message()),
            })?;

        if similarity.renames || similarity.copies {
            let mut find = git2::DiffFindOptions::new();
            find.renames(similarity.renames)
                .copies(similarity.copies)
                .rename_threshold(similarity.threshold)
                .copy_threshold(similarity.threshold);
            diff.find_similar(Some(&mut find))
                .map_err(|e| GitError::Internal {
                    message: format!("similarity detection: {}", e.message()),
                })?;
        }

        let mut changes = Vec::with_capacity(diff.deltas().len());
        for delta in diff.deltas() {
            let Some(kind) = change_kind(delta.status()) else {
                trace!(status = ?delta.status(), "skipping non-change delta");
                continue;
            };

            let required = kind.required_sides();
            let old_side = if required.old {
                Some(change_side(&delta.old_file())?)
            } else {
                None
            };
            let new_side = if required.new {
                Some(change_side(&delta.new_file())?)
            } else {
                None
            };

            changes.push(Change::new(kind, old_side, new_side)?);
        }

        debug!(
            old = old.short(7),
            new = new.short(7),
            changes = changes.len(),
            "enumerated changes"
        );
        Ok(changes)
    }
}

impl BlobSource for Git {
    /// Borrow a blob's contents by OID.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the blob doesn't exist
    fn with_blob<R>(&self, oid: &Oid, f: impl FnOnce(&[u8]) -> R) -> Result<R, GitError> {
        let git_oid =
            git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let blob = self
            .repo
            .find_blob(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        Ok(f(blob.content()))
    }
}

/// Map a libgit2 delta status onto a change kind.
fn change_kind(status: git2::Delta) -> Option<ChangeKind> {
    match status {
        git2::Delta::Added => Some(ChangeKind::Added),
        git2::Delta::Deleted => Some(ChangeKind::Deleted),
        git2::Delta::Modified => Some(ChangeKind::Modified),
        git2::Delta::Renamed => Some(ChangeKind::Renamed),
        git2::Delta::Copied => Some(ChangeKind::Copied),
        git2::Delta::Typechange => Some(ChangeKind::TypeChanged),
        _ => None,
    }
}

fn change_side(file: &git2::DiffFile<'_>) -> Result<ChangeSide, GitError> {
    let path = file.path().ok_or_else(|| GitError::MalformedChange {
        message: format!("diff entry {} has no path", file.id()),
    })?;
    let mode = FileMode::new(u32::from(file.mode()));
    let blob = Oid::new(file.id().to_string())?;

    Ok(ChangeSide::new(path, mode, blob)?)
}
