//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads flow
//! through this interface. No other module should import `git2`.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Revision resolution (hash, tag, branch, relative revisions)
//! - First-parent lookup for implicit old commits
//! - Tree-to-tree diff with rename/copy detection
//! - Blob reads
//!
//! # Invariants
//!
//! - Access is read-only; nothing here writes refs, objects or the worktree
//! - No other module calls git2 directly
//! - All operations return strong types (Oid, Change, CommitInfo)

mod interface;

pub use interface::{BlobSource, CommitInfo, Git, GitError, SimilarityOptions};
