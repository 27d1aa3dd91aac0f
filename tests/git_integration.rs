//! Integration tests for the Git interface.
//!
//! These tests use real git repositories created via tempfile to verify
//! that the Git interface works correctly with actual git operations.

mod common;

use tempfile::TempDir;

use common::TestRepo;
use oldnew::core::types::{ChangeKind, Oid, Side};
use oldnew::git::{BlobSource, Git, GitError, SimilarityOptions};

fn oid(hex: &str) -> Oid {
    Oid::new(hex).unwrap()
}

fn no_similarity() -> SimilarityOptions {
    SimilarityOptions {
        renames: false,
        copies: false,
        ..SimilarityOptions::default()
    }
}

// =============================================================================
// Repository Opening Tests
// =============================================================================

#[test]
fn open_valid_repository() {
    let repo = TestRepo::new();
    assert!(Git::open(repo.path()).is_ok());
}

#[test]
fn open_subdirectory_is_not_a_repo() {
    let repo = TestRepo::new();
    let subdir = repo.path().join("build/artifacts");
    std::fs::create_dir_all(&subdir).unwrap();

    let git = Git::open(&subdir);
    assert!(matches!(git, Err(GitError::NotARepo { ref path }) if *path == subdir));
}

#[test]
fn open_git_dir_directly() {
    let repo = TestRepo::new();
    let git = Git::open(&repo.path().join(".git")).unwrap();
    assert_eq!(git.resolve_commit("HEAD").unwrap().oid.as_str(), repo.rev_parse("HEAD"));
}

#[test]
fn discover_from_subdirectory() {
    let repo = TestRepo::new();
    let subdir = repo.path().join("subdir");
    std::fs::create_dir(&subdir).unwrap();

    let git = Git::discover(&subdir).unwrap();
    assert_eq!(git.resolve_commit("HEAD").unwrap().oid.as_str(), repo.rev_parse("HEAD"));
}

#[test]
fn discover_outside_repository_fails() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(Git::discover(dir.path()), Err(GitError::NotARepo { .. })));
    assert!(matches!(
        Git::discover(&dir.path().join("nope")),
        Err(GitError::PathNotFound { .. })
    ));
}

#[test]
fn open_non_repository_fails() {
    let dir = TempDir::new().unwrap();
    let git = Git::open(dir.path());
    assert!(matches!(git, Err(GitError::NotARepo { .. })));
}

#[test]
fn open_missing_path_fails() {
    let dir = TempDir::new().unwrap();
    let git = Git::open(&dir.path().join("nope"));
    assert!(matches!(git, Err(GitError::PathNotFound { .. })));
}

#[test]
fn open_bare_repository() {
    let repo = TestRepo::new();
    let dest = TempDir::new().unwrap();
    let bare = repo.clone_bare(dest.path());

    let git = Git::open(&bare).unwrap();
    let head = git.resolve_commit("HEAD").unwrap();
    assert_eq!(head.oid.as_str(), repo.rev_parse("HEAD"));
}

// =============================================================================
// Revision Resolution Tests
// =============================================================================

#[test]
fn resolve_full_and_short_hash() {
    let repo = TestRepo::new();
    let head = repo.rev_parse("HEAD");
    let git = Git::open(repo.path()).unwrap();

    assert_eq!(git.resolve_commit(&head).unwrap().oid.as_str(), head);
    assert_eq!(git.resolve_commit(&head[..8]).unwrap().oid.as_str(), head);
}

#[test]
fn resolve_tag_and_relative_revision() {
    let repo = TestRepo::new();
    let first = repo.rev_parse("HEAD");
    repo.tag("v1");
    repo.write("a.txt", "a\n");
    repo.commit_all("Add a");
    let git = Git::open(repo.path()).unwrap();

    assert_eq!(git.resolve_commit("v1").unwrap().oid.as_str(), first);
    assert_eq!(git.resolve_commit("HEAD~1").unwrap().oid.as_str(), first);
    assert_eq!(git.resolve_commit("HEAD").unwrap().summary, "Add a");
}

#[test]
fn resolve_annotated_tag_peels_to_commit() {
    let repo = TestRepo::new();
    let head = repo.rev_parse("HEAD");
    common::run_git(repo.path(), &["tag", "-a", "v2", "-m", "release"]);
    let git = Git::open(repo.path()).unwrap();

    assert_eq!(git.resolve_commit("v2").unwrap().oid.as_str(), head);
}

#[test]
fn resolve_unknown_revision_fails() {
    let repo = TestRepo::new();
    let git = Git::open(repo.path()).unwrap();

    for revision in ["no-such-branch", "deadbeefdeadbeef", "HEAD~5", "HEAD^{tree}"] {
        match git.resolve_commit(revision) {
            Err(GitError::InvalidRevision { revision: r }) => assert_eq!(r, revision),
            other => panic!("{revision}: expected InvalidRevision, got {other:?}"),
        }
    }
}

#[test]
fn first_parent_of_child() {
    let repo = TestRepo::new();
    let first = repo.rev_parse("HEAD");
    repo.write("a.txt", "a\n");
    repo.commit_all("Add a");
    let git = Git::open(repo.path()).unwrap();

    let head = git.resolve_commit("HEAD").unwrap();
    assert!(!head.is_root());
    assert_eq!(git.first_parent(&head).unwrap().oid.as_str(), first);
}

#[test]
fn first_parent_of_root_fails() {
    let repo = TestRepo::new();
    let git = Git::open(repo.path()).unwrap();

    let root = git.resolve_commit("HEAD").unwrap();
    assert!(root.is_root());
    assert!(matches!(git.first_parent(&root), Err(GitError::NoParent { .. })));
}

// =============================================================================
// Change Enumeration Tests
// =============================================================================

#[test]
fn diff_added_modified_deleted() {
    let repo = TestRepo::new();
    repo.write("keep.txt", "one\n");
    repo.write("drop.txt", "bye\n");
    let old = repo.commit_all("Base");
    repo.write("keep.txt", "two\n");
    repo.remove("drop.txt");
    repo.write("src/new.rs", "fn main() {}\n");
    let new = repo.commit_all("Change");
    let git = Git::open(repo.path()).unwrap();

    let changes = git
        .diff_commits(&oid(&old), &oid(&new), &SimilarityOptions::default())
        .unwrap();
    let summary: Vec<String> = changes.iter().map(ToString::to_string).collect();

    assert_eq!(summary, vec!["D\tdrop.txt", "M\tkeep.txt", "A\tsrc/new.rs"]);
    assert!(changes[0].side(Side::New).is_none());
    assert!(changes[2].side(Side::Old).is_none());
}

#[test]
fn diff_detects_rename() {
    let repo = TestRepo::new();
    let body = "line\n".repeat(50);
    repo.write("lib/old_name.rs", &body);
    let old = repo.commit_all("Base");
    repo.git_mv("lib/old_name.rs", "lib/new_name.rs");
    let new = repo.commit_all("Rename");
    let git = Git::open(repo.path()).unwrap();

    let changes = git
        .diff_commits(&oid(&old), &oid(&new), &SimilarityOptions::default())
        .unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind(), ChangeKind::Renamed);
    assert_eq!(
        changes[0].side(Side::Old).unwrap().path().to_str(),
        Some("lib/old_name.rs")
    );
    assert_eq!(
        changes[0].side(Side::New).unwrap().path().to_str(),
        Some("lib/new_name.rs")
    );

    let plain = git.diff_commits(&oid(&old), &oid(&new), &no_similarity()).unwrap();
    let kinds: Vec<ChangeKind> = plain.iter().map(|c| c.kind()).collect();
    assert_eq!(kinds.len(), 2);
    assert!(kinds.contains(&ChangeKind::Added));
    assert!(kinds.contains(&ChangeKind::Deleted));
}

#[test]
fn diff_detects_copy_when_enabled() {
    let repo = TestRepo::new();
    let body = "shared content line\n".repeat(40);
    repo.write("orig.txt", &body);
    let old = repo.commit_all("Base");
    repo.write("orig.txt", format!("{body}tail\n"));
    repo.write("copy.txt", &body);
    let new = repo.commit_all("Copy");
    let git = Git::open(repo.path()).unwrap();

    let options = SimilarityOptions {
        copies: true,
        ..SimilarityOptions::default()
    };
    let changes = git.diff_commits(&oid(&old), &oid(&new), &options).unwrap();

    let copied = changes
        .iter()
        .find(|c| c.kind() == ChangeKind::Copied)
        .expect("copy not detected");
    assert_eq!(copied.side(Side::Old).unwrap().path().to_str(), Some("orig.txt"));
    assert_eq!(copied.side(Side::New).unwrap().path().to_str(), Some("copy.txt"));
}

#[cfg(unix)]
#[test]
fn diff_records_modes() {
    let repo = TestRepo::new();
    repo.write("run.sh", "#!/bin/sh\n");
    repo.chmod("run.sh", 0o644);
    let old = repo.commit_all("Script");
    repo.chmod("run.sh", 0o755);
    let new = repo.commit_all("Make executable");
    let git = Git::open(repo.path()).unwrap();

    let changes = git
        .diff_commits(&oid(&old), &oid(&new), &SimilarityOptions::default())
        .unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind(), ChangeKind::Modified);
    assert_eq!(changes[0].side(Side::Old).unwrap().mode().raw(), 0o100644);
    assert_eq!(changes[0].side(Side::New).unwrap().mode().raw(), 0o100755);
}

#[cfg(unix)]
#[test]
fn diff_reports_typechange() {
    let repo = TestRepo::new();
    repo.write("entry", "plain file\n");
    let old = repo.commit_all("File");
    repo.remove("entry");
    repo.symlink("README.md", "entry");
    let new = repo.commit_all("Symlink");
    let git = Git::open(repo.path()).unwrap();

    let changes = git.diff_commits(&oid(&old), &oid(&new), &no_similarity()).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind(), ChangeKind::TypeChanged);
    assert!(changes[0].side(Side::New).unwrap().mode().is_symlink());
}

#[test]
fn diff_is_stable() {
    let repo = TestRepo::new();
    let old = repo.rev_parse("HEAD");
    for name in ["z.txt", "a.txt", "m/inner.txt", "b/c/d.txt"] {
        repo.write(name, name);
    }
    let new = repo.commit_all("Many");
    let git = Git::open(repo.path()).unwrap();

    let first = git
        .diff_commits(&oid(&old), &oid(&new), &SimilarityOptions::default())
        .unwrap();
    let second = git
        .diff_commits(&oid(&old), &oid(&new), &SimilarityOptions::default())
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

// =============================================================================
// Blob Tests
// =============================================================================

#[test]
fn with_blob_lends_exact_bytes() {
    let repo = TestRepo::new();
    let old = repo.rev_parse("HEAD");
    let content: Vec<u8> = (0..=255u8).collect();
    repo.write("data.bin", &content);
    let new = repo.commit_all("Binary");
    let git = Git::open(repo.path()).unwrap();

    let changes = git
        .diff_commits(&oid(&old), &oid(&new), &SimilarityOptions::default())
        .unwrap();
    let blob = changes[0].side(Side::New).unwrap().blob();
    assert_eq!(git.with_blob(blob, <[u8]>::to_vec).unwrap(), content);
    assert_eq!(git.with_blob(blob, <[u8]>::len).unwrap(), 256);
}

#[test]
fn missing_blob_fails_without_calling_back() {
    let repo = TestRepo::new();
    let git = Git::open(repo.path()).unwrap();

    let mut called = false;
    let err = git
        .with_blob(&oid(&"1".repeat(40)), |_| called = true)
        .unwrap_err();
    assert!(!called);
    assert!(matches!(err, GitError::ObjectNotFound { .. }));
}
