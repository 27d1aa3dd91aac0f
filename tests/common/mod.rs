//! Shared fixtures for integration tests.
//!
//! Repositories are built with the real `git` binary inside a temp dir.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Test fixture that creates a real git repository.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a repository with no commits.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-q"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);
        run_git(dir.path(), &["config", "core.filemode", "true"]);

        Self { dir }
    }

    /// Create a repository with an initial commit adding `README.md`.
    pub fn new() -> Self {
        let repo = Self::empty();
        repo.write("README.md", "# Test Repo\n");
        repo.commit_all("Initial commit");
        repo
    }

    /// Get the path to the repository.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file in the work tree, creating parent directories.
    pub fn write(&self, path: &str, content: impl AsRef<[u8]>) {
        let full = self.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    /// Set a work tree file's permission bits.
    #[cfg(unix)]
    pub fn chmod(&self, path: &str, mode: u32) {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(self.path().join(path), fs::Permissions::from_mode(mode)).unwrap();
    }

    /// Create a symlink in the work tree.
    #[cfg(unix)]
    pub fn symlink(&self, target: &str, link: &str) {
        std::os::unix::fs::symlink(target, self.path().join(link)).unwrap();
    }

    /// Remove a file from the work tree.
    pub fn remove(&self, path: &str) {
        fs::remove_file(self.path().join(path)).unwrap();
    }

    /// Rename a tracked file.
    pub fn git_mv(&self, from: &str, to: &str) {
        if let Some(parent) = self.path().join(to).parent() {
            fs::create_dir_all(parent).unwrap();
        }
        run_git(self.path(), &["mv", from, to]);
    }

    /// Stage everything and commit, returning the new HEAD OID.
    pub fn commit_all(&self, message: &str) -> String {
        run_git(self.path(), &["add", "-A"]);
        run_git(self.path(), &["commit", "-q", "--allow-empty", "-m", message]);
        self.rev_parse("HEAD")
    }

    /// Tag the current HEAD.
    pub fn tag(&self, name: &str) {
        run_git(self.path(), &["tag", name]);
    }

    /// Resolve a revision with `git rev-parse`.
    pub fn rev_parse(&self, revision: &str) -> String {
        let output = Command::new("git")
            .args(["rev-parse", revision])
            .current_dir(self.path())
            .output()
            .expect("git rev-parse failed");
        assert!(output.status.success(), "rev-parse {} failed", revision);
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    /// Clone this repository as a bare repository under `dest`.
    pub fn clone_bare(&self, dest: &Path) -> PathBuf {
        let target = dest.join("bare.git");
        let source = self.path().to_string_lossy().into_owned();
        let target_str = target.to_string_lossy().into_owned();
        run_git(dest, &["clone", "-q", "--bare", &source, &target_str]);
        target
    }
}

/// Run a git command in the given directory.
pub fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Every regular file under `root`, as sorted `/`-separated relative paths.
pub fn files_under(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(Result::unwrap)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

/// Permission bits of a file.
#[cfg(unix)]
pub fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path).unwrap().permissions().mode() & 0o777
}
