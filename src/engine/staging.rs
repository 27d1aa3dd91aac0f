//! engine::staging
//!
//! The temporary staging area for one pipeline run.
//!
//! A [`StagingArea`] owns a uniquely named temporary directory holding the
//! `old` and `new` subtrees. The directory is removed when the value is
//! dropped, so every exit path out of the pipeline (success, early `?`
//! return, or a panic unwinding through it) releases it. The subtrees
//! themselves are only created as files are written into them.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::core::types::{Side, SubdirNames};

const PREFIX: &str = ".oldnew-staging-";

/// Scoped staging directory with one subtree per side.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
    names: SubdirNames,
}

impl StagingArea {
    /// Create a staging area.
    ///
    /// With `parent`, the directory is created inside it (so a later move
    /// into a sibling path stays on one filesystem); otherwise it goes in
    /// the system temp directory.
    pub fn create(parent: Option<&Path>, names: SubdirNames) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };

        debug!(root = %dir.path().display(), "created staging area");
        Ok(Self { dir, names })
    }

    /// The staging root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Root of the subtree for one side. May not exist yet.
    pub fn side_root(&self, side: Side) -> PathBuf {
        self.dir.path().join(self.names.get(side))
    }

    /// Remove the staging directory, reporting any failure.
    ///
    /// Dropping the area also removes it, silently.
    pub fn close(self) -> io::Result<()> {
        let root = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(root = %root.display(), "removed staging area");
        Ok(())
    }
}
