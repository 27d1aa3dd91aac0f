//! engine::materialize
//!
//! Writes the sides of a change into the staging tree.
//!
//! For each side selected by the change kind's [`SidePolicy`], the blob's
//! bytes are borrowed from the source and written to `<side-root>/<path>` with missing parent
//! directories created, the file opened for exclusive creation, and the
//! permission bits set to the low nine bits of the recorded mode. Sides
//! that are not regular files (symlinks, submodules) are never written.
//!
//! Any I/O failure is returned as [`PipelineError::StagingIo`]; the caller
//! owns the staging area and drops it on the way out.
//!
//! [`SidePolicy`]: crate::core::types::SidePolicy

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, trace};

use crate::core::types::{Change, ChangeSide, FileMode, Side};
use crate::engine::error::PipelineError;
use crate::engine::staging::StagingArea;
use crate::git::BlobSource;

/// Number of files written per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StagedCounts {
    pub old: usize,
    pub new: usize,
}

impl StagedCounts {
    fn record(&mut self, side: Side) {
        match side {
            Side::Old => self.old += 1,
            Side::New => self.new += 1,
        }
    }
}

impl AddAssign for StagedCounts {
    fn add_assign(&mut self, other: Self) {
        self.old += other.old;
        self.new += other.new;
    }
}

/// Materialize one change into the staging area.
pub fn materialize<S: BlobSource>(
    source: &S,
    change: &Change,
    staging: &StagingArea,
) -> Result<StagedCounts, PipelineError> {
    let mut counts = StagedCounts::default();

    for (side, change_side) in change.sides_to_write() {
        let path = write_side(source, change_side, &staging.side_root(side))?;
        trace!(%side, path = %path.display(), mode = %change_side.mode(), "staged file");
        counts.record(side);
    }

    let policy = change.kind().sides();
    for side in Side::ALL {
        if let Some(skipped) = change.side(side).filter(|s| {
            policy.writes(side) && !s.mode().is_regular_file()
        }) {
            debug!(
                %side,
                path = %skipped.path().display(),
                mode = %skipped.mode(),
                "skipping non-regular entry"
            );
        }
    }

    Ok(counts)
}

/// Write one side's blob under `root`, returning the file's path.
pub fn write_side<S: BlobSource>(
    source: &S,
    side: &ChangeSide,
    root: &Path,
) -> Result<PathBuf, PipelineError> {
    let target = root.join(side.path());

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::staging(parent, e))?;
    }

    source
        .with_blob(side.blob(), |bytes| write_new_file(&target, bytes, side.mode()))?
        .map_err(|e| PipelineError::staging(&target, e))?;

    Ok(target)
}

/// Create `path` exclusively and fill it with `bytes`.
fn write_new_file(path: &Path, bytes: &[u8], mode: FileMode) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(bytes)?;
    apply_mode(&file, mode)
}

#[cfg(unix)]
fn apply_mode(file: &File, mode: FileMode) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(mode.permissions()))
}

#[cfg(not(unix))]
fn apply_mode(_file: &File, _mode: FileMode) -> io::Result<()> {
    Ok(())
}
