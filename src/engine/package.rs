//! engine::package
//!
//! Turns a populated staging tree into the requested output.
//!
//! # Output kinds
//!
//! - **Directory**: the target directory is created fresh and each
//!   immediate child of the staging root (`old/`, `new/`) is renamed into
//!   it.
//! - **Tar**: every regular file under the staging root is appended with
//!   its root-relative path as the entry name, through the requested
//!   compression filter.
//! - **Zip**: the same file set, deflate-compressed.
//!
//! # Invariants
//!
//! - The target is never overwritten; it is created with exclusive
//!   semantics and an existing path fails with
//!   [`PipelineError::OutputAlreadyExists`].
//! - A failure after the target was created removes it again, so a failed
//!   run leaves no partial output behind.
//! - Files are visited in sorted order, so entry order is stable.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::core::format::{Compression, OutputKind};
use crate::engine::error::PipelineError;

/// Compression level passed to the xz encoder.
const XZ_PRESET: u32 = 6;

/// A regular file found under the staging root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the staging root.
    pub relative: PathBuf,
    /// Permission bits of the staged file.
    pub mode: u32,
    /// Size in bytes.
    pub size: u64,
}

impl StagedFile {
    /// Archive entry name: the relative path with `/` separators.
    pub fn entry_name(&self) -> String {
        self.relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Fail with [`PipelineError::OutputAlreadyExists`] if anything (file,
/// directory, or dangling symlink) is at `target`.
pub fn ensure_absent(target: &Path) -> Result<(), PipelineError> {
    if fs::symlink_metadata(target).is_ok() {
        return Err(PipelineError::OutputAlreadyExists {
            path: target.to_path_buf(),
        });
    }
    Ok(())
}

/// Every regular file under `root`, sorted by path.
pub fn staged_files(root: &Path) -> io::Result<Vec<StagedFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = entry.metadata()?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(io::Error::other)?
            .to_path_buf();

        files.push(StagedFile {
            path: entry.path().to_path_buf(),
            relative,
            mode: permission_bits(&metadata),
            size: metadata.len(),
        });
    }
    Ok(files)
}

/// Package the staging tree at `staging_root` into `target`.
///
/// Returns the number of files in the output.
pub fn package(
    staging_root: &Path,
    target: &Path,
    kind: OutputKind,
) -> Result<usize, PipelineError> {
    ensure_absent(target)?;

    let files =
        staged_files(staging_root).map_err(|e| PipelineError::packaging(staging_root, e))?;
    debug!(
        output = %target.display(),
        kind = %kind,
        files = files.len(),
        "packaging"
    );

    match kind {
        OutputKind::Directory => move_into_directory(staging_root, target)?,
        OutputKind::Tar(compression) => {
            let file = create_target_file(target)?;
            let guard = OutputGuard::new(target);
            write_tar(file, compression, &files)
                .map_err(|e| PipelineError::packaging(target, e))?;
            guard.commit();
        }
        OutputKind::Zip => {
            let file = create_target_file(target)?;
            let guard = OutputGuard::new(target);
            write_zip(file, &files).map_err(|e| PipelineError::packaging(target, e))?;
            guard.commit();
        }
    }

    Ok(files.len())
}

fn move_into_directory(staging_root: &Path, target: &Path) -> Result<(), PipelineError> {
    fs::create_dir(target).map_err(|e| already_exists_or(target, e))?;
    let guard = OutputGuard::new(target);

    let mut children = fs::read_dir(staging_root)
        .and_then(|entries| entries.collect::<io::Result<Vec<_>>>())
        .map_err(|e| PipelineError::packaging(staging_root, e))?;
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let destination = target.join(child.file_name());
        fs::rename(child.path(), &destination)
            .map_err(|e| PipelineError::packaging(&destination, e))?;
    }

    guard.commit();
    Ok(())
}

fn create_target_file(target: &Path) -> Result<File, PipelineError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .map_err(|e| already_exists_or(target, e))
}

fn already_exists_or(target: &Path, err: io::Error) -> PipelineError {
    if err.kind() == io::ErrorKind::AlreadyExists {
        PipelineError::OutputAlreadyExists {
            path: target.to_path_buf(),
        }
    } else {
        PipelineError::packaging(target, err)
    }
}

fn write_tar(file: File, compression: Compression, files: &[StagedFile]) -> io::Result<()> {
    match compression {
        Compression::None => {
            append_all(tar::Builder::new(file), files)?.sync_all()?;
        }
        Compression::Gzip => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            append_all(tar::Builder::new(encoder), files)?
                .finish()?
                .sync_all()?;
        }
        Compression::Xz => {
            let encoder = xz2::write::XzEncoder::new(file, XZ_PRESET);
            append_all(tar::Builder::new(encoder), files)?
                .finish()?
                .sync_all()?;
        }
        Compression::Bzip2 => {
            let encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
            append_all(tar::Builder::new(encoder), files)?
                .finish()?
                .sync_all()?;
        }
    }
    Ok(())
}

/// Append every file and finish the archive, handing back the writer.
fn append_all<W: Write>(mut builder: tar::Builder<W>, files: &[StagedFile]) -> io::Result<W> {
    for staged in files {
        builder.append_path_with_name(&staged.path, &staged.relative)?;
    }
    builder.into_inner()
}

fn write_zip(file: File, files: &[StagedFile]) -> io::Result<()> {
    let mut writer = zip::ZipWriter::new(file);

    for staged in files {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(staged.mode)
            .large_file(staged.size > u64::from(u32::MAX));
        writer
            .start_file(staged.entry_name(), options)
            .map_err(io::Error::other)?;

        let mut source = File::open(&staged.path)?;
        io::copy(&mut source, &mut writer)?;
    }

    writer.finish().map_err(io::Error::other)?.sync_all()
}

#[cfg(unix)]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

/// Removes a freshly created output unless the packaging step completed.
struct OutputGuard<'a> {
    path: &'a Path,
    armed: bool,
}

impl<'a> OutputGuard<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, armed: true }
    }

    fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for OutputGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let result = if self.path.is_dir() {
            fs::remove_dir_all(self.path)
        } else {
            fs::remove_file(self.path)
        };
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "failed to remove partial output");
        }
    }
}
