//! core::format
//!
//! Output container kinds and their selection.
//!
//! The container is picked once, before any repository or filesystem work,
//! either from an explicit name (`--format tar.gz`) or by inferring it from
//! the output path's extension. Recognised-but-unimplemented containers
//! (`.tar.Z`, `.7z`, `.rar`) fail with [`FormatError::Unsupported`]; anything
//! else with an extension fails with [`FormatError::Unknown`]. A path
//! without an extension is a plain directory.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use oldnew::core::format::{Compression, OutputKind};
//!
//! assert_eq!(OutputKind::infer(Path::new("out")).unwrap(), OutputKind::Directory);
//! assert_eq!(
//!     OutputKind::infer(Path::new("out.tgz")).unwrap(),
//!     OutputKind::Tar(Compression::Gzip)
//! );
//! assert!(OutputKind::infer(Path::new("out.rar")).is_err());
//! ```

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// Errors from output format selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The extension names a known container this tool cannot produce.
    #[error("unsupported output format '{extension}'")]
    Unsupported { extension: String },

    /// The extension is not recognised at all.
    #[error("unknown output format '{extension}'")]
    Unknown { extension: String },
}

/// Compression filter applied to a tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    None,
    Gzip,
    Xz,
    Bzip2,
}

/// The shape of the packaged output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// A plain directory holding the two subtrees.
    Directory,
    /// A tar archive, optionally compressed.
    Tar(Compression),
    /// A deflate-compressed zip archive.
    Zip,
}

/// Suffixes that map to a container kind. Compound suffixes come before
/// their tails so the longest match wins.
const SUPPORTED: &[(&str, OutputKind)] = &[
    (".tar.gz", OutputKind::Tar(Compression::Gzip)),
    (".tgz", OutputKind::Tar(Compression::Gzip)),
    (".tar.xz", OutputKind::Tar(Compression::Xz)),
    (".txz", OutputKind::Tar(Compression::Xz)),
    (".tar.bz2", OutputKind::Tar(Compression::Bzip2)),
    (".tbz2", OutputKind::Tar(Compression::Bzip2)),
    (".tar", OutputKind::Tar(Compression::None)),
    (".zip", OutputKind::Zip),
];

/// Suffixes that are recognised but never produced.
const UNSUPPORTED: &[&str] = &[".tar.Z", ".7z", ".rar"];

/// Names accepted for an explicit directory output.
const DIRECTORY_NAMES: &[&str] = &["dir", "directory"];

impl OutputKind {
    /// Infer the container kind from an output path's file name.
    ///
    /// Matching is case-sensitive. A leading dot (hidden file) does not
    /// start an extension.
    pub fn infer(path: &Path) -> Result<Self, FormatError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some((_, kind)) = SUPPORTED.iter().find(|(suffix, _)| {
            name.len() > suffix.len() && name.ends_with(suffix)
        }) {
            return Ok(*kind);
        }

        if let Some(suffix) = UNSUPPORTED
            .iter()
            .find(|suffix| name.len() > suffix.len() && name.ends_with(*suffix))
        {
            return Err(FormatError::Unsupported {
                extension: (*suffix).to_string(),
            });
        }

        match extension_of(&name) {
            None => Ok(OutputKind::Directory),
            Some(extension) => Err(FormatError::Unknown {
                extension: extension.to_string(),
            }),
        }
    }

    /// Parse an explicit format name such as `tar.gz`, `zip` or `dir`.
    ///
    /// Accepts every suffix [`infer`](Self::infer) knows, with or without the
    /// leading dot.
    pub fn from_name(name: &str) -> Result<Self, FormatError> {
        if DIRECTORY_NAMES.contains(&name) {
            return Ok(OutputKind::Directory);
        }

        let dotted = if name.starts_with('.') {
            name.to_string()
        } else {
            format!(".{}", name)
        };

        if let Some((_, kind)) = SUPPORTED.iter().find(|(suffix, _)| *suffix == dotted) {
            return Ok(*kind);
        }
        if UNSUPPORTED.contains(&dotted.as_str()) {
            return Err(FormatError::Unsupported { extension: dotted });
        }
        Err(FormatError::Unknown {
            extension: name.to_string(),
        })
    }

    /// Short label used in reports and logs.
    pub fn label(self) -> &'static str {
        match self {
            OutputKind::Directory => "directory",
            OutputKind::Tar(Compression::None) => "tar",
            OutputKind::Tar(Compression::Gzip) => "tar.gz",
            OutputKind::Tar(Compression::Xz) => "tar.xz",
            OutputKind::Tar(Compression::Bzip2) => "tar.bz2",
            OutputKind::Zip => "zip",
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for OutputKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Everything from the first dot that does not begin the name.
fn extension_of(name: &str) -> Option<&str> {
    let stem_start = name.len() - name.trim_start_matches('.').len();
    name[stem_start..]
        .find('.')
        .map(|offset| &name[stem_start + offset..])
}
