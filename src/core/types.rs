//! core::types
//!
//! Strong types for the commit-diff domain.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA)
//! - [`FileMode`] - Raw mode recorded in a Git tree entry
//! - [`ChangeKind`] - Classification of one path's difference
//! - [`ChangeSide`] / [`Change`] - One entry of a commit-to-commit diff
//! - [`Side`] / [`SidePolicy`] - Which staged tree a change side lands in
//! - [`SubdirName`] - Validated name of the `old`/`new` output subdirectory
//!
//! # Validation
//!
//! These types enforce validity at construction time. A [`Change`] always
//! carries exactly the sides its kind requires, and every side path is a
//! relative path made of normal components only.
//!
//! # Examples
//!
//! ```
//! use oldnew::core::types::{ChangeKind, FileMode, Side};
//!
//! assert_eq!(FileMode::new(0o100755).permissions(), 0o755);
//! assert!(ChangeKind::Modified.sides().writes(Side::Old));
//! assert!(!ChangeKind::Added.sides().writes(Side::Old));
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid change path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid {kind} change: {reason}")]
    InvalidChange { kind: ChangeKind, reason: String },

    #[error("invalid subdirectory name '{name}': {reason}")]
    InvalidSubdirName { name: String, reason: String },
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use oldnew::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// assert!(Oid::new("not-a-sha").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters, or the full OID if `len` exceeds it.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The raw mode recorded for a path in a Git tree.
///
/// Git stores a type in the high bits (`0o100000` regular file,
/// `0o120000` symlink, `0o160000` submodule) and permission bits in the
/// low nine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileMode(u32);

impl FileMode {
    const TYPE_MASK: u32 = 0o170000;
    const REGULAR: u32 = 0o100000;
    const SYMLINK: u32 = 0o120000;

    /// Wrap a raw mode value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw mode value, type bits included.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Owner/group/other read-write-execute bits, with type bits discarded.
    pub const fn permissions(self) -> u32 {
        self.0 & 0o777
    }

    /// Whether the entry is a regular file (the only kind ever staged).
    pub const fn is_regular_file(self) -> bool {
        self.0 & Self::TYPE_MASK == Self::REGULAR
    }

    /// Whether the entry is a symbolic link.
    pub const fn is_symlink(self) -> bool {
        self.0 & Self::TYPE_MASK == Self::SYMLINK
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.0)
    }
}

/// One of the two staged trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Pre-change contents.
    Old,
    /// Post-change contents.
    New,
}

impl Side {
    /// Both sides, old first.
    pub const ALL: [Side; 2] = [Side::Old, Side::New];
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Old => write!(f, "old"),
            Side::New => write!(f, "new"),
        }
    }
}

/// Which sides of a change get materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidePolicy {
    pub old: bool,
    pub new: bool,
}

impl SidePolicy {
    /// Whether this policy writes the given side.
    pub const fn writes(self, side: Side) -> bool {
        match side {
            Side::Old => self.old,
            Side::New => self.new,
        }
    }
}

/// Classification of one path's difference between two commits.
///
/// The discriminant indexes [`SIDE_POLICY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(usize)]
pub enum ChangeKind {
    Added = 0,
    Deleted = 1,
    Modified = 2,
    Renamed = 3,
    Copied = 4,
    /// Entry type changed (e.g. regular file to symlink).
    TypeChanged = 5,
}

/// Kind -> sides to materialize, indexed by `ChangeKind as usize`.
///
/// | kind | old | new |
/// |---|---|---|
/// | added | no | yes |
/// | deleted | yes | no |
/// | modified | yes | yes |
/// | renamed | yes | yes |
/// | copied | no | yes |
/// | type changed | yes | yes |
pub const SIDE_POLICY: [SidePolicy; 6] = [
    SidePolicy { old: false, new: true },
    SidePolicy { old: true, new: false },
    SidePolicy { old: true, new: true },
    SidePolicy { old: true, new: true },
    SidePolicy { old: false, new: true },
    SidePolicy { old: true, new: true },
];

impl ChangeKind {
    /// Every kind, in discriminant order.
    pub const ALL: [ChangeKind; 6] = [
        ChangeKind::Added,
        ChangeKind::Deleted,
        ChangeKind::Modified,
        ChangeKind::Renamed,
        ChangeKind::Copied,
        ChangeKind::TypeChanged,
    ];

    /// Sides of a change of this kind that are written to staging.
    pub fn sides(self) -> SidePolicy {
        SIDE_POLICY[self as usize]
    }

    /// Sides a change of this kind must carry.
    ///
    /// Differs from [`sides`](Self::sides) only for copies, which record a
    /// source path that is never materialized.
    pub fn required_sides(self) -> SidePolicy {
        match self {
            ChangeKind::Added => SidePolicy { old: false, new: true },
            ChangeKind::Deleted => SidePolicy { old: true, new: false },
            _ => SidePolicy { old: true, new: true },
        }
    }

    /// Single-letter status code as printed by `git diff --name-status`.
    pub fn letter(self) -> char {
        match self {
            ChangeKind::Added => 'A',
            ChangeKind::Deleted => 'D',
            ChangeKind::Modified => 'M',
            ChangeKind::Renamed => 'R',
            ChangeKind::Copied => 'C',
            ChangeKind::TypeChanged => 'T',
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChangeKind::Added => "added",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Modified => "modified",
            ChangeKind::Renamed => "renamed",
            ChangeKind::Copied => "copied",
            ChangeKind::TypeChanged => "type-changed",
        };
        write!(f, "{}", name)
    }
}

/// One side (old or new) of a change: where the file lived, its mode and
/// the blob holding its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSide {
    path: PathBuf,
    mode: FileMode,
    blob: Oid,
}

impl ChangeSide {
    /// Create a change side.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPath` unless `path` is non-empty, relative,
    /// and made of normal components only (no `..`, no root).
    pub fn new(path: impl Into<PathBuf>, mode: FileMode, blob: Oid) -> Result<Self, TypeError> {
        let path = path.into();
        validate_relative(&path)?;
        Ok(Self { path, mode, blob })
    }

    /// Path relative to the repository root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode recorded in the tree.
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Blob holding the file's bytes.
    pub fn blob(&self) -> &Oid {
        &self.blob
    }
}

fn validate_relative(path: &Path) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidPath {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };

    if path.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            Component::ParentDir => return Err(invalid("path escapes its root")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("path must be relative"))
            }
            Component::CurDir => return Err(invalid("path contains '.'")),
        }
    }
    Ok(())
}

/// One entry in the diff between two commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    kind: ChangeKind,
    old: Option<ChangeSide>,
    new: Option<ChangeSide>,
}

impl Change {
    /// Create a change, checking that it carries exactly the sides its kind
    /// requires.
    ///
    /// # Example
    ///
    /// ```
    /// use oldnew::core::types::{Change, ChangeKind, ChangeSide, FileMode, Oid};
    ///
    /// let blob = Oid::new("e69de29bb2d1d6434b8b29ae775ad8c2e48c5391").unwrap();
    /// let side = ChangeSide::new("src/main.c", FileMode::new(0o100644), blob).unwrap();
    ///
    /// assert!(Change::new(ChangeKind::Added, None, Some(side.clone())).is_ok());
    /// assert!(Change::new(ChangeKind::Added, Some(side), None).is_err());
    /// ```
    pub fn new(
        kind: ChangeKind,
        old: Option<ChangeSide>,
        new: Option<ChangeSide>,
    ) -> Result<Self, TypeError> {
        let required = kind.required_sides();
        if required.old != old.is_some() {
            return Err(TypeError::InvalidChange {
                kind,
                reason: if required.old {
                    "missing old side".into()
                } else {
                    "unexpected old side".into()
                },
            });
        }
        if required.new != new.is_some() {
            return Err(TypeError::InvalidChange {
                kind,
                reason: if required.new {
                    "missing new side".into()
                } else {
                    "unexpected new side".into()
                },
            });
        }
        Ok(Self { kind, old, new })
    }

    /// The change classification.
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// The requested side, if the change carries it.
    pub fn side(&self, side: Side) -> Option<&ChangeSide> {
        match side {
            Side::Old => self.old.as_ref(),
            Side::New => self.new.as_ref(),
        }
    }

    /// Sides that should be written to staging: those selected by the kind's
    /// [`SidePolicy`] whose mode is a regular file.
    pub fn sides_to_write(&self) -> impl Iterator<Item = (Side, &ChangeSide)> + '_ {
        let policy = self.kind.sides();
        Side::ALL.into_iter().filter_map(move |side| {
            if !policy.writes(side) {
                return None;
            }
            self.side(side)
                .filter(|s| s.mode().is_regular_file())
                .map(|s| (side, s))
        })
    }

    /// Path used when reporting this change: the new path when present.
    pub fn display_path(&self) -> &Path {
        self.new
            .as_ref()
            .or(self.old.as_ref())
            .map(ChangeSide::path)
            .unwrap_or_else(|| Path::new(""))
    }
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.kind, &self.old, &self.new) {
            (ChangeKind::Renamed | ChangeKind::Copied, Some(old), Some(new)) => write!(
                f,
                "{}\t{} -> {}",
                self.kind.letter(),
                old.path().display(),
                new.path().display()
            ),
            _ => write!(f, "{}\t{}", self.kind.letter(), self.display_path().display()),
        }
    }
}

/// Validated name of one of the two output subdirectories.
///
/// The name becomes a single path component under the staging root and the
/// packaged output, so separators and relative markers are rejected.
///
/// # Example
///
/// ```
/// use oldnew::core::types::SubdirName;
///
/// assert!(SubdirName::new("before").is_ok());
/// assert!(SubdirName::new("a/b").is_err());
/// assert!(SubdirName::new("..").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubdirName(String);

impl SubdirName {
    /// Create a validated subdirectory name.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        let invalid = |reason: &str| TypeError::InvalidSubdirName {
            name: name.clone(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("name cannot be empty"));
        }
        if name == "." || name == ".." {
            return Err(invalid("name cannot be a relative marker"));
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(invalid("name must be a single path component"));
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubdirName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<Path> for SubdirName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

/// The pair of subdirectory names used inside packaged output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdirNames {
    old: SubdirName,
    new: SubdirName,
}

impl SubdirNames {
    /// Pair two names; they must differ.
    pub fn new(old: SubdirName, new: SubdirName) -> Result<Self, TypeError> {
        if old == new {
            return Err(TypeError::InvalidSubdirName {
                name: new.0,
                reason: "old and new directory names must differ".into(),
            });
        }
        Ok(Self { old, new })
    }

    /// Name for the given side.
    pub fn get(&self, side: Side) -> &SubdirName {
        match side {
            Side::Old => &self.old,
            Side::New => &self.new,
        }
    }
}

impl Default for SubdirNames {
    fn default() -> Self {
        Self {
            old: SubdirName("old".into()),
            new: SubdirName("new".into()),
        }
    }
}
