//! Property-based tests for core domain types.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::path::Path;

use proptest::prelude::*;

use oldnew::core::format::{Compression, OutputKind};
use oldnew::core::types::{Change, ChangeKind, ChangeSide, FileMode, Oid, Side, SIDE_POLICY};

/// Strategy for file stems without dots.
fn stem() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,20}"
}

/// Strategy for valid relative paths of one to four components.
fn relative_path() -> impl Strategy<Value = String> {
    prop::collection::vec(stem(), 1..5).prop_map(|parts| parts.join("/"))
}

fn change_kind() -> impl Strategy<Value = ChangeKind> {
    prop::sample::select(ChangeKind::ALL.to_vec())
}

fn blob() -> Oid {
    Oid::new("e".repeat(40)).unwrap()
}

proptest! {
    #[test]
    fn permissions_are_low_nine_bits(raw in any::<u32>()) {
        let mode = FileMode::new(raw);
        prop_assert_eq!(mode.permissions(), raw & 0o777);
        prop_assert!(mode.permissions() <= 0o777);
    }

    #[test]
    fn type_bits_do_not_affect_permissions(perm in 0u32..=0o777) {
        for type_bits in [0o100000u32, 0o120000, 0o160000, 0o040000] {
            prop_assert_eq!(FileMode::new(type_bits | perm).permissions(), perm);
        }
    }

    #[test]
    fn extensionless_names_are_directories(name in stem(), dir in relative_path()) {
        let path = Path::new(&dir).join(&name);
        prop_assert_eq!(OutputKind::infer(&path).unwrap(), OutputKind::Directory);
    }

    #[test]
    fn known_suffixes_are_inferred(name in stem()) {
        let cases = [
            (".tar", OutputKind::Tar(Compression::None)),
            (".tar.gz", OutputKind::Tar(Compression::Gzip)),
            (".tgz", OutputKind::Tar(Compression::Gzip)),
            (".tar.xz", OutputKind::Tar(Compression::Xz)),
            (".txz", OutputKind::Tar(Compression::Xz)),
            (".tar.bz2", OutputKind::Tar(Compression::Bzip2)),
            (".tbz2", OutputKind::Tar(Compression::Bzip2)),
            (".zip", OutputKind::Zip),
        ];
        for (suffix, kind) in cases {
            let file = format!("{name}{suffix}");
            prop_assert_eq!(OutputKind::infer(Path::new(&file)).unwrap(), kind);
        }
    }

    #[test]
    fn unsupported_suffixes_are_rejected(name in stem()) {
        for suffix in [".tar.Z", ".7z", ".rar"] {
            let file = format!("{name}{suffix}");
            prop_assert!(OutputKind::infer(Path::new(&file)).is_err());
        }
    }

    #[test]
    fn explicit_format_matches_inference(name in stem()) {
        for label in ["tar", "tar.gz", "tar.xz", "tar.bz2", "zip"] {
            let file = format!("{name}.{label}");
            prop_assert_eq!(
                OutputKind::from_name(label).unwrap(),
                OutputKind::infer(Path::new(&file)).unwrap()
            );
        }
    }

    #[test]
    fn written_sides_are_subset_of_present_sides(kind in change_kind(), path in relative_path()) {
        let required = kind.required_sides();
        let side = || ChangeSide::new(&path, FileMode::new(0o100644), blob()).unwrap();
        let change = Change::new(
            kind,
            required.old.then(side),
            required.new.then(side),
        )
        .unwrap();

        for (written, _) in change.sides_to_write() {
            prop_assert!(change.side(written).is_some());
            prop_assert!(SIDE_POLICY[kind as usize].writes(written));
        }
    }

    #[test]
    fn non_regular_sides_are_never_written(kind in change_kind(), type_bits in prop::sample::select(vec![0o120000u32, 0o160000])) {
        let required = kind.required_sides();
        let side = || ChangeSide::new("entry", FileMode::new(type_bits), blob()).unwrap();
        let change = Change::new(kind, required.old.then(side), required.new.then(side)).unwrap();

        prop_assert_eq!(change.sides_to_write().count(), 0);
    }
}

#[test]
fn policy_table_rows() {
    let expected = [
        (ChangeKind::Added, false, true),
        (ChangeKind::Deleted, true, false),
        (ChangeKind::Modified, true, true),
        (ChangeKind::Renamed, true, true),
        (ChangeKind::Copied, false, true),
        (ChangeKind::TypeChanged, true, true),
    ];
    for (kind, old, new) in expected {
        let policy = kind.sides();
        assert_eq!(policy.writes(Side::Old), old, "{kind}");
        assert_eq!(policy.writes(Side::New), new, "{kind}");
    }
}
