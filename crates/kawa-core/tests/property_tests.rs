//! Property-based tests for path containment and digesting.

#![allow(clippy::expect_used)]

use kawa_core::copy::CopyBuffer;
use kawa_core::copy::copy_with_buffer;
use kawa_core::digest::digest;
use kawa_core::digest::digest_reader;
use kawa_core::digest::is_valid_digest;
use kawa_core::types::DestDir;
use kawa_core::types::ModuleName;
use kawa_core::types::SafePath;
use proptest::prelude::*;
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;

fn create_test_dest() -> (TempDir, DestDir) {
    let temp = TempDir::new().expect("failed to create temp dir");
    let dest = DestDir::new(temp.path()).expect("failed to create dest");
    (temp, dest)
}

proptest! {
    /// A `..` that climbs past the root is rejected wherever it appears.
    #[test]
    fn prop_escaping_parent_traversal_rejected(
        depth in 0usize..4,
        suffix in "([a-z]{1,8}/?){0,4}"
    ) {
        let (_temp, dest) = create_test_dest();
        let down: String = (0..depth).map(|i| format!("d{i}/")).collect();
        let up = "../".repeat(depth + 1);
        let path = PathBuf::from(format!("{down}{up}{suffix}"));
        prop_assert!(SafePath::validate(&path, &dest).is_err(), "{path:?} must be rejected");
    }

    /// Plain relative paths are accepted and stay under the root.
    #[test]
    fn prop_relative_paths_stay_contained(
        components in prop::collection::vec("[a-zA-Z0-9_-]{1,20}", 1..6)
    ) {
        let (_temp, dest) = create_test_dest();
        let path = PathBuf::from(components.join("/"));
        let safe = SafePath::validate(&path, &dest).expect("plain path is safe");
        prop_assert!(dest.join(&safe).starts_with(dest.as_path()));
        prop_assert_eq!(safe.as_path(), path.as_path());
    }

    /// Inner `..` segments that never climb past the root are resolved, not
    /// rejected.
    #[test]
    fn prop_balanced_parent_segments_resolve(
        head in "[a-z]{1,8}",
        detour in "[a-z]{1,8}",
        tail in "[a-z]{1,8}"
    ) {
        let (_temp, dest) = create_test_dest();
        let path = PathBuf::from(format!("{head}/{detour}/../{tail}"));
        let safe = SafePath::validate(&path, &dest).expect("balanced path is safe");
        let expected = PathBuf::from(format!("{head}/{tail}"));
        prop_assert_eq!(safe.as_path(), expected.as_path());
    }

    /// Absolute paths are always rejected.
    #[cfg(unix)]
    #[test]
    fn prop_absolute_paths_rejected(
        components in prop::collection::vec("[a-z]{1,8}", 0..4)
    ) {
        let (_temp, dest) = create_test_dest();
        let path = PathBuf::from(format!("/{}", components.join("/")));
        prop_assert!(SafePath::validate(&path, &dest).is_err());
    }

    /// Module names containing a separator never parse.
    #[test]
    fn prop_module_names_with_separators_rejected(
        left in "[a-z]{0,8}",
        sep in "[/\\\\]",
        right in "[a-z]{0,8}"
    ) {
        let name = format!("{left}{sep}{right}");
        prop_assert!(ModuleName::parse(&name).is_err());
    }

    /// The digest is deterministic, 64 lowercase hex characters, and the
    /// streaming form agrees with the one-shot form.
    #[test]
    fn prop_digest_deterministic(
        data in prop::collection::vec(any::<u8>(), 0..200_000)
    ) {
        let once = digest(&data);
        prop_assert_eq!(&once, &digest(&data));
        prop_assert!(is_valid_digest(&once));

        let mut buffer = CopyBuffer::new();
        let streamed = digest_reader(&mut Cursor::new(&data), &mut buffer)
            .expect("reading from memory cannot fail");
        prop_assert_eq!(once, streamed);
    }

    /// Changing a single byte changes the digest.
    #[test]
    fn prop_digest_detects_single_byte_change(
        data in prop::collection::vec(any::<u8>(), 1..4096),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255
    ) {
        let mut changed = data.clone();
        let i = index.index(changed.len());
        changed[i] ^= flip;
        prop_assert_ne!(digest(&data), digest(&changed));
    }

    /// Copying through the shared buffer preserves data exactly.
    #[test]
    fn prop_copy_preserves_data(
        data in prop::collection::vec(any::<u8>(), 0..100_000)
    ) {
        let mut buffer = CopyBuffer::new();
        let mut input = Cursor::new(&data);
        let mut output = Vec::new();

        let copied = copy_with_buffer(&mut input, &mut output, &mut buffer)
            .expect("copy should succeed");
        prop_assert_eq!(copied, data.len() as u64);
        prop_assert_eq!(output, data);
    }
}
