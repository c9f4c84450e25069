//! Property-based tests using proptest.
//!
//! These tests verify invariants of the path, entry and container codecs
//! using randomly generated inputs.

use proptest::prelude::*;
use treesnap::codec::base85;
use treesnap::container::{EntryIter, assemble};
use treesnap::{ArchivePath, Entry, PathNormalizer};

/// Windows reserved device names (case-insensitive) that cannot be used
/// as filenames. These are rejected by ArchivePath for cross-platform
/// compatibility.
const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

fn is_windows_reserved(segment: &str) -> bool {
    let base = segment.split('.').next().unwrap_or(segment);
    WINDOWS_RESERVED
        .iter()
        .any(|r| r.eq_ignore_ascii_case(base))
}

/// Strategy for path strings that `ArchivePath::new` accepts: 1-4
/// segments of plain alphanumeric names, no traversal, no reserved names.
fn valid_path_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-zA-Z0-9][a-zA-Z0-9_-]{0,9}", 1..4)
        .prop_map(|parts| parts.join("/"))
        .prop_filter("must not contain invalid segments", |s| {
            !s.split('/')
                .any(|seg| seg == "." || seg == ".." || is_windows_reserved(seg))
        })
}

proptest! {
    #[test]
    fn valid_paths_parse_successfully(path in valid_path_strategy()) {
        let result = ArchivePath::new(&path);
        prop_assert!(result.is_ok(), "path '{}' failed: {:?}", path, result);
    }

    #[test]
    fn base85_round_trips_any_bytes(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let decoded = base85::decode(&base85::encode(&data)).unwrap();
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn entry_record_round_trips_any_payload(
        path in valid_path_strategy(),
        payload in proptest::collection::vec(any::<u8>(), 0..1024),
    ) {
        let entry = Entry::file(ArchivePath::new(&path).unwrap(), payload);
        let record = entry.encode_record().unwrap();
        let decoded = Entry::decode_record(&record).unwrap();
        prop_assert_eq!(decoded, entry);
    }

    #[test]
    fn body_round_trips_any_entry_sequence(
        payloads in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..256),
            0..8,
        ),
    ) {
        let entries: Vec<Entry> = payloads
            .into_iter()
            .enumerate()
            .map(|(i, payload)| {
                Entry::file(ArchivePath::new(&format!("file_{}", i)).unwrap(), payload)
            })
            .collect();
        let body = assemble(&entries).unwrap();
        let parsed: Vec<Entry> = EntryIter::new(&body)
            .collect::<treesnap::Result<_>>()
            .unwrap();
        prop_assert_eq!(parsed, entries);
    }

    #[test]
    fn normalizer_is_deterministic(raw in "[a-zA-Z0-9 ._-]{1,20}") {
        let mut a = PathNormalizer::new();
        let mut b = PathNormalizer::new();
        let first = a.normalize(&raw);
        let second = b.normalize(&raw);
        match (first, second) {
            (Ok(x), Ok(y)) => prop_assert_eq!(x, y),
            (Err(_), Err(_)) => {}
            (x, y) => prop_assert!(false, "diverged: {:?} vs {:?}", x, y),
        }
    }

    #[test]
    fn normalizer_repeated_input_memoized(raw in "[a-zA-Z0-9 ._-]{1,20}") {
        let mut normalizer = PathNormalizer::new();
        if let Ok(first) = normalizer.normalize(&raw) {
            let again = normalizer.normalize(&raw).unwrap();
            prop_assert_eq!(first, again);
        }
    }
}
