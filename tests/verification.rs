//! Integration tests for container verification.

mod common;

use std::fs;

use treesnap::{VerifyMode, verify_bytes, verify_snapshot};

use common::{build_tree, snapshot};

const SAMPLE: common::TreeSpec<'static> = &[
    ("a.txt", Some(b"alpha\n")),
    ("b.bin", Some(&[0u8, 1, 2, 250, 251, 252])),
    ("nested/c.txt", Some(b"gamma")),
    ("hollow", None),
];

#[test]
fn test_created_containers_verify_clean() {
    let source = build_tree(SAMPLE);
    for compressed in [true, false] {
        let (_holder, container, _) = snapshot(source.path(), compressed);
        for mode in [VerifyMode::Quick, VerifyMode::Full] {
            let report = verify_snapshot(&container, mode).unwrap();
            assert!(report.ok, "mode {:?}: {:?}", mode, report.problems);
        }
    }
}

#[test]
fn test_full_verification_counts_every_entry() {
    let source = build_tree(SAMPLE);
    let (_holder, container, result) = snapshot(source.path(), true);
    let report = verify_snapshot(&container, VerifyMode::Full).unwrap();
    assert_eq!(
        report.entries_checked,
        result.entries_written + result.directories_written
    );
}

#[test]
fn test_full_verification_is_idempotent() {
    let source = build_tree(SAMPLE);
    let (_holder, container, _) = snapshot(source.path(), true);
    let first = verify_snapshot(&container, VerifyMode::Full).unwrap();
    let second = verify_snapshot(&container, VerifyMode::Full).unwrap();
    assert_eq!(first.ok, second.ok);
    assert_eq!(first.entries_checked, second.entries_checked);
}

#[test]
fn test_quick_pass_does_not_imply_full_pass() {
    let data = b"UNCOMPRESSED\n@fine.txt\ngood\n\n@bad.bin\nB\n%%%";
    assert!(verify_bytes(data, VerifyMode::Quick).ok);
    assert!(!verify_bytes(data, VerifyMode::Full).ok);
}

#[test]
fn test_full_fail_implies_problem_list() {
    let data = b"UNCOMPRESSED\n@bad.bin\nB\n%%%";
    let report = verify_bytes(data, VerifyMode::Full);
    assert!(!report.ok);
    assert!(!report.problems.is_empty());
}

#[test]
fn test_corrupted_container_fails_quick() {
    let source = build_tree(SAMPLE);
    let (_holder, container, _) = snapshot(source.path(), true);

    let mut data = fs::read(&container).unwrap();
    let mid = data.len() / 2;
    // Swap a base85 character for one outside the alphabet.
    data[mid] = b'\'';
    let report = verify_bytes(&data, VerifyMode::Quick);
    assert!(!report.ok);
}

#[test]
fn test_verification_does_not_write_anything() {
    let source = build_tree(SAMPLE);
    let (holder, container, _) = snapshot(source.path(), true);
    let before: Vec<_> = fs::read_dir(holder.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    let _ = verify_snapshot(&container, VerifyMode::Full).unwrap();
    let after: Vec<_> = fs::read_dir(holder.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_missing_file_is_an_error_not_a_problem() {
    let dir = tempfile::tempdir().unwrap();
    assert!(verify_snapshot(&dir.path().join("absent.txt"), VerifyMode::Quick).is_err());
}
