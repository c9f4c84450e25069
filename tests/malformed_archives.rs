//! Tests for containers that are damaged, truncated or hand-mangled.

mod common;

use std::fs;

use treesnap::progress::NoProgress;
use treesnap::{Error, restore_from_bytes, restore_snapshot};

use common::{build_tree, snapshot};

#[test]
fn test_unrecognized_header_is_rejected() {
    let dest = tempfile::tempdir().unwrap();
    let err = restore_from_bytes(b"SNAPSHOT v2\n@a\nx", dest.path(), &mut NoProgress).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat(_)));
}

#[test]
fn test_corrupt_base85_body_is_rejected() {
    let dest = tempfile::tempdir().unwrap();
    let err = restore_from_bytes(
        b"COMPRESSED\n'''quotes are not base85'''",
        dest.path(),
        &mut NoProgress,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidFormat(_)));
}

#[test]
fn test_truncated_compressed_container_is_rejected() {
    let source = build_tree(&[("a.txt", Some(b"some content that compresses"))]);
    let (_holder, container, _) = snapshot(source.path(), true);

    let mut data = fs::read(&container).unwrap();
    data.truncate(data.len() * 2 / 3);

    let dest = tempfile::tempdir().unwrap();
    let result = restore_from_bytes(&data, dest.path(), &mut NoProgress);
    assert!(result.is_err());
}

#[test]
fn test_single_corrupt_entry_does_not_poison_the_rest() {
    let data = concat!(
        "UNCOMPRESSED\n",
        "@first.txt\nsurvives\n",
        "\n",
        "@broken.bin\nB\n!!!not base64 at all!!!\n",
        "\n",
        "@last.txt\nalso survives"
    );
    let dest = tempfile::tempdir().unwrap();
    let report = restore_from_bytes(data.as_bytes(), dest.path(), &mut NoProgress).unwrap();

    assert_eq!(report.files_written, 2);
    assert_eq!(report.entries_failed, 1);
    assert_eq!(fs::read(dest.path().join("first.txt")).unwrap(), b"survives");
    assert_eq!(
        fs::read(dest.path().join("last.txt")).unwrap(),
        b"also survives"
    );
    assert!(!dest.path().join("broken.bin").exists());
}

#[test]
fn test_traversal_path_is_refused_per_entry() {
    let data = "UNCOMPRESSED\n@../outside.txt\nattack\n\n@inside.txt\nfine";
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("dest");
    let report = restore_from_bytes(data.as_bytes(), &dest, &mut NoProgress).unwrap();

    assert_eq!(report.entries_failed, 1);
    assert_eq!(report.files_written, 1);
    assert!(!root.path().join("outside.txt").exists());
    assert_eq!(fs::read(dest.join("inside.txt")).unwrap(), b"fine");
}

#[test]
fn test_absolute_path_is_refused_per_entry() {
    let data = "UNCOMPRESSED\n@/etc/owned\nnope\n\n@ok.txt\nyes";
    let dest = tempfile::tempdir().unwrap();
    let report = restore_from_bytes(data.as_bytes(), dest.path(), &mut NoProgress).unwrap();
    assert_eq!(report.entries_failed, 1);
    assert_eq!(report.files_written, 1);
}

#[test]
fn test_unknown_charset_marker_fails_that_entry_only() {
    let data = "UNCOMPRESSED\n@weird.txt\nT:ebcdic\ndata\n\n@plain.txt\nok";
    let dest = tempfile::tempdir().unwrap();
    let report = restore_from_bytes(data.as_bytes(), dest.path(), &mut NoProgress).unwrap();
    assert_eq!(report.entries_failed, 1);
    assert_eq!(fs::read(dest.path().join("plain.txt")).unwrap(), b"ok");
}

#[test]
fn test_missing_container_file() {
    let dir = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    let err = restore_snapshot(&dir.path().join("nope.txt"), dest.path(), &mut NoProgress)
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_crlf_header_tolerated() {
    let data = b"UNCOMPRESSED\r\n@a.txt\nhi";
    let dest = tempfile::tempdir().unwrap();
    let report = restore_from_bytes(data, dest.path(), &mut NoProgress).unwrap();
    assert!(report.is_ok());
    assert_eq!(fs::read(dest.path().join("a.txt")).unwrap(), b"hi");
}

#[test]
fn test_bare_body_paste_restores() {
    // A container pasted without its header line.
    let data = b"@pasted.txt\nstill works";
    let dest = tempfile::tempdir().unwrap();
    let report = restore_from_bytes(data, dest.path(), &mut NoProgress).unwrap();
    assert!(report.is_ok());
    assert_eq!(
        fs::read(dest.path().join("pasted.txt")).unwrap(),
        b"still works"
    );
}
