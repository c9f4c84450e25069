//! Integration tests for the compression engine's selection policy.

mod common;

use treesnap::codec::{
    Algorithm, SMALL_BODY_THRESHOLD, compress_body, compress_with, decompress_body,
};

use common::{build_tree, snapshot};

fn text_body(len: usize) -> Vec<u8> {
    "the quick brown fox jumps over the lazy dog. "
        .bytes()
        .cycle()
        .take(len)
        .collect()
}

#[test]
fn test_trial_output_never_larger_than_any_single_algorithm() {
    for len in [SMALL_BODY_THRESHOLD, 16 * 1024, 256 * 1024] {
        let body = text_body(len);
        let (_, tagged) = compress_body(&body).unwrap();
        for &algorithm in Algorithm::ALL {
            if !algorithm.is_available() {
                continue;
            }
            let single = compress_with(algorithm, &body).unwrap();
            assert!(
                tagged.len() <= single.len() + 1,
                "len {}: trial {} > forced {} {}",
                len,
                tagged.len(),
                single.len() + 1,
                algorithm
            );
        }
    }
}

#[test]
fn test_small_bodies_always_use_zlib() {
    for len in [0, 1, 100, SMALL_BODY_THRESHOLD - 1] {
        let body = text_body(len);
        let (algorithm, tagged) = compress_body(&body).unwrap();
        assert_eq!(algorithm, Algorithm::Zlib, "len {}", len);
        assert_eq!(tagged[0], b'Z');
    }
}

#[test]
fn test_tag_matches_reported_algorithm() {
    let body = text_body(64 * 1024);
    let (algorithm, tagged) = compress_body(&body).unwrap();
    assert_eq!(tagged[0], algorithm.tag());

    let (detected, restored) = decompress_body(&tagged).unwrap();
    assert_eq!(detected, algorithm);
    assert_eq!(restored, body);
}

#[test]
fn test_every_algorithm_round_trips_large_bodies() {
    let body = text_body(100 * 1024);
    for &algorithm in Algorithm::ALL {
        if !algorithm.is_available() {
            continue;
        }
        let stream = compress_with(algorithm, &body).unwrap();
        let mut tagged = vec![algorithm.tag()];
        tagged.extend_from_slice(&stream);
        let (detected, restored) = decompress_body(&tagged).unwrap();
        assert_eq!(detected, algorithm);
        assert_eq!(restored, body);
    }
}

#[test]
fn test_incompressible_data_still_round_trips() {
    // Pseudo-random bytes compress badly; the container must still work.
    let mut state = 0x2545F4914F6CDD1Du64;
    let body: Vec<u8> = (0..32 * 1024)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 56) as u8
        })
        .collect();
    let (_, tagged) = compress_body(&body).unwrap();
    let (_, restored) = decompress_body(&tagged).unwrap();
    assert_eq!(restored, body);
}

#[test]
fn test_compressed_snapshot_smaller_than_uncompressed_for_text() {
    let payload = "a paragraph of ordinary prose, repeated enough to matter. ".repeat(200);
    let source = build_tree(&[("prose.txt", Some(payload.as_bytes()))]);

    let (_h1, _c1, compressed) = snapshot(source.path(), true);
    let (_h2, _c2, uncompressed) = snapshot(source.path(), false);
    assert!(compressed.container_size < uncompressed.container_size);
    assert!(compressed.space_savings() > 0.5);
}

#[test]
fn test_write_result_records_algorithm_only_when_compressed() {
    let source = build_tree(&[("a.txt", Some(b"abc"))]);
    let (_h1, _c1, compressed) = snapshot(source.path(), true);
    let (_h2, _c2, uncompressed) = snapshot(source.path(), false);
    assert!(compressed.algorithm.is_some());
    assert!(uncompressed.algorithm.is_none());
}
