//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test
//! file compiles as a separate crate and may only use a subset of these
//! helpers.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use treesnap::progress::NoProgress;
use treesnap::{WriteOptions, WriteResult, create_snapshot};

/// One node of a fixture tree: file bytes, or `None` for an empty
/// directory.
pub type TreeSpec<'a> = &'a [(&'a str, Option<&'a [u8]>)];

/// Builds a tree on disk from a spec of slash-separated paths.
pub fn build_tree(entries: TreeSpec<'_>) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("create fixture dir");
    for (path, content) in entries {
        let target = dir.path().join(path);
        match content {
            Some(bytes) => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).expect("create parent");
                }
                fs::write(&target, bytes).expect("write fixture file");
            }
            None => fs::create_dir_all(&target).expect("create fixture dir"),
        }
    }
    dir
}

/// Creates a snapshot of `source` in a fresh temporary directory.
///
/// Returns the holder of the container file alongside its path and the
/// write result.
pub fn snapshot(source: &Path, compressed: bool) -> (tempfile::TempDir, PathBuf, WriteResult) {
    let holder = tempfile::tempdir().expect("create output dir");
    let container = holder.path().join("snapshot.txt");
    let result = create_snapshot(
        source,
        &container,
        &WriteOptions::new().compressed(compressed),
        &mut NoProgress,
    )
    .expect("create snapshot");
    (holder, container, result)
}

/// Reads a tree back into a map of slash-separated paths.
///
/// Files map to `Some(bytes)`; empty directories map to `None`.
/// Non-empty directories are implied by their children and not listed.
pub fn read_tree(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    let mut map = BTreeMap::new();
    collect(root, root, &mut map);
    map
}

fn collect(root: &Path, dir: &Path, map: &mut BTreeMap<String, Option<Vec<u8>>>) {
    let mut children = 0;
    for entry in fs::read_dir(dir).expect("read dir") {
        children += 1;
        let entry = entry.expect("dir entry");
        let path = entry.path();
        let rel = path
            .strip_prefix(root)
            .expect("under root")
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if path.is_dir() {
            collect(root, &path, map);
        } else {
            map.insert(rel, Some(fs::read(&path).expect("read file")));
        }
    }
    if children == 0 && dir != root {
        let rel = dir
            .strip_prefix(root)
            .expect("under root")
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        map.insert(rel, None);
    }
}
