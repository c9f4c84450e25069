//! Filesystem plumbing: tree walking and atomic output files.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use walkdir::WalkDir;

use crate::{Error, Result};

/// What a walked source entry is on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A regular file with its size in bytes.
    File(u64),
    /// A directory with no children.
    EmptyDirectory,
}

/// One filesystem object selected for the snapshot.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// Absolute (or walk-root-relative) location on disk.
    pub disk_path: PathBuf,
    /// Path relative to the walk root, as the OS reported it.
    pub raw_path: String,
    /// File or empty directory.
    pub kind: SourceKind,
}

/// The result of walking a source tree.
#[derive(Debug, Default)]
pub struct TreeWalk {
    /// Entries in deterministic (name-sorted, parents-first) order.
    pub entries: Vec<SourceEntry>,
    /// Messages for objects that were skipped.
    pub warnings: Vec<String>,
}

impl TreeWalk {
    /// Total size in bytes of all file entries.
    pub fn total_file_bytes(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| match e.kind {
                SourceKind::File(size) => size,
                SourceKind::EmptyDirectory => 0,
            })
            .sum()
    }
}

/// Walks `root` and selects regular files and empty directories.
///
/// A regular-file root is accepted as a one-entry walk named after the
/// file, so a lone file can be captured without wrapping it in a
/// directory. Directory traversal is depth-first with siblings sorted by
/// file name, so parents always precede their children and the output is
/// deterministic across runs. Symlinks are not followed and are skipped
/// with a warning, as are objects the walker cannot read.
///
/// # Errors
///
/// Returns [`Error::Io`] if `root` does not exist or is neither a
/// regular file nor a directory.
pub fn walk_tree(root: &Path) -> Result<TreeWalk> {
    let metadata = fs::metadata(root)?;
    if metadata.is_file() {
        let raw_path = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());
        return Ok(TreeWalk {
            entries: vec![SourceEntry {
                disk_path: root.to_path_buf(),
                raw_path,
                kind: SourceKind::File(metadata.len()),
            }],
            warnings: Vec::new(),
        });
    }
    if !metadata.is_dir() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is neither a file nor a directory", root.display()),
        )));
    }

    let mut walk = TreeWalk::default();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let message = format!("skipping unreadable object: {}", e);
                log::warn!("{}", message);
                walk.warnings.push(message);
                continue;
            }
        };
        if entry.path() == root {
            continue;
        }
        let raw_path = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .to_string();

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            let message = format!("skipping symlink: {}", raw_path);
            log::warn!("{}", message);
            walk.warnings.push(message);
            continue;
        }
        if file_type.is_dir() {
            let is_empty = match fs::read_dir(entry.path()) {
                Ok(mut children) => children.next().is_none(),
                Err(e) => {
                    let message = format!("skipping unreadable directory {}: {}", raw_path, e);
                    log::warn!("{}", message);
                    walk.warnings.push(message);
                    continue;
                }
            };
            if is_empty {
                walk.entries.push(SourceEntry {
                    disk_path: entry.path().to_path_buf(),
                    raw_path,
                    kind: SourceKind::EmptyDirectory,
                });
            }
        } else if file_type.is_file() {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            walk.entries.push(SourceEntry {
                disk_path: entry.path().to_path_buf(),
                raw_path,
                kind: SourceKind::File(size),
            });
        } else {
            let message = format!("skipping special file: {}", raw_path);
            log::warn!("{}", message);
            walk.warnings.push(message);
        }
    }
    Ok(walk)
}

/// A file written to a temporary sibling path and renamed into place.
///
/// Readers of the final path never observe a half-written container: the
/// temporary lives in the same directory (same filesystem, so the rename
/// is atomic) and is removed on drop if [`AtomicFile::commit`] was never
/// called.
#[derive(Debug)]
pub struct AtomicFile {
    file: Option<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl AtomicFile {
    /// Creates the temporary file next to `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        let temp_name = format!(".{}.{}.tmp", file_name, process::id());
        let temp_path = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(temp_name),
            _ => PathBuf::from(temp_name),
        };
        let file = File::create(&temp_path)?;
        Ok(Self {
            file: Some(file),
            temp_path,
            final_path: path.to_path_buf(),
        })
    }

    /// Flushes, syncs and renames the temporary onto the final path.
    pub fn commit(mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&self.temp_path, &self.final_path)
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.write(buf),
            None => Err(io::Error::new(io::ErrorKind::Other, "file already committed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

/// Derives the default container path for a source directory.
///
/// The container lands next to the source, named after it:
/// `snapshot_<name>.txt`, or `compressed_snapshot_<name>.txt` when
/// compression is on.
pub fn default_container_name(source: &Path, compressed: bool) -> PathBuf {
    let stem = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "tree".to_string());
    let name = if compressed {
        format!("compressed_snapshot_{}.txt", stem)
    } else {
        format!("snapshot_{}.txt", stem)
    };
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => PathBuf::from(name),
    }
}

/// Returns `path` if it is free, otherwise the first `stem_N.ext` variant
/// that does not exist yet.
pub fn unique_output_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().to_string());
    for n in 1u32.. {
        let name = match &extension {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        };
        let candidate = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
            _ => PathBuf::from(name),
        };
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!("ran out of candidate names")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_tree_sorted_and_complete() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), b"bee").unwrap();
        fs::write(dir.path().join("a.txt"), b"ay").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/c.txt"), b"sea").unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        let walk = walk_tree(dir.path()).unwrap();
        let paths: Vec<_> = walk.entries.iter().map(|e| e.raw_path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["a.txt", "b.txt", "empty", format!("sub{}c.txt", std::path::MAIN_SEPARATOR).as_str()]
        );
        assert_eq!(walk.entries[2].kind, SourceKind::EmptyDirectory);
        assert_eq!(walk.total_file_bytes(), 3 + 2 + 3);
        assert!(walk.warnings.is_empty());
    }

    #[test]
    fn test_walk_tree_nonempty_dirs_not_listed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/file"), b"x").unwrap();

        let walk = walk_tree(dir.path()).unwrap();
        assert_eq!(walk.entries.len(), 1);
        assert!(matches!(walk.entries[0].kind, SourceKind::File(1)));
    }

    #[test]
    fn test_walk_single_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("solo.txt");
        fs::write(&file, b"just me").unwrap();

        let walk = walk_tree(&file).unwrap();
        assert_eq!(walk.entries.len(), 1);
        assert_eq!(walk.entries[0].raw_path, "solo.txt");
        assert_eq!(walk.entries[0].kind, SourceKind::File(7));
        assert_eq!(walk.entries[0].disk_path, file);
        assert!(walk.warnings.is_empty());
    }

    #[test]
    fn test_walk_tree_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(walk_tree(&missing).is_err());
    }

    #[test]
    fn test_atomic_file_commit() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        let mut file = AtomicFile::create(&target).unwrap();
        file.write_all(b"content").unwrap();
        assert!(!target.exists());
        file.commit().unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"content");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_atomic_file_abandoned_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        {
            let mut file = AtomicFile::create(&target).unwrap();
            file.write_all(b"partial").unwrap();
        }
        assert!(!target.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_default_container_name() {
        let path = default_container_name(Path::new("/data/my_project"), false);
        assert_eq!(path, Path::new("/data/snapshot_my_project.txt"));
        let path = default_container_name(Path::new("/data/my_project"), true);
        assert_eq!(path, Path::new("/data/compressed_snapshot_my_project.txt"));
    }

    #[test]
    fn test_unique_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("snap.txt");
        assert_eq!(unique_output_path(&target), target);

        fs::write(&target, b"").unwrap();
        assert_eq!(unique_output_path(&target), dir.path().join("snap_1.txt"));

        fs::write(dir.path().join("snap_1.txt"), b"").unwrap();
        assert_eq!(unique_output_path(&target), dir.path().join("snap_2.txt"));
    }
}
