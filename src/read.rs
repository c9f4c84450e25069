//! Snapshot restore: rebuild a directory tree from a container.

use std::fs;
use std::path::Path;

use crate::codec;
use crate::container::{ContainerHeader, EntryIter, split_header};
use crate::entry::EntryKind;
use crate::progress::ProgressReporter;
use crate::{Entry, Error, Result};

/// Result of restoring a snapshot.
///
/// Restore is tolerant: one corrupt entry costs that entry, not the
/// tree. Callers decide what a partial restore means for them via
/// [`RestoreReport::is_ok`] and the failure list.
#[must_use = "restore reports carry per-entry failures"]
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    /// Number of files written.
    pub files_written: usize,
    /// Number of directories created (empty-directory entries only).
    pub directories_created: usize,
    /// Number of entries that could not be restored.
    pub entries_failed: usize,
    /// Total payload bytes written.
    pub bytes_written: u64,
    /// Failed entries: (path or position, reason).
    pub failures: Vec<(String, String)>,
}

impl RestoreReport {
    /// Returns true if every entry was restored.
    pub fn is_ok(&self) -> bool {
        self.entries_failed == 0
    }

    /// Total entries restored successfully.
    pub fn entries_restored(&self) -> usize {
        self.files_written + self.directories_created
    }
}

/// Restores the snapshot at `container_path` into `dest`.
///
/// `dest` is created if it does not exist. Existing files are
/// overwritten.
///
/// # Errors
///
/// Returns an error only for container-level problems (unreadable file,
/// unrecognized header, undecodable compressed stream). Per-entry
/// problems are reported in the [`RestoreReport`] instead.
pub fn restore_snapshot(
    container_path: &Path,
    dest: &Path,
    progress: &mut dyn ProgressReporter,
) -> Result<RestoreReport> {
    log::info!(
        "restoring {} into {}",
        container_path.display(),
        dest.display()
    );
    let data = fs::read(container_path)?;
    restore_from_bytes(&data, dest, progress)
}

/// Restores a snapshot already held in memory.
///
/// This is the editor-paste path: the bytes may be a full container or a
/// bare uncompressed body with the header line lost.
pub fn restore_from_bytes(
    data: &[u8],
    dest: &Path,
    progress: &mut dyn ProgressReporter,
) -> Result<RestoreReport> {
    let (header, payload) = split_header(data)?;
    let body = match header {
        ContainerHeader::Uncompressed => payload.to_vec(),
        ContainerHeader::Compressed => {
            let text = std::str::from_utf8(payload)
                .map_err(|e| Error::InvalidFormat(format!("container is not UTF-8: {}", e)))?;
            let stream = codec::base85::decode(text)?;
            let (algorithm, body) = codec::decompress_body(&stream)?;
            log::debug!("container body decompressed with {}", algorithm);
            body
        }
    };

    fs::create_dir_all(dest)?;
    progress.on_total(body.len() as u64);

    let mut report = RestoreReport::default();
    let mut entries = EntryIter::new(&body);
    let mut index = 0usize;
    while let Some(parsed) = entries.next() {
        index += 1;
        // Progress is measured in consumed body bytes, the same unit as
        // the total announced above.
        let consumed = entries.offset() as u64;
        let entry = match parsed {
            Ok(entry) => entry,
            Err(e) => {
                fail(&mut report, progress, format!("entry #{}", index), e.to_string());
                progress.on_progress(consumed, body.len() as u64);
                continue;
            }
        };
        let name = entry.path.as_str().to_string();
        progress.on_entry_start(&name, entry.payload_len() as u64);
        match restore_entry(&entry, dest) {
            Ok(()) => {
                match entry.kind {
                    EntryKind::File { ref payload, .. } => {
                        report.files_written += 1;
                        report.bytes_written += payload.len() as u64;
                    }
                    EntryKind::EmptyDirectory => report.directories_created += 1,
                }
                progress.on_entry_complete(&name, true);
            }
            Err(e) => {
                progress.on_entry_complete(&name, false);
                fail(&mut report, progress, name, e.to_string());
            }
        }
        progress.on_progress(consumed, body.len() as u64);
    }

    log::info!(
        "restore complete: {} files, {} directories, {} failed",
        report.files_written,
        report.directories_created,
        report.entries_failed
    );
    Ok(report)
}

fn fail(
    report: &mut RestoreReport,
    progress: &mut dyn ProgressReporter,
    what: String,
    reason: String,
) {
    log::warn!("failed to restore {}: {}", what, reason);
    progress.on_warning(&format!("{}: {}", what, reason));
    report.entries_failed += 1;
    report.failures.push((what, reason));
}

/// Writes one entry under `dest`.
///
/// `ArchivePath` guarantees the path is relative with no `..` segments,
/// so the join cannot escape `dest`.
fn restore_entry(entry: &Entry, dest: &Path) -> Result<()> {
    let target = dest.join(entry.path.as_str());
    match &entry.kind {
        EntryKind::EmptyDirectory => {
            fs::create_dir_all(&target)?;
        }
        EntryKind::File { payload, .. } => {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, payload)?;
        }
    }
    Ok(())
}
