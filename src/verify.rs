//! Container verification without touching the filesystem tree.

use std::fs;
use std::path::Path;

use crate::codec;
use crate::container::{ContainerHeader, EntryIter, split_header};
use crate::Result;

/// How deep verification goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    /// Header and compression layer only.
    Quick,
    /// Everything Quick checks, plus every entry record is decoded.
    Full,
}

/// Result of verifying a container.
#[must_use = "verify reports carry the problem list"]
#[derive(Debug, Clone)]
pub struct VerifyReport {
    /// True if no problems were found.
    pub ok: bool,
    /// The mode that was run.
    pub mode: VerifyMode,
    /// Number of entry records decoded (always 0 in Quick mode).
    pub entries_checked: usize,
    /// Human-readable descriptions of everything found wrong.
    pub problems: Vec<String>,
}

impl VerifyReport {
    fn clean(mode: VerifyMode) -> Self {
        Self {
            ok: true,
            mode,
            entries_checked: 0,
            problems: Vec::new(),
        }
    }

    fn problem(&mut self, message: String) {
        log::warn!("verification problem: {}", message);
        self.ok = false;
        self.problems.push(message);
    }
}

/// Verifies the container file at `path`.
///
/// A failed check is a problem in the report, not an error; only an
/// unreadable container file returns `Err`.
pub fn verify_snapshot(path: &Path, mode: VerifyMode) -> Result<VerifyReport> {
    log::info!("verifying {} ({:?})", path.display(), mode);
    let data = fs::read(path)?;
    Ok(verify_bytes(&data, mode))
}

/// Verifies container bytes already held in memory.
pub fn verify_bytes(data: &[u8], mode: VerifyMode) -> VerifyReport {
    let mut report = VerifyReport::clean(mode);

    let (header, payload) = match split_header(data) {
        Ok(split) => split,
        Err(e) => {
            report.problem(e.to_string());
            return report;
        }
    };

    let body = match header {
        ContainerHeader::Uncompressed => payload.to_vec(),
        ContainerHeader::Compressed => {
            let text = match std::str::from_utf8(payload) {
                Ok(text) => text,
                Err(e) => {
                    report.problem(format!("compressed body is not UTF-8: {}", e));
                    return report;
                }
            };
            let stream = match codec::base85::decode(text) {
                Ok(stream) => stream,
                Err(e) => {
                    report.problem(e.to_string());
                    return report;
                }
            };
            match codec::decompress_body(&stream) {
                Ok((_, body)) => body,
                Err(e) => {
                    report.problem(e.to_string());
                    return report;
                }
            }
        }
    };

    if !body.is_empty() && !body.starts_with(b"@") {
        report.problem("container body does not start with an entry header".into());
    }

    if report.mode == VerifyMode::Full {
        for (index, parsed) in EntryIter::new(&body).enumerate() {
            match parsed {
                Ok(_) => report.entries_checked += 1,
                Err(e) => report.problem(format!("entry #{}: {}", index + 1, e)),
            }
        }
    }
    report
}
