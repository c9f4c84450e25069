//! Error types for snapshot operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when creating, restoring, or verifying snapshot
//! containers, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. You can
//! handle errors using pattern matching or the `?` operator:
//!
//! ```rust,no_run
//! use treesnap::{NoProgress, Result, WriteOptions};
//! use std::path::Path;
//!
//! fn snapshot(source: &Path, output: &Path) -> Result<()> {
//!     let options = WriteOptions::new().compressed(true);
//!     treesnap::create_snapshot(source, output, &options, &mut NoProgress)?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variant | Typical cause |
//! |----------|---------|---------------|
//! | I/O | [`Io`][Error::Io] | Missing file, permission, disk space |
//! | Path | [`InvalidPath`][Error::InvalidPath] | Illegal or unresolvable path |
//! | Format | [`InvalidFormat`][Error::InvalidFormat] | Malformed header, unknown marker, bad base64/base85 |
//! | Integrity | [`Integrity`][Error::Integrity] | Payload inconsistent with its declared marker |

use std::io;

/// The main error type for snapshot operations.
///
/// Each variant carries enough context to diagnose the failure. Per-entry
/// failures during restore are *not* surfaced through this type; they are
/// collected in [`RestoreReport`](crate::RestoreReport) so that one corrupt
/// entry does not abort the whole operation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    ///
    /// This wraps [`std::io::Error`] and is returned when filesystem
    /// operations fail: file not found, permission denied, disk full.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A path is illegal or could not be made filesystem-safe.
    ///
    /// Returned when an archive path fails validation (absolute path,
    /// `..` traversal, NUL byte, empty segment) or when the normalizer
    /// cannot produce a unique sanitized name within the bounded number
    /// of disambiguation attempts.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The container or an entry record is malformed.
    ///
    /// This covers an unrecognized container header, a malformed entry
    /// header line, an unknown marker, undecodable base64/base85 text,
    /// and a compressed stream that no supported algorithm can decode.
    #[error("Invalid snapshot format: {0}")]
    InvalidFormat(String),

    /// Full verification found a payload inconsistent with its marker.
    ///
    /// For example, an entry declared as `latin-1` text whose stored
    /// content contains characters outside the Latin-1 range.
    #[error("Integrity check failed: {0}")]
    Integrity(String),
}

/// A specialized `Result` type for snapshot operations.
pub type Result<T> = std::result::Result<T, Error>;
