//! # treesnap
//!
//! Capture a directory tree into a single self-describing plain-text
//! container, and restore it later — including from text pasted through
//! an editor or chat window.
//!
//! A container is a line-oriented artifact: a header declaring whether
//! the body is compressed, then one record per file or empty directory.
//! Text files are stored readable as-is; binary files travel as base64;
//! the compressed body is a base85-wrapped stream tagged with the
//! algorithm that produced it (the best of LZMA, bzip2 and zlib for the
//! given tree).
//!
//! ## Quick Start
//!
//! ### Creating a snapshot
//!
//! ```rust,no_run
//! use treesnap::{NoProgress, Result, WriteOptions, create_snapshot};
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let result = create_snapshot(
//!         Path::new("./my_project"),
//!         Path::new("./compressed_snapshot_my_project.txt"),
//!         &WriteOptions::new(),
//!         &mut NoProgress,
//!     )?;
//!     println!(
//!         "{} entries, {:.1}% space saved",
//!         result.entries_written,
//!         result.space_savings() * 100.0
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ### Restoring
//!
//! ```rust,no_run
//! use treesnap::{NoProgress, Result, restore_snapshot};
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let report = restore_snapshot(
//!         Path::new("./compressed_snapshot_my_project.txt"),
//!         Path::new("./restored"),
//!         &mut NoProgress,
//!     )?;
//!     for (entry, reason) in &report.failures {
//!         eprintln!("could not restore {}: {}", entry, reason);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! A corrupt entry costs only that entry: the rest of the tree is still
//! restored, and the failures are listed in the report.
//!
//! ### Verifying
//!
//! ```rust,no_run
//! use treesnap::{Result, VerifyMode, verify_snapshot};
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let report = verify_snapshot(
//!         Path::new("./compressed_snapshot_my_project.txt"),
//!         VerifyMode::Full,
//!     )?;
//!     assert!(report.ok, "{:?}", report.problems);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `lzma` (default): LZMA trial compression via `lzma-rust2`.
//! - `bzip2` (default): bzip2 trial compression.
//! - `cli`: the `treesnap` command-line binary.
//!
//! zlib is always available; with both compression features disabled the
//! library still reads and writes every container, it just never picks
//! LZMA or bzip2 for new ones.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod archive_path;
pub mod classify;
pub mod codec;
pub mod container;
pub mod entry;
pub mod error;
pub mod fs;
pub mod progress;
pub mod read;
pub mod verify;
pub mod write;

pub use archive_path::{ArchivePath, PathNormalizer};
pub use classify::{Charset, Encoding, classify};
pub use codec::Algorithm;
pub use container::{BodyAssembler, ContainerHeader, EntryIter, assemble, split_header};
pub use entry::{Entry, EntryKind};
pub use error::{Error, Result};
pub use progress::{NoProgress, ProgressReporter, StatisticsProgress, progress_fn};
pub use read::{RestoreReport, restore_from_bytes, restore_snapshot};
pub use verify::{VerifyMode, VerifyReport, verify_bytes, verify_snapshot};
pub use write::{WriteOptions, WriteResult, create_snapshot};
