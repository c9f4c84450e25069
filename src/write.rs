//! Snapshot creation: walk a source tree and write its container.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::codec::{self, Algorithm};
use crate::container::{BodyAssembler, COMPRESSED_HEADER, UNCOMPRESSED_HEADER};
use crate::fs::{AtomicFile, SourceKind, walk_tree};
use crate::progress::ProgressReporter;
use crate::{Entry, Error, PathNormalizer, Result};

/// Column width for wrapping the base85 body of compressed containers.
const BASE85_LINE_WIDTH: usize = 80;

/// Options controlling snapshot creation.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to compress the container body.
    pub compressed: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { compressed: true }
    }
}

impl WriteOptions {
    /// Creates options with compression enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the container body is compressed.
    pub fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }
}

/// Result of writing a snapshot container.
#[must_use = "write results carry the skip count and warnings"]
#[derive(Debug, Clone, Default)]
pub struct WriteResult {
    /// Number of file entries written.
    pub entries_written: usize,
    /// Number of empty-directory entries written.
    pub directories_written: usize,
    /// Number of source objects skipped (unreadable, unrepresentable).
    pub entries_skipped: usize,
    /// Total uncompressed payload bytes.
    pub total_size: u64,
    /// Size of the finished container file in bytes.
    pub container_size: u64,
    /// Compression algorithm chosen, `None` for uncompressed containers.
    pub algorithm: Option<Algorithm>,
    /// Messages for everything that was skipped.
    pub warnings: Vec<String>,
}

impl WriteResult {
    /// Returns the compression ratio (container / payload).
    pub fn compression_ratio(&self) -> f64 {
        if self.total_size == 0 {
            1.0
        } else {
            self.container_size as f64 / self.total_size as f64
        }
    }

    /// Returns the space savings percentage.
    pub fn space_savings(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            1.0 - self.compression_ratio()
        }
    }
}

/// Where encoded entries go. Compressed containers buffer the body so it
/// can be trial-compressed whole; uncompressed containers stream each
/// record to the output file and release its payload immediately, so at
/// most one file's bytes are held at a time.
enum BodySink {
    Buffer(Vec<Entry>),
    Stream(BodyAssembler<AtomicFile>),
}

impl BodySink {
    fn push(&mut self, entry: Entry) -> Result<()> {
        match self {
            BodySink::Buffer(entries) => entries.push(entry),
            BodySink::Stream(assembler) => assembler.push(&entry)?,
        }
        Ok(())
    }
}

/// Creates a snapshot container of `source` at `output`.
///
/// `source` may be a directory or a single regular file. Unreadable
/// files and paths that cannot be represented are skipped with a
/// warning; the rest of the tree is still captured. The container is
/// written to a temporary sibling of `output` and renamed into place, so
/// a crash mid-write never leaves a truncated container behind.
///
/// # Errors
///
/// Returns [`Error::Io`] if `source` cannot be read at all, if the
/// output cannot be written, or if the progress reporter requested
/// cancellation.
pub fn create_snapshot(
    source: &Path,
    output: &Path,
    options: &WriteOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<WriteResult> {
    log::info!(
        "creating {} snapshot of {}",
        if options.compressed { "compressed" } else { "uncompressed" },
        source.display()
    );

    let walk = walk_tree(source)?;
    let mut result = WriteResult::default();
    for warning in &walk.warnings {
        progress.on_warning(warning);
        result.warnings.push(warning.clone());
        result.entries_skipped += 1;
    }

    let total_bytes = walk.total_file_bytes();
    progress.on_total(total_bytes);

    let mut normalizer = PathNormalizer::new();
    let mut sink = if options.compressed {
        BodySink::Buffer(Vec::with_capacity(walk.entries.len()))
    } else {
        let mut file = AtomicFile::create(output)?;
        file.write_all(UNCOMPRESSED_HEADER.as_bytes())?;
        file.write_all(b"\n")?;
        BodySink::Stream(BodyAssembler::new(file))
    };
    let mut processed: u64 = 0;

    for source_entry in &walk.entries {
        let path = match normalizer.normalize(&source_entry.raw_path) {
            Ok(path) => path,
            Err(e) => {
                skip(&mut result, progress, format!("{}: {}", source_entry.raw_path, e));
                continue;
            }
        };
        match source_entry.kind {
            SourceKind::EmptyDirectory => {
                progress.on_entry_start(path.as_str(), 0);
                sink.push(Entry::empty_dir(path.clone()))?;
                result.directories_written += 1;
                progress.on_entry_complete(path.as_str(), true);
            }
            SourceKind::File(size) => {
                progress.on_entry_start(path.as_str(), size);
                let payload = match fs::read(&source_entry.disk_path) {
                    Ok(payload) => payload,
                    Err(e) => {
                        progress.on_entry_complete(path.as_str(), false);
                        skip(
                            &mut result,
                            progress,
                            format!("cannot read {}: {}", source_entry.raw_path, e),
                        );
                        continue;
                    }
                };
                processed += payload.len() as u64;
                result.total_size += payload.len() as u64;
                sink.push(Entry::file(path.clone(), payload))?;
                result.entries_written += 1;
                progress.on_entry_complete(path.as_str(), true);
            }
        }
        if !progress.on_progress(processed, total_bytes) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::Interrupted,
                "snapshot cancelled",
            )));
        }
    }

    match sink {
        BodySink::Buffer(entries) => write_compressed(output, &entries, &mut result)?,
        BodySink::Stream(assembler) => assembler.finish()?.commit()?,
    }
    result.container_size = fs::metadata(output)?.len();

    log::info!(
        "snapshot complete: {} files, {} empty directories, {} skipped, {}",
        result.entries_written,
        result.directories_written,
        result.entries_skipped,
        output.display()
    );
    Ok(result)
}

fn skip(result: &mut WriteResult, progress: &mut dyn ProgressReporter, message: String) {
    log::warn!("{}", message);
    progress.on_warning(&message);
    result.warnings.push(message);
    result.entries_skipped += 1;
}

/// Assembles the body, compresses it and writes the base85 container.
fn write_compressed(output: &Path, entries: &[Entry], result: &mut WriteResult) -> Result<()> {
    let body = crate::container::assemble(entries)?;
    let (algorithm, stream) = codec::compress_body(&body)?;
    result.algorithm = Some(algorithm);
    log::debug!(
        "compressed body with {}: {} -> {} bytes",
        algorithm,
        body.len(),
        stream.len()
    );

    let text = codec::base85::encode(&stream);
    let mut file = AtomicFile::create(output)?;
    file.write_all(COMPRESSED_HEADER.as_bytes())?;
    file.write_all(b"\n")?;
    for line in wrap_lines(&text, BASE85_LINE_WIDTH) {
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
    }
    file.commit()?;
    Ok(())
}

/// Splits ASCII text into fixed-width lines.
fn wrap_lines(text: &str, width: usize) -> impl Iterator<Item = &str> {
    text.as_bytes()
        .chunks(width)
        // The base85 alphabet is pure ASCII, chunk boundaries cannot
        // split a character.
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
}
