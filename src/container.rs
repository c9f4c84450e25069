//! Container body assembly and the streaming entry parser.
//!
//! The uncompressed container body is the concatenation of entry records
//! in traversal order, separated by one blank line. A new record begins
//! at a `\n\n@` boundary, so the body must be scanned entry-by-entry
//! rather than split globally on `@` (payload lines may start with `@`).
//!
//! The container artifact itself starts with a header line, either
//! [`COMPRESSED_HEADER`] (a base85-encoded compressed stream follows) or
//! [`UNCOMPRESSED_HEADER`] (the raw body follows). A headerless input
//! that starts with `@` is accepted as a bare uncompressed body, which
//! keeps hand-pasted snapshot text restorable.

use crate::{Entry, Error, Result};

/// Header line of a compressed container.
pub const COMPRESSED_HEADER: &str = "COMPRESSED";

/// Header line of an uncompressed container.
pub const UNCOMPRESSED_HEADER: &str = "UNCOMPRESSED";

/// Record separator: one blank line between records.
pub const RECORD_SEPARATOR: &str = "\n\n";

/// Whether the container body is compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerHeader {
    /// Body is base85 text of a tagged compressed stream.
    Compressed,
    /// Body is the raw concatenated entry records.
    Uncompressed,
}

/// Splits a container into its header and the remaining payload bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the input carries no recognized
/// header and does not look like a bare uncompressed body.
pub fn split_header(data: &[u8]) -> Result<(ContainerHeader, &[u8])> {
    if let Some(rest) = strip_header_line(data, COMPRESSED_HEADER) {
        return Ok((ContainerHeader::Compressed, rest));
    }
    if let Some(rest) = strip_header_line(data, UNCOMPRESSED_HEADER) {
        return Ok((ContainerHeader::Uncompressed, rest));
    }
    // Bare body fallback: pasted content with the header line lost.
    if data.is_empty() || data.starts_with(b"@") {
        return Ok((ContainerHeader::Uncompressed, data));
    }
    Err(Error::InvalidFormat(
        "unrecognized container header (expected COMPRESSED or UNCOMPRESSED)".into(),
    ))
}

fn strip_header_line<'a>(data: &'a [u8], header: &str) -> Option<&'a [u8]> {
    let rest = data.strip_prefix(header.as_bytes())?;
    match rest {
        [] => Some(rest),
        [b'\n', tail @ ..] => Some(tail),
        [b'\r', b'\n', tail @ ..] => Some(tail),
        _ => None,
    }
}

/// Concatenates entry records into an uncompressed body.
///
/// The inverse of parsing: `parse(assemble(entries)) == entries` for any
/// entry sequence the classifier admits.
pub fn assemble(entries: &[Entry]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut assembler = BodyAssembler::new(&mut body);
    for entry in entries {
        assembler.push(entry)?;
    }
    Ok(body)
}

/// Push-style body assembler for the streaming write path.
///
/// Keeps only the "first record" flag as state; each record is handed to
/// the underlying writer as soon as it is encoded, so the original file
/// bytes can be released entry by entry.
#[derive(Debug)]
pub struct BodyAssembler<W: std::io::Write> {
    out: W,
    first: bool,
}

impl<W: std::io::Write> BodyAssembler<W> {
    /// Creates an assembler writing records to `out`.
    pub fn new(out: W) -> Self {
        Self { out, first: true }
    }

    /// Encodes one entry and writes its record.
    pub fn push(&mut self, entry: &Entry) -> Result<()> {
        let record = entry.encode_record()?;
        if !self.first {
            self.out.write_all(RECORD_SEPARATOR.as_bytes())?;
        }
        self.first = false;
        self.out.write_all(record.as_bytes())?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Lazy iterator over the entries of an uncompressed body.
///
/// Restartable and streaming-capable: entries become available as soon as
/// their record boundary is found, without materializing the rest of the
/// body. A malformed record yields `Err` for that record only; iteration
/// resumes at the next boundary, which is what lets restore skip a single
/// corrupt entry and keep going.
#[derive(Debug, Clone)]
pub struct EntryIter<'a> {
    body: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> EntryIter<'a> {
    /// Creates an iterator over `body`.
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            body,
            pos: 0,
            done: body.is_empty(),
        }
    }

    /// Byte offset of the first unconsumed record.
    ///
    /// Advances to `body.len()` once the last record has been yielded,
    /// which makes it usable as a progress cursor over the body.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Finds the start of the next record boundary (`\n\n@`) at or after
    /// `from`. Returns the index of the first `\n`.
    fn next_boundary(&self, from: usize) -> Option<usize> {
        let body = self.body;
        (from..body.len().saturating_sub(2))
            .find(|&i| body[i] == b'\n' && body[i + 1] == b'\n' && body[i + 2] == b'@')
    }
}

impl Iterator for EntryIter<'_> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (record_bytes, next_pos) = match self.next_boundary(self.pos) {
            Some(boundary) => (&self.body[self.pos..boundary], boundary + 2),
            None => {
                self.done = true;
                (&self.body[self.pos..], self.body.len())
            }
        };
        self.pos = next_pos;

        let record = match std::str::from_utf8(record_bytes) {
            Ok(record) => record,
            Err(e) => {
                return Some(Err(Error::InvalidFormat(format!(
                    "entry record is not valid UTF-8: {}",
                    e
                ))));
            }
        };
        Some(Entry::decode_record(record))
    }
}
