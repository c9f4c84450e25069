//! Entry record codec: one filesystem node to/from one archive record.
//!
//! Each entry is a line-oriented text block:
//!
//! ```text
//! @<relative_path>
//! <marker?>
//! <payload>
//! ```
//!
//! - Empty directories carry the sentinel line `[EMPTY_DIRECTORY]` and no
//!   payload.
//! - UTF-8 text files store their content raw, with no marker line.
//! - Non-UTF-8 text files carry a `T:<charset>` marker line followed by
//!   the content transcoded to UTF-8; the charset is needed to restore the
//!   exact original bytes.
//! - Binary files carry the marker line `B` followed by base64 text.
//!
//! Records are separated by one blank line; the parser in
//! [`container`](crate::container) scans those boundaries, so payloads are
//! never re-escaped. The classifier guarantees that text payloads cannot
//! collide with the boundary grammar.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::classify::{Charset, Encoding, classify};
use crate::{ArchivePath, Error, Result};

/// Sentinel line for a directory entry with no files.
pub const EMPTY_DIR_MARKER: &str = "[EMPTY_DIRECTORY]";

/// Marker line for a base64 binary payload.
pub const BINARY_MARKER: &str = "B";

/// Prefix of the marker line declaring a non-UTF-8 text charset.
pub const TEXT_MARKER_PREFIX: &str = "T:";

/// The node kind and payload of an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file. `payload` holds the exact original bytes; the
    /// entry owns them exclusively until the record is written out.
    File {
        /// How the payload is represented in the container.
        encoding: Encoding,
        /// The file's raw bytes.
        payload: Vec<u8>,
    },
    /// A directory containing no files.
    EmptyDirectory,
}

/// One node from the source tree, in archive form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Normalized relative path, unique within the archive.
    pub path: ArchivePath,
    /// Node kind and payload.
    pub kind: EntryKind,
}

impl Entry {
    /// Creates a file entry, classifying the payload.
    pub fn file(path: ArchivePath, payload: Vec<u8>) -> Self {
        let encoding = classify(&payload);
        Self {
            path,
            kind: EntryKind::File { encoding, payload },
        }
    }

    /// Creates an empty-directory entry.
    pub fn empty_dir(path: ArchivePath) -> Self {
        Self {
            path,
            kind: EntryKind::EmptyDirectory,
        }
    }

    /// Returns the payload size in bytes (0 for directories).
    pub fn payload_len(&self) -> u64 {
        match &self.kind {
            EntryKind::File { payload, .. } => payload.len() as u64,
            EntryKind::EmptyDirectory => 0,
        }
    }

    /// Serializes this entry into its record text (without the blank-line
    /// separator between records).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Integrity`] if a text payload does not actually
    /// decode in its declared charset. This cannot happen for entries
    /// built through [`Entry::file`].
    pub fn encode_record(&self) -> Result<String> {
        let mut record = String::with_capacity(self.path.as_str().len() + 2);
        record.push('@');
        record.push_str(self.path.as_str());
        record.push('\n');

        match &self.kind {
            EntryKind::EmptyDirectory => {
                record.push_str(EMPTY_DIR_MARKER);
            }
            EntryKind::File {
                encoding: Encoding::Binary,
                payload,
            } => {
                record.push_str(BINARY_MARKER);
                record.push('\n');
                record.push_str(&BASE64.encode(payload));
            }
            EntryKind::File {
                encoding: Encoding::Text(charset),
                payload,
            } => {
                if *charset != Charset::Utf8 {
                    record.push_str(TEXT_MARKER_PREFIX);
                    record.push_str(charset.name());
                    record.push('\n');
                }
                record.push_str(&decode_to_storage(*charset, payload)?);
            }
        }
        Ok(record)
    }

    /// Parses one record text block back into an [`Entry`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFormat`] if the header line is malformed, a
    ///   marker is unrecognized, or base64 decoding fails.
    /// - [`Error::InvalidPath`] if the header path fails validation.
    /// - [`Error::Integrity`] if a `latin-1` payload contains characters
    ///   outside Latin-1.
    pub fn decode_record(record: &str) -> Result<Self> {
        let Some(rest) = record.strip_prefix('@') else {
            return Err(Error::InvalidFormat(
                "entry record does not start with '@'".into(),
            ));
        };
        let (path_str, body) = match rest.split_once('\n') {
            Some((line, body)) => (line, body),
            None => (rest, ""),
        };
        let path = ArchivePath::new(path_str)?;

        if body == EMPTY_DIR_MARKER || body == format!("{EMPTY_DIR_MARKER}\n") {
            return Ok(Self::empty_dir(path));
        }

        if body == BINARY_MARKER {
            return Ok(Self {
                path,
                kind: EntryKind::File {
                    encoding: Encoding::Binary,
                    payload: Vec::new(),
                },
            });
        }
        if let Some(base64_text) = body.strip_prefix("B\n") {
            let compact: String = base64_text
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            let payload = BASE64.decode(compact.as_bytes()).map_err(|e| {
                Error::InvalidFormat(format!("invalid base64 in entry '{}': {}", path, e))
            })?;
            return Ok(Self {
                path,
                kind: EntryKind::File {
                    encoding: Encoding::Binary,
                    payload,
                },
            });
        }

        if let Some(marked) = body.strip_prefix(TEXT_MARKER_PREFIX) {
            let (name, text) = match marked.split_once('\n') {
                Some((name, text)) => (name, text),
                None => (marked, ""),
            };
            let Some(charset) = Charset::from_name(name) else {
                return Err(Error::InvalidFormat(format!(
                    "unknown charset '{}' in entry '{}'",
                    name, path
                )));
            };
            let payload = encode_from_storage(charset, text)?;
            return Ok(Self {
                path,
                kind: EntryKind::File {
                    encoding: Encoding::Text(charset),
                    payload,
                },
            });
        }

        Ok(Self {
            path,
            kind: EntryKind::File {
                encoding: Encoding::Text(Charset::Utf8),
                payload: body.as_bytes().to_vec(),
            },
        })
    }
}

/// Decodes original payload bytes into the UTF-8 storage form.
fn decode_to_storage(charset: Charset, payload: &[u8]) -> Result<String> {
    match charset {
        Charset::Utf8 => std::str::from_utf8(payload)
            .map(str::to_string)
            .map_err(|e| Error::Integrity(format!("payload declared utf-8 is not: {}", e))),
        Charset::Utf16Le | Charset::Utf16Be => {
            let body = payload
                .get(2..)
                .ok_or_else(|| Error::Integrity("utf-16 payload shorter than its BOM".into()))?;
            if body.len() % 2 != 0 {
                return Err(Error::Integrity("utf-16 payload has odd length".into()));
            }
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| match charset {
                    Charset::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
                    _ => u16::from_be_bytes([pair[0], pair[1]]),
                })
                .collect();
            String::from_utf16(&units)
                .map_err(|e| Error::Integrity(format!("payload declared utf-16 is not: {}", e)))
        }
        Charset::Latin1 => Ok(payload.iter().map(|&b| b as char).collect()),
    }
}

/// Re-encodes the UTF-8 storage form back into the original bytes.
fn encode_from_storage(charset: Charset, text: &str) -> Result<Vec<u8>> {
    match charset {
        Charset::Utf8 => Ok(text.as_bytes().to_vec()),
        Charset::Utf16Le => {
            let mut bytes = vec![0xFF, 0xFE];
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_le_bytes());
            }
            Ok(bytes)
        }
        Charset::Utf16Be => {
            let mut bytes = vec![0xFE, 0xFF];
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_be_bytes());
            }
            Ok(bytes)
        }
        Charset::Latin1 => {
            let mut bytes = Vec::with_capacity(text.len());
            for c in text.chars() {
                let code = c as u32;
                if code > 0xFF {
                    return Err(Error::Integrity(format!(
                        "character U+{:04X} outside latin-1 in declared latin-1 payload",
                        code
                    )));
                }
                bytes.push(code as u8);
            }
            Ok(bytes)
        }
    }
}
