//! Archive path type and the create-side path normalizer.
//!
//! Paths inside a container are always relative, slash-separated, and
//! filesystem-safe across platforms. [`ArchivePath`] is the validated
//! storage form used on both the encode and decode side; on restore it is
//! also the path-traversal guard. [`PathNormalizer`] is the create-side
//! sanitizer that turns raw relative paths from the walker into unique
//! `ArchivePath` values.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::{Error, Result};

/// Maximum length for archive paths (in bytes).
///
/// Well above any real filesystem limit (Linux PATH_MAX is 4KB, Windows
/// MAX_PATH is ~260); bounds memory use when parsing untrusted containers.
const MAX_PATH_LENGTH: usize = 32768;

/// Upper bound on numeric disambiguation attempts in [`PathNormalizer`].
const MAX_DISAMBIGUATION_ATTEMPTS: u32 = 1000;

/// Characters that are illegal in filenames on at least one supported
/// platform and are replaced during sanitization.
const ILLEGAL_CHARS: &[char] = &[':', '*', '?', '"', '<', '>', '|'];

/// Windows reserved device names that cannot be used as filenames.
///
/// These refer to device drivers on Windows and cannot be used as regular
/// filenames there. The sanitizer remaps them on all platforms so that a
/// snapshot created on Linux restores cleanly on Windows.
const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Checks if a filename is a Windows reserved name.
///
/// Reserved names are case-insensitive and remain reserved when followed
/// by an extension (e.g. `CON.txt`).
fn is_windows_reserved(name: &str) -> bool {
    let base = match name.find('.') {
        Some(pos) => &name[..pos],
        None => name,
    };
    WINDOWS_RESERVED_NAMES
        .iter()
        .any(|reserved| base.eq_ignore_ascii_case(reserved))
}

/// A validated, slash-separated relative path inside a container.
///
/// `ArchivePath` guarantees that:
/// - no NUL bytes are present
/// - the path is not absolute (does not start with `/`)
/// - no empty segments exist (no `//`, no trailing `/`)
/// - no `.` or `..` segments are present (prevents path traversal)
///
/// # Examples
///
/// ```
/// use treesnap::ArchivePath;
///
/// let path = ArchivePath::new("dir/file.txt").unwrap();
/// assert_eq!(path.as_str(), "dir/file.txt");
///
/// assert!(ArchivePath::new("../secret").is_err());
/// assert!(ArchivePath::new("/absolute/path").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePath(String);

impl ArchivePath {
    /// Creates a new `ArchivePath` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the path is empty, absolute,
    /// overlong, contains NUL bytes, empty segments, or `.`/`..` segments.
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    fn validate(s: &str) -> Result<()> {
        if s.contains('\0') {
            return Err(Error::InvalidPath("contains NUL byte".into()));
        }
        if s.is_empty() {
            return Err(Error::InvalidPath("empty path".into()));
        }
        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidPath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }
        if s.starts_with('/') {
            return Err(Error::InvalidPath("absolute path not allowed".into()));
        }
        if s.ends_with('/') {
            return Err(Error::InvalidPath("trailing slash not allowed".into()));
        }
        for segment in s.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidPath(
                    "empty segment (consecutive slashes)".into(),
                ));
            }
            if segment == "." {
                return Err(Error::InvalidPath("'.' segment not allowed".into()));
            }
            if segment == ".." {
                return Err(Error::InvalidPath(
                    "'..' segment not allowed (path traversal)".into(),
                ));
            }
        }
        Ok(())
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the parent directory of this path, if any.
    pub fn parent(&self) -> Option<Self> {
        self.0.rfind('/').map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns an iterator over the path components (segments).
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl AsRef<str> for ArchivePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ArchivePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArchivePath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

/// Sanitizes a single path segment for cross-platform safety.
///
/// Replaces characters illegal on common filesystems and control bytes
/// with `_`, strips trailing spaces and dots (illegal on Windows), and
/// suffixes Windows reserved device names. An empty result becomes `_`.
fn sanitize_segment(segment: &str) -> String {
    let mut out: String = segment
        .chars()
        .map(|c| {
            if ILLEGAL_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    while out.ends_with(' ') || out.ends_with('.') {
        out.pop();
    }
    if out.is_empty() {
        out.push('_');
    }
    if is_windows_reserved(&out) {
        out.push('_');
    }
    out
}

/// Splits a file name into stem and extension for disambiguation.
///
/// `archive.tar.gz` splits at the last dot; dotfiles keep their full name
/// as the stem (`.gitignore` has no extension).
fn split_stem(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(pos) => (&name[..pos], &name[pos..]),
    }
}

/// Create-side path sanitizer with per-archive collision tracking.
///
/// Normalization is deterministic: the same raw input always yields the
/// same output (memoized), and two *distinct* inputs that sanitize to the
/// same string receive numeric disambiguators (`name_1.ext`, `name_2.ext`,
/// ...) so paths stay unique within one archive.
///
/// # Examples
///
/// ```
/// use treesnap::PathNormalizer;
///
/// let mut normalizer = PathNormalizer::new();
/// let a = normalizer.normalize("logs\\app:1.txt").unwrap();
/// assert_eq!(a.as_str(), "logs/app_1.txt");
///
/// // Same input is stable.
/// let b = normalizer.normalize("logs\\app:1.txt").unwrap();
/// assert_eq!(a, b);
///
/// // A distinct input colliding after sanitization is disambiguated.
/// let c = normalizer.normalize("logs/app?1.txt").unwrap();
/// assert_eq!(c.as_str(), "logs/app_1_1.txt");
/// ```
#[derive(Debug, Default)]
pub struct PathNormalizer {
    memo: HashMap<String, ArchivePath>,
    taken: HashSet<String>,
}

impl PathNormalizer {
    /// Creates a new normalizer with empty collision state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes a raw relative path into a unique [`ArchivePath`].
    ///
    /// Backslashes are treated as separators, drive-letter components and
    /// `.` segments are dropped, `..` segments are remapped to a literal
    /// sanitized name, and each segment is sanitized for cross-platform
    /// safety.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if nothing remains after
    /// sanitization or a unique name cannot be found within
    /// [`MAX_DISAMBIGUATION_ATTEMPTS`].
    pub fn normalize(&mut self, raw: &str) -> Result<ArchivePath> {
        if let Some(existing) = self.memo.get(raw) {
            return Ok(existing.clone());
        }

        let mut segments = Vec::new();
        for segment in raw.split(['/', '\\']) {
            if segment.is_empty() || segment == "." {
                continue;
            }
            if is_drive_letter(segment) {
                continue;
            }
            if segment == ".." {
                // Traversal segments survive only as literal names.
                segments.push("__".to_string());
                continue;
            }
            segments.push(sanitize_segment(segment));
        }
        if segments.is_empty() {
            return Err(Error::InvalidPath(format!(
                "path '{}' is empty after sanitization",
                raw
            )));
        }

        let candidate = segments.join("/");
        let unique = self.disambiguate(candidate, raw)?;
        let path = ArchivePath::new(&unique)?;
        self.taken.insert(unique);
        self.memo.insert(raw.to_string(), path.clone());
        Ok(path)
    }

    fn disambiguate(&self, candidate: String, raw: &str) -> Result<String> {
        if !self.taken.contains(&candidate) {
            return Ok(candidate);
        }
        let (dir, name) = match candidate.rfind('/') {
            Some(pos) => (&candidate[..=pos], &candidate[pos + 1..]),
            None => ("", candidate.as_str()),
        };
        let (stem, ext) = split_stem(name);
        for n in 1..=MAX_DISAMBIGUATION_ATTEMPTS {
            let attempt = format!("{}{}_{}{}", dir, stem, n, ext);
            if !self.taken.contains(&attempt) {
                return Ok(attempt);
            }
        }
        Err(Error::InvalidPath(format!(
            "could not find a unique name for '{}' after {} attempts",
            raw, MAX_DISAMBIGUATION_ATTEMPTS
        )))
    }
}

/// Returns true for Windows drive-letter components like `C:`.
fn is_drive_letter(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
