//! Content classification: text vs. binary, and the source charset.
//!
//! The classifier decides once, up front, how a file's bytes will be
//! represented in the container; the decision is carried through the
//! [`Entry`](crate::Entry) as a tagged variant instead of being
//! re-inspected at each stage.
//!
//! Classification is a heuristic. The codec stays byte-exact regardless of
//! the outcome because binary content is stored as base64 and text content
//! is restored through its declared charset, so the classifier is free to
//! be conservative: anything ambiguous defaults to [`Encoding::Binary`].

use crate::entry::{EMPTY_DIR_MARKER, TEXT_MARKER_PREFIX};

/// Maximum tolerated ratio of control characters in UTF-8/UTF-16 text.
///
/// Tabs, newlines and carriage returns do not count. Logs with ANSI
/// escapes stay under this; packed binary data does not.
const MAX_CONTROL_RATIO: f64 = 0.30;

/// Source character encoding of a text entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    /// UTF-8 (stored raw; the container body is itself UTF-8).
    Utf8,
    /// UTF-16 little-endian with a leading BOM.
    Utf16Le,
    /// UTF-16 big-endian with a leading BOM.
    Utf16Be,
    /// ISO-8859-1; every byte maps to the Unicode code point of the same
    /// value, so the round-trip is bijective.
    Latin1,
}

impl Charset {
    /// Returns the stable wire name used in `T:<charset>` marker lines.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Utf16Le => "utf-16le",
            Charset::Utf16Be => "utf-16be",
            Charset::Latin1 => "latin-1",
        }
    }

    /// Looks up a charset by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "utf-8" => Some(Charset::Utf8),
            "utf-16le" => Some(Charset::Utf16Le),
            "utf-16be" => Some(Charset::Utf16Be),
            "latin-1" => Some(Charset::Latin1),
            _ => None,
        }
    }
}

/// How a file's payload is represented in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Printable text in the given source charset, stored as UTF-8.
    Text(Charset),
    /// Arbitrary bytes, stored as base64.
    Binary,
}

/// Classifies a file's content as text (with charset) or binary.
///
/// Policy, in order:
/// 1. zero-length content is trivially `Text(Utf8)`;
/// 2. a UTF-16 BOM (checked before the NUL guard, since UTF-16 encodes
///    ASCII with NUL high bytes) selects UTF-16LE/BE if the remainder
///    decodes and looks printable;
/// 3. strict UTF-8;
/// 4. Latin-1 as last resort, accepted only when every byte is printable;
/// 5. otherwise `Binary`.
///
/// Content that decodes but would collide with the entry-record grammar
/// (see [`is_grammar_safe`]) is classified `Binary` so that payloads never
/// need escaping.
pub fn classify(bytes: &[u8]) -> Encoding {
    if bytes.is_empty() {
        return Encoding::Text(Charset::Utf8);
    }

    if let Some(charset) = classify_utf16(bytes) {
        return Encoding::Text(charset);
    }

    if bytes.contains(&0) {
        return Encoding::Binary;
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        if is_printable(text) && is_grammar_safe(text) {
            return Encoding::Text(Charset::Utf8);
        }
        return Encoding::Binary;
    }

    if let Some(text) = decode_latin1_strict(bytes) {
        if is_grammar_safe(&text) {
            return Encoding::Text(Charset::Latin1);
        }
    }

    Encoding::Binary
}

/// Attempts BOM-based UTF-16 classification.
fn classify_utf16(bytes: &[u8]) -> Option<Charset> {
    let (charset, body) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (Charset::Utf16Le, rest),
        [0xFE, 0xFF, rest @ ..] => (Charset::Utf16Be, rest),
        _ => return None,
    };
    if body.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| match charset {
            Charset::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
            _ => u16::from_be_bytes([pair[0], pair[1]]),
        })
        .collect();
    let text = String::from_utf16(&units).ok()?;
    if text.contains('\0') || !is_printable(&text) || !is_grammar_safe(&text) {
        return None;
    }
    Some(charset)
}

/// Decodes Latin-1, rejecting anything non-printable.
///
/// Latin-1 decoding itself never fails, so this is the one place the
/// printability check is strict: C0/C1 control bytes (other than tab,
/// newline, carriage return) disqualify the content entirely.
fn decode_latin1_strict(bytes: &[u8]) -> Option<String> {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        let printable = matches!(b, 0x20..=0x7E | b'\t' | b'\n' | b'\r' | 0xA0..);
        if !printable {
            return None;
        }
        out.push(b as char);
    }
    Some(out)
}

/// Checks the control-character ratio of decoded text.
fn is_printable(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    let total = text.chars().count();
    let control = text
        .chars()
        .filter(|&c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
        .count();
    (control as f64) / (total as f64) <= MAX_CONTROL_RATIO
}

/// Checks that text stored raw cannot be misparsed as record structure.
///
/// The container grammar starts a new record at a blank line followed by
/// `@`, and reads the first payload line as a possible marker. Text that
/// collides with either rule is stored as binary instead of escaped.
pub fn is_grammar_safe(text: &str) -> bool {
    if text.contains("\n\n@") {
        return false;
    }
    let first_line = text.split('\n').next().unwrap_or("");
    if first_line == "B" || first_line == EMPTY_DIR_MARKER {
        return false;
    }
    if first_line.starts_with(TEXT_MARKER_PREFIX) {
        return false;
    }
    true
}
