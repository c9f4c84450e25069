//! Compression engine: algorithm selection, tagged streams, base85.
//!
//! The write side trial-compresses the assembled body and keeps whichever
//! algorithm produced the smallest output; the read side dispatches on a
//! one-byte algorithm tag written ahead of the compressed stream. The tag
//! replaces the original format's "try every decoder until one works"
//! recovery, which relied on no two stream formats ever looking alike;
//! untagged streams still go through the fixed-order fallback so older
//! containers keep restoring.

pub mod base85;

#[cfg(feature = "bzip2")]
pub mod bzip2;

#[cfg(feature = "lzma")]
pub mod lzma;

pub mod zlib;

use crate::{Error, Result};

/// Bodies below this size are compressed with zlib alone; the trial pass
/// is not worth the CPU for tiny payloads.
pub const SMALL_BODY_THRESHOLD: usize = 2048;

/// A supported compression algorithm.
///
/// Declaration order is the tie-break and fallback order: LZMA, then
/// BZip2, then zlib (ratio first, then decode speed/compatibility).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// LZMA, preset tuned for maximum ratio.
    Lzma,
    /// BZip2 at maximum level.
    Bzip2,
    /// Zlib at maximum level; also the small-body fast path.
    Zlib,
}

impl Algorithm {
    /// All algorithms in preference order.
    pub const ALL: &[Algorithm] = &[Algorithm::Lzma, Algorithm::Bzip2, Algorithm::Zlib];

    /// The one-byte stream tag written ahead of the compressed bytes.
    pub fn tag(&self) -> u8 {
        match self {
            Algorithm::Lzma => b'L',
            Algorithm::Bzip2 => b'B',
            Algorithm::Zlib => b'Z',
        }
    }

    /// Looks up an algorithm by its stream tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'L' => Some(Algorithm::Lzma),
            b'B' => Some(Algorithm::Bzip2),
            b'Z' => Some(Algorithm::Zlib),
            _ => None,
        }
    }

    /// Human-readable name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Lzma => "lzma",
            Algorithm::Bzip2 => "bzip2",
            Algorithm::Zlib => "zlib",
        }
    }

    /// Returns true if support for this algorithm is compiled in.
    pub fn is_available(&self) -> bool {
        match self {
            Algorithm::Lzma => cfg!(feature = "lzma"),
            Algorithm::Bzip2 => cfg!(feature = "bzip2"),
            Algorithm::Zlib => true,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Compresses a body with one specific algorithm, without the tag byte.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if support for the algorithm is not
/// compiled in.
pub fn compress_with(algorithm: Algorithm, body: &[u8]) -> Result<Vec<u8>> {
    match algorithm {
        #[cfg(feature = "lzma")]
        Algorithm::Lzma => lzma::compress(body),
        #[cfg(feature = "bzip2")]
        Algorithm::Bzip2 => bzip2::compress(body),
        Algorithm::Zlib => zlib::compress(body),
        #[allow(unreachable_patterns)]
        other => Err(Error::InvalidFormat(format!(
            "{} support not compiled in",
            other
        ))),
    }
}

/// Decompresses a body with one specific algorithm, without the tag byte.
pub fn decompress_with(algorithm: Algorithm, stream: &[u8]) -> Result<Vec<u8>> {
    match algorithm {
        #[cfg(feature = "lzma")]
        Algorithm::Lzma => lzma::decompress(stream),
        #[cfg(feature = "bzip2")]
        Algorithm::Bzip2 => bzip2::decompress(stream),
        Algorithm::Zlib => zlib::decompress(stream),
        #[allow(unreachable_patterns)]
        other => Err(Error::InvalidFormat(format!(
            "{} support not compiled in",
            other
        ))),
    }
}

/// Compresses a body, choosing the best available algorithm.
///
/// Bodies under [`SMALL_BODY_THRESHOLD`] go straight to zlib; larger
/// bodies are trial-compressed with every compiled-in algorithm and the
/// smallest output wins, ties broken in [`Algorithm::ALL`] order. The
/// returned bytes start with the winner's tag byte.
pub fn compress_body(body: &[u8]) -> Result<(Algorithm, Vec<u8>)> {
    let mut winner = Algorithm::Zlib;
    let mut best = zlib::compress(body)?;

    if body.len() >= SMALL_BODY_THRESHOLD {
        for &algorithm in Algorithm::ALL {
            if algorithm == Algorithm::Zlib || !algorithm.is_available() {
                continue;
            }
            let candidate = compress_with(algorithm, body)?;
            // Ties go to the more preferred algorithm.
            if candidate.len() < best.len()
                || (candidate.len() == best.len() && prefers(algorithm, winner))
            {
                winner = algorithm;
                best = candidate;
            }
        }
        log::debug!(
            "trial compression picked {} ({} -> {} bytes)",
            winner,
            body.len(),
            best.len()
        );
    }

    let mut tagged = Vec::with_capacity(best.len() + 1);
    tagged.push(winner.tag());
    tagged.extend_from_slice(&best);
    Ok((winner, tagged))
}

/// Returns true if `a` is preferred over `b` in [`Algorithm::ALL`] order.
fn prefers(a: Algorithm, b: Algorithm) -> bool {
    let rank = |x| Algorithm::ALL.iter().position(|&y| y == x).unwrap_or(usize::MAX);
    rank(a) < rank(b)
}

/// Decompresses a tagged stream produced by [`compress_body`].
///
/// Dispatches on the leading tag byte. Streams whose first byte is not a
/// known tag, or which fail to decode under the tagged algorithm (a
/// legacy bzip2 stream starts with `B`, the bzip2 tag), fall back to
/// trying every available algorithm on the whole stream in fixed order;
/// [`Error::InvalidFormat`] is returned only if none decode it.
pub fn decompress_body(data: &[u8]) -> Result<(Algorithm, Vec<u8>)> {
    let Some((&tag, stream)) = data.split_first() else {
        return Err(Error::InvalidFormat("empty compressed stream".into()));
    };

    if let Some(algorithm) = Algorithm::from_tag(tag) {
        if algorithm.is_available() {
            if let Ok(body) = decompress_with(algorithm, stream) {
                return Ok((algorithm, body));
            }
        }
    }

    for &algorithm in Algorithm::ALL {
        if !algorithm.is_available() {
            continue;
        }
        if let Ok(body) = decompress_with(algorithm, data) {
            log::debug!("untagged stream decoded as {}", algorithm);
            return Ok((algorithm, body));
        }
    }
    Err(Error::InvalidFormat(
        "no compression algorithm matched the stream".into(),
    ))
}
