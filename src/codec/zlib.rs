//! Zlib codec implementation.
//!
//! Always compiled: the small-body compression path uses zlib alone, so
//! unlike LZMA and BZip2 this codec is not feature-gated.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::bufread::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::{Error, Result};

/// Compresses a body with zlib at maximum level.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompresses a zlib stream.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the stream is not valid zlib data.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::InvalidFormat(format!("zlib decompression failed: {}", e)))?;
    Ok(out)
}
