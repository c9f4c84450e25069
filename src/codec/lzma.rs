//! LZMA codec implementation.
//!
//! Streams are raw LZMA (no container format); the properties the decoder
//! needs travel in a small frame ahead of the stream:
//!
//! ```text
//! +-------+----------------+---------------------+------------------+
//! | props | dict size (LE) | uncompressed (LE)   | raw LZMA stream  |
//! | 1 B   | 4 B            | 8 B                 | ...              |
//! +-------+----------------+---------------------+------------------+
//! ```

use std::io::{Cursor, Read, Write};

use crate::{Error, Result};

/// Frame prefix length: props byte + dict size + uncompressed size.
const FRAME_HEADER_LEN: usize = 13;

/// LZMA preset: maximum ratio, the whole point of this container format.
const PRESET: u32 = 9;

/// Cap on the bytes reserved up front when decoding, as a multiple of
/// the stream length. The declared size in the frame is untrusted input
/// and must not drive the allocation on its own.
const MAX_RESERVE_RATIO: usize = 32;

/// Compresses a body into a framed raw LZMA stream.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let options = lzma_rust2::LzmaOptions::with_preset(PRESET);

    let mut out = Vec::with_capacity(FRAME_HEADER_LEN + data.len() / 2);
    out.push(options.get_props());
    out.extend_from_slice(&options.dict_size.to_le_bytes());
    out.extend_from_slice(&(data.len() as u64).to_le_bytes());

    {
        let mut writer = lzma_rust2::LzmaWriter::new_no_header(&mut out, &options, true)
            .map_err(|e| Error::InvalidFormat(format!("LZMA encoder init failed: {}", e)))?;
        writer.write_all(data)?;
        let _ = writer
            .finish()
            .map_err(|e| Error::InvalidFormat(format!("LZMA encoding failed: {}", e)))?;
    }
    Ok(out)
}

/// Decompresses a framed raw LZMA stream.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the frame header is truncated or
/// the stream does not decode to the declared size.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < FRAME_HEADER_LEN {
        return Err(Error::InvalidFormat(
            "LZMA frame shorter than its header".into(),
        ));
    }
    let props = data[0];
    let dict_size = u32::from_le_bytes(data[1..5].try_into().expect("4-byte slice"));
    let uncompressed_size = u64::from_le_bytes(data[5..13].try_into().expect("8-byte slice"));

    let stream = Cursor::new(&data[FRAME_HEADER_LEN..]);
    let mut reader =
        lzma_rust2::LzmaReader::new_with_props(stream, uncompressed_size, props, dict_size, None)
            .map_err(|e| Error::InvalidFormat(format!("invalid LZMA properties: {}", e)))?;

    let reserve = usize::try_from(uncompressed_size)
        .unwrap_or(usize::MAX)
        .min(data.len().saturating_mul(MAX_RESERVE_RATIO));
    let mut out = Vec::with_capacity(reserve);
    reader
        .read_to_end(&mut out)
        .map_err(|e| Error::InvalidFormat(format!("LZMA decompression failed: {}", e)))?;
    if out.len() as u64 != uncompressed_size {
        return Err(Error::InvalidFormat(format!(
            "LZMA stream decoded to {} bytes, frame declared {}",
            out.len(),
            uncompressed_size
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lzma_roundtrip() {
        let data = b"Hello, World! This is a test of LZMA compression.";
        let compressed = compress(data).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_lzma_empty() {
        let compressed = compress(b"").unwrap();
        assert!(decompress(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_lzma_large_repetitive_body() {
        let data: Vec<u8> = b"abcdefgh".iter().copied().cycle().take(100_000).collect();
        let compressed = compress(&data).unwrap();
        assert!(compressed.len() < data.len() / 10);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_lzma_truncated_frame() {
        let err = decompress(&[0x5D, 0x00]).unwrap_err();
        assert!(err.to_string().contains("shorter"));
    }

    #[test]
    fn test_lzma_forged_huge_declared_size() {
        let mut compressed = compress(b"tiny").unwrap();
        // A frame claiming a multi-terabyte result must fail cleanly
        // instead of allocating for the declared size.
        compressed[5..13].copy_from_slice(&u64::MAX.to_le_bytes());
        let err = decompress(&compressed).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_lzma_size_mismatch() {
        let mut compressed = compress(b"some data here").unwrap();
        // Corrupt the declared uncompressed size.
        compressed[5] ^= 0x01;
        assert!(decompress(&compressed).is_err());
    }
}
