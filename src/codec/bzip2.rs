//! BZip2 codec implementation.

use std::io::{Read, Write};

use bzip2::Compression;
use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;

use crate::{Error, Result};

/// Compresses a body with bzip2 at maximum level.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompresses a bzip2 stream.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the stream is not valid bzip2 data.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = BzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::InvalidFormat(format!("bzip2 decompression failed: {}", e)))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bzip2_roundtrip() {
        let data = b"Hello, World! This is a test of BZip2 compression.";
        let compressed = compress(data).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_bzip2_stream_signature() {
        let compressed = compress(b"data").unwrap();
        assert_eq!(&compressed[..3], b"BZh");
    }

    #[test]
    fn test_bzip2_rejects_garbage() {
        assert!(decompress(b"definitely not bzip2").is_err());
    }
}
