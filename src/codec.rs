//! Lossless stream compression for object payloads (C2).
//!
//! Objects are stored zlib-compressed on disk, matching the format Git
//! itself uses for loose objects. The codec is pure: it never touches the
//! filesystem and carries no framing of its own beyond what zlib provides.

use crate::error::GitletError;
use flate2::write::ZlibEncoder;
use flate2::read::ZlibDecoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compresses `data` with zlib at the default compression level.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing to an in-memory Vec cannot fail.
    encoder.write_all(data).expect("in-memory zlib write cannot fail");
    encoder.finish().expect("in-memory zlib finish cannot fail")
}

/// Decompresses zlib-compressed `data`.
///
/// Fails with [`GitletError::Format`] if `data` is not a valid zlib stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, GitletError> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| GitletError::format(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let original = b"the quick brown fox jumps over the lazy dog";
        let compressed = compress(original);
        assert_eq!(decompress(&compressed).unwrap(), original);
    }

    #[test]
    fn round_trips_empty_input() {
        let compressed = compress(b"");
        assert_eq!(decompress(&compressed).unwrap(), b"");
    }

    #[test]
    fn round_trips_large_input() {
        let original: Vec<u8> = (0..1_000_000u32).map(|i| (i % 256) as u8).collect();
        let compressed = compress(&original);
        assert_eq!(decompress(&compressed).unwrap(), original);
    }

    #[test]
    fn decompress_rejects_malformed_input() {
        let result = decompress(b"definitely not zlib data");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), crate::error::ErrorKind::Format);
    }

    #[test]
    fn compresses_repetitive_data_smaller() {
        let original = vec![b'a'; 10_000];
        let compressed = compress(&original);
        assert!(compressed.len() < original.len());
    }
}
