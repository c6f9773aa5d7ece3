//! Section payload compression, grounded on the GZIP encoder idiom used across
//! this workspace's other archive-handling crates.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::Error;
use crate::format::Compressor;

/// Compresses `payload` with `compressor`.
///
/// `Pack200Gzip` is treated identically to `Gzip` at the byte level; see
/// [`Compressor::Pack200Gzip`] for why.
pub(crate) fn compress(compressor: Compressor, payload: &[u8]) -> Result<Vec<u8>, Error> {
    match compressor {
        Compressor::None => Ok(payload.to_vec()),
        Compressor::Gzip | Compressor::Pack200Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(payload)?;
            Ok(encoder.finish()?)
        }
    }
}

/// Decompresses `content` that was produced by [`compress`] with `compressor`.
pub(crate) fn decompress(compressor: Compressor, content: &[u8]) -> Result<Vec<u8>, Error> {
    match compressor {
        Compressor::None => Ok(content.to_vec()),
        Compressor::Gzip | Compressor::Pack200Gzip => {
            let mut decoder = GzDecoder::new(content);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out)?;
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gzip_round_trips() {
        let payload = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let compressed = compress(Compressor::Gzip, &payload).unwrap();
        assert_ne!(compressed, payload);
        let decompressed = decompress(Compressor::Gzip, &compressed).unwrap();
        assert_eq!(decompressed, payload);
    }

    #[test]
    fn none_is_identity() {
        let payload = b"raw bytes".to_vec();
        let compressed = compress(Compressor::None, &payload).unwrap();
        assert_eq!(compressed, payload);
    }
}
