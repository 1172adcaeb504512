//! Handler for Deflate compressed data

use std::io::{Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use crate::errors::{RasterError, RasterResult};
use super::handler::CompressionHandler;

/// Zlib-wrapped Deflate handler
///
/// TIFF knows two codes for the same stream format: 8 (Adobe Deflate) and the
/// older 32946. Both decode identically; new files are written with 8.
pub struct AdobeDeflateHandler {
    code: u64,
}

impl AdobeDeflateHandler {
    pub fn new() -> Self {
        AdobeDeflateHandler { code: 8 }
    }

    /// Handler that reports the legacy code 32946
    pub fn legacy() -> Self {
        AdobeDeflateHandler { code: 32946 }
    }
}

impl Default for AdobeDeflateHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionHandler for AdobeDeflateHandler {
    fn decompress(&self, data: &[u8], expected: usize) -> RasterResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data).take(expected as u64);
        let mut decompressed_data = Vec::with_capacity(expected);
        match decoder.read_to_end(&mut decompressed_data) {
            Ok(_) => Ok(decompressed_data),
            Err(e) => Err(RasterError::IoError(e))
        }
    }

    fn compress(&self, data: &[u8]) -> RasterResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn name(&self) -> &'static str {
        "Adobe Deflate"
    }

    fn code(&self) -> u64 {
        self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_capped_at_expected_size() {
        let handler = AdobeDeflateHandler::new();
        let packed = handler.compress(&vec![7u8; 1 << 20]).unwrap();

        let block = handler.decompress(&packed, 64).unwrap();
        assert_eq!(block, vec![7u8; 64]);
    }

    #[test]
    fn test_corrupt_stream_is_an_error() {
        let handler = AdobeDeflateHandler::legacy();
        assert!(handler.decompress(&[0xde, 0xad, 0xbe, 0xef], 16).is_err());
    }
}
