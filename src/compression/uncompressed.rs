//! Handler for uncompressed data

use crate::errors::RasterResult;
use super::handler::CompressionHandler;

/// Uncompressed data handler (compression code 1)
pub struct UncompressedHandler;

impl CompressionHandler for UncompressedHandler {
    fn decompress(&self, data: &[u8], expected: usize) -> RasterResult<Vec<u8>> {
        Ok(data[..data.len().min(expected)].to_vec())
    }

    fn compress(&self, data: &[u8]) -> RasterResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn name(&self) -> &'static str {
        "Uncompressed"
    }

    fn code(&self) -> u64 {
        1
    }
}
