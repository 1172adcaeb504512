//! Compression handler trait definition

use crate::errors::RasterResult;

/// Strategy trait for handling different compression methods
pub trait CompressionHandler: Send + Sync {
    /// Decompress one strip or tile
    ///
    /// Output stops at `expected` bytes; anything the stream holds past that
    /// is never materialized.
    fn decompress(&self, data: &[u8], expected: usize) -> RasterResult<Vec<u8>>;

    /// Compress one strip or tile
    fn compress(&self, data: &[u8]) -> RasterResult<Vec<u8>>;

    /// Get the name of this compression method
    fn name(&self) -> &'static str;

    /// Get the TIFF compression code
    fn code(&self) -> u64;
}
