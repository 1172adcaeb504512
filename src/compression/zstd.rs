//! Handler for ZSTD compressed data

use crate::errors::{RasterError, RasterResult};
use super::handler::CompressionHandler;
use log::{debug, warn};
use std::io::Read;

/// ZSTD compression handler (compression code 14)
pub struct ZstdHandler {
    /// Compression level (1-22, default 3)
    compression_level: i32,
}

impl ZstdHandler {
    /// Create a new ZSTD handler with default compression level
    pub fn new() -> Self {
        ZstdHandler {
            compression_level: 3
        }
    }

    /// Create a new ZSTD handler with specified compression level
    pub fn with_level(level: i32) -> Self {
        let level = level.clamp(1, 22);
        ZstdHandler {
            compression_level: level
        }
    }

    pub fn level(&self) -> i32 {
        self.compression_level
    }
}

impl Default for ZstdHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionHandler for ZstdHandler {
    fn decompress(&self, data: &[u8], expected: usize) -> RasterResult<Vec<u8>> {
        debug!("ZSTD decompressing {} bytes into at most {}", data.len(), expected);
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let to_error = |e: std::io::Error| {
            warn!("ZSTD decompression error: {}", e);
            RasterError::GenericError(format!("ZSTD decompression error: {}", e))
        };

        let decoder = zstd::stream::read::Decoder::with_buffer(data).map_err(to_error)?;
        let mut decompressed_data = Vec::with_capacity(expected);
        decoder.take(expected as u64)
            .read_to_end(&mut decompressed_data)
            .map_err(to_error)?;
        Ok(decompressed_data)
    }

    fn compress(&self, data: &[u8]) -> RasterResult<Vec<u8>> {
        debug!("ZSTD compressing {} bytes with level {}", data.len(), self.compression_level);
        zstd::encode_all(data, self.compression_level).map_err(|e| {
            warn!("ZSTD compression error: {}", e);
            RasterError::GenericError(format!("ZSTD compression error: {}", e))
        })
    }

    fn name(&self) -> &'static str {
        "ZSTD"
    }

    fn code(&self) -> u64 {
        14
    }
}
