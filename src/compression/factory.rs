//! Factory for creating compression handlers

use crate::errors::{RasterError, RasterResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::zstd::ZstdHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a compression handler for a TIFF compression code
    pub fn create_handler(compression: u64) -> RasterResult<Box<dyn CompressionHandler>> {
        match compression {
            1 => Ok(Box::new(UncompressedHandler)),
            8 => Ok(Box::new(AdobeDeflateHandler::new())),
            32946 => Ok(Box::new(AdobeDeflateHandler::legacy())),
            14 => Ok(Box::new(ZstdHandler::new())),
            _ => Err(RasterError::UnsupportedCompression(compression))
        }
    }

    /// Create a handler from a `COMPRESS` creation option value
    ///
    /// `level` only applies to ZSTD.
    pub fn get_handler_by_name(name: &str, level: Option<i32>) -> RasterResult<Box<dyn CompressionHandler>> {
        match name.to_lowercase().as_str() {
            "uncompressed" | "none" => Ok(Box::new(UncompressedHandler)),
            "deflate" | "zip" | "adobe deflate" => Ok(Box::new(AdobeDeflateHandler::new())),
            "zstd" => Ok(Box::new(level.map(ZstdHandler::with_level).unwrap_or_default())),
            _ => Err(RasterError::Config(format!("Unknown compression type: {}", name)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handlers_round_trip_their_own_output() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 7) as u8).collect();
        for code in [1u64, 8, 32946, 14] {
            let handler = CompressionFactory::create_handler(code).unwrap();
            assert_eq!(handler.code(), code);
            let packed = handler.compress(&data).unwrap();
            assert_eq!(handler.decompress(&packed, data.len()).unwrap(), data);
        }
    }

    #[test]
    fn test_unknown_codes_and_names_are_rejected() {
        assert!(matches!(CompressionFactory::create_handler(5), Err(RasterError::UnsupportedCompression(5))));
        assert!(CompressionFactory::get_handler_by_name("lzw", None).is_err());
    }

    #[test]
    fn test_zstd_level_is_clamped() {
        let handler = ZstdHandler::with_level(40);
        assert_eq!(handler.level(), 22);
        let by_name = CompressionFactory::get_handler_by_name("ZSTD", Some(9)).unwrap();
        assert_eq!(by_name.code(), 14);
    }
}
