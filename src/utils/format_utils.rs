//! TIFF format utilities
//!
//! Utilities for working with TIFF format specifics like
//! byte order detection and format detection.

use log::debug;
use crate::errors::{RasterError, RasterResult};
use crate::io::seekable::SeekableReader;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::tiff::constants::header;
use crate::tiff::validation;

/// Detects the byte order of a TIFF file and returns it with its handler
pub fn detect_byte_order(reader: &mut dyn SeekableReader) -> RasterResult<(ByteOrder, Box<dyn ByteOrderHandler>)> {
    let byte_order = ByteOrder::detect(reader)?;
    debug!("Detected byte order: {}", byte_order.name());

    Ok((byte_order, byte_order.create_handler()))
}

/// Detects whether a file is TIFF or BigTIFF based on its version number
///
/// # Arguments
/// * `reader` - The seekable reader to use
/// * `byte_order_handler` - Handler for the file's byte order
///
/// # Returns
/// A tuple with (is_big_tiff, version_number)
pub fn detect_tiff_format(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler
) -> RasterResult<(bool, u16)> {
    let version = byte_order_handler.read_u16(reader)?;
    debug!("TIFF version: {}", version);

    let is_big_tiff = match version {
        header::BIG_TIFF_VERSION => {
            debug!("Detected BigTIFF format");
            validation::validate_bigtiff_header(reader, byte_order_handler)?;
            true
        },
        header::TIFF_VERSION => {
            debug!("Detected standard TIFF format");
            false
        },
        _ => return Err(RasterError::UnsupportedVersion(version)),
    };

    Ok((is_big_tiff, version))
}

/// Checks the first four bytes of a file for a TIFF or BigTIFF signature
pub fn has_tiff_signature(magic: &[u8]) -> bool {
    if magic.len() < 4 {
        return false;
    }

    match [magic[0], magic[1]] {
        header::LITTLE_ENDIAN_MARKER => {
            let version = u16::from_le_bytes([magic[2], magic[3]]);
            version == header::TIFF_VERSION || version == header::BIG_TIFF_VERSION
        },
        header::BIG_ENDIAN_MARKER => {
            let version = u16::from_be_bytes([magic[2], magic[3]]);
            version == header::TIFF_VERSION || version == header::BIG_TIFF_VERSION
        },
        _ => false,
    }
}
