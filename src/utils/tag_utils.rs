//! TIFF tag utilities
//!
//! Utilities for working with TIFF tags and their values.

use crate::errors::{RasterError, RasterResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::{compression, field_types, tags};
use crate::tiff::ifd::IFDEntry;

/// Size in bytes of a single value of `field_type`
///
/// Returns `None` for field types this crate does not decode.
pub fn field_type_size(field_type: u16) -> Option<usize> {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => Some(1),
        field_types::SHORT | field_types::SSHORT => Some(2),
        field_types::LONG | field_types::SLONG | field_types::FLOAT => Some(4),
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => Some(8),
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => Some(8),
        _ => None,
    }
}

/// Decodes `count` integer values of `field_type` from raw tag bytes
///
/// # Arguments
/// * `bytes` - The raw value bytes, in file byte order
/// * `field_type` - TIFF field type of the values
/// * `count` - Number of values to decode
/// * `handler` - The byte order handler
pub fn decode_tag_values(
    bytes: &[u8],
    field_type: u16,
    count: usize,
    handler: &dyn ByteOrderHandler
) -> RasterResult<Vec<u64>> {
    let size = field_type_size(field_type)
        .ok_or(RasterError::UnsupportedFieldType(field_type))?;

    let needed = size.checked_mul(count).ok_or_else(|| RasterError::GenericError(format!(
        "Tag value count {} of type {} overflows",
        count, get_field_type_name(field_type))))?;
    if bytes.len() < needed {
        return Err(RasterError::GenericError(format!(
            "Tag data holds {} bytes, {} values of type {} need {}",
            bytes.len(), count, get_field_type_name(field_type), needed)));
    }

    let values = bytes.chunks_exact(size)
        .take(count)
        .map(|chunk| match field_type {
            field_types::SHORT | field_types::SSHORT => Ok(handler.decode_u16(chunk) as u64),
            field_types::LONG | field_types::SLONG => Ok(handler.decode_u32(chunk) as u64),
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => Ok(handler.decode_u64(chunk)),
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => Ok(chunk[0] as u64),
            _ => Err(RasterError::UnsupportedFieldType(field_type)),
        })
        .collect::<RasterResult<Vec<u64>>>()?;

    Ok(values)
}

/// Determines if a tag's value is stored inline or at an offset
///
/// # Arguments
/// * `entry` - The IFD entry to check
/// * `is_big_tiff` - Whether the file is BigTIFF format
///
/// # Returns
/// true if the value is stored inline, false if it's at an offset.
/// Fails when the entry's total size overflows.
pub fn is_value_inline(entry: &IFDEntry, is_big_tiff: bool) -> RasterResult<bool> {
    let total_size = entry.data_size()?;

    if is_big_tiff {
        Ok(total_size <= 8)
    } else {
        Ok(total_size <= 4)
    }
}

/// Encodes values little-endian as `field_type`
pub fn encode_tag_values(values: &[u64], field_type: u16) -> Vec<u8> {
    let size = field_type_size(field_type).unwrap_or(1);
    let mut data = Vec::with_capacity(values.len() * size);
    for &value in values {
        match size {
            1 => data.push(value as u8),
            2 => data.extend_from_slice(&(value as u16).to_le_bytes()),
            4 => data.extend_from_slice(&(value as u32).to_le_bytes()),
            _ => data.extend_from_slice(&value.to_le_bytes()),
        }
    }
    data
}

/// Get the name of a TIFF tag
///
/// Returns a human-readable name for a tag based on its numeric ID.
/// If the tag is not recognized, returns "Unknown".
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        tags::NEW_SUBFILE_TYPE => "NewSubfileType",
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",
        tags::PLANAR_CONFIGURATION => "PlanarConfiguration",
        tags::PREDICTOR => "Predictor",
        tags::TILE_WIDTH => "TileWidth",
        tags::TILE_LENGTH => "TileLength",
        tags::TILE_OFFSETS => "TileOffsets",
        tags::TILE_BYTE_COUNTS => "TileByteCounts",
        tags::EXTRA_SAMPLES => "ExtraSamples",
        tags::SAMPLE_FORMAT => "SampleFormat",
        _ => "Unknown",
    }
}

/// Get the name of a TIFF field type
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}

/// Get the name of a compression method
pub fn get_compression_name(compression_code: u64) -> &'static str {
    match compression_code as u16 {
        compression::NONE => "None",
        compression::LZW => "LZW",
        compression::JPEG => "JPEG",
        compression::ADOBE_DEFLATE => "Adobe Deflate",
        compression::ZSTD => "Zstandard",
        compression::PACKBITS => "PackBits",
        compression::DEFLATE => "Deflate",
        _ => "Unknown",
    }
}
