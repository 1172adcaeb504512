//! TIFF writing utilities
//!
//! Helper functions for writing TIFF files to disk, handling alignment
//! and the little-endian encoding of offsets.

use std::io::Write;

use crate::errors::{RasterError, RasterResult};

/// Align an offset to a 4-byte boundary
pub fn align_to_4_bytes(offset: u64) -> u64 {
    let remainder = offset % 4;
    if remainder == 0 {
        offset
    } else {
        offset + (4 - remainder)
    }
}

/// Calculate padding required to align to 4-byte boundary
pub fn calculate_padding(data_len: usize) -> usize {
    (4 - (data_len % 4)) % 4
}

/// Write padding bytes to align to 4-byte boundary
pub fn write_padding(writer: &mut impl Write, data_len: usize) -> RasterResult<()> {
    let padding = calculate_padding(data_len);
    if padding > 0 {
        writer.write_all(&[0u8; 4][..padding])?;
    }
    Ok(())
}

/// Writes an offset or count in the width the file format uses
///
/// Classic TIFF stores 32-bit offsets; a value that does not fit means the
/// file needs BigTIFF.
pub fn write_offset(writer: &mut impl Write, value: u64, is_big_tiff: bool) -> RasterResult<()> {
    if is_big_tiff {
        writer.write_all(&value.to_le_bytes())?;
    } else {
        let narrow = u32::try_from(value).map_err(|_| RasterError::GenericError(format!(
            "Offset {} exceeds classic TIFF limits; create with BIGTIFF=YES", value)))?;
        writer.write_all(&narrow.to_le_bytes())?;
    }
    Ok(())
}
