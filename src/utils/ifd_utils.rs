//! IFD utilities
//!
//! Utilities for working with Image File Directories (IFDs) in TIFF files.

use log::debug;
use crate::errors::RasterResult;
use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;

/// Reads an IFD offset: the first one in the header or the link after a directory
///
/// # Arguments
/// * `reader` - The seekable reader to use
/// * `is_big_tiff` - Whether the file is in BigTIFF format
/// * `byte_order_handler` - Handler for the file's byte order
pub fn read_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> RasterResult<u64> {
    if is_big_tiff {
        Ok(byte_order_handler.read_u64(reader)?)
    } else {
        Ok(byte_order_handler.read_u32(reader)? as u64)
    }
}

/// Calculates the size of an IFD in bytes
///
/// Used to find the next-IFD link and to lay out directories when writing.
pub fn calculate_ifd_size(entry_count: usize, is_big_tiff: bool) -> u64 {
    let entries = entry_count as u64;
    if is_big_tiff {
        // 8 (entry count) + 20 (each entry) + 8 (next IFD offset)
        8 + (20 * entries) + 8
    } else {
        // 2 (entry count) + 12 (each entry) + 4 (next IFD offset)
        2 + (12 * entries) + 4
    }
}

/// Size of the value/offset field of an entry
pub fn value_field_size(is_big_tiff: bool) -> usize {
    if is_big_tiff { 8 } else { 4 }
}

/// Logs the layout of a directory being read
pub fn log_ifd_position(number: usize, offset: u64, entry_count: u64) {
    debug!("IFD #{} at offset {} holds {} entries", number, offset, entry_count);
}
