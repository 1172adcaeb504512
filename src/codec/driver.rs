//! Driver and image handle traits
//!
//! A [`RasterDriver`] is a format backend registered by short name. Opening or
//! creating an image through it yields a [`RasterHandle`], which lives for the
//! duration of a single transfer and moves pixel data one band and a block of
//! rows at a time.

use std::path::Path;

use crate::codec::{CodecType, CreationOptions};
use crate::errors::{RasterError, RasterResult};

/// Shape and sample type of an image to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateSpec {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub data_type: CodecType,
}

/// Strategy trait for raster format backends
pub trait RasterDriver: Send + Sync {
    /// Short name used to select the driver for creation, e.g. `GTiff`
    fn short_name(&self) -> &'static str;

    /// Human-readable format name
    fn long_name(&self) -> &'static str;

    /// Whether this driver recognizes the file at `path`
    fn identify(&self, path: &Path) -> bool;

    /// Opens an existing image read-only
    fn open(&self, path: &Path) -> RasterResult<Box<dyn RasterHandle>>;

    /// Creates a new image for writing
    fn create(&self, path: &Path, spec: &CreateSpec, options: &CreationOptions) -> RasterResult<Box<dyn RasterHandle>>;
}

/// An open image, used by exactly one transfer
///
/// Band indices are 1-based. Row data crosses this boundary as little-endian
/// samples of the requested codec type, `width` samples per row.
pub trait RasterHandle {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn band_count(&self) -> usize;

    /// On-disk sample type of `band`
    fn band_type(&self, band: usize) -> RasterResult<CodecType>;

    /// Reads `row_count` rows of `band` starting at `first_row`, converted to `target`
    fn read_rows(
        &mut self,
        band: usize,
        first_row: usize,
        row_count: usize,
        target: CodecType,
        out: &mut [u8]
    ) -> RasterResult<()>;

    /// Writes `row_count` rows of `band` starting at `first_row` from `source` samples
    fn write_rows(
        &mut self,
        band: usize,
        first_row: usize,
        row_count: usize,
        source: CodecType,
        data: &[u8]
    ) -> RasterResult<()>;

    /// Flushes pending data and releases the handle
    fn close(self: Box<Self>) -> RasterResult<()>;
}

/// Checks a band/row window and the size of its data buffer
///
/// Shared by every driver so that all handles reject the same inputs.
pub fn check_window(
    width: usize,
    height: usize,
    band_count: usize,
    band: usize,
    first_row: usize,
    row_count: usize,
    data_type: CodecType,
    data_len: usize
) -> RasterResult<()> {
    if band < 1 || band > band_count {
        return Err(RasterError::RowOutOfRange(format!(
            "band {} outside 1..={}", band, band_count)));
    }

    let end_row = first_row.checked_add(row_count)
        .ok_or_else(|| RasterError::RowOutOfRange("row window overflows".to_string()))?;
    if row_count == 0 || end_row > height {
        return Err(RasterError::RowOutOfRange(format!(
            "rows {}..{} outside image height {}", first_row, end_row, height)));
    }

    let expected = width * row_count * data_type.size_in_bytes();
    if expected == 0 {
        return Err(RasterError::UnsupportedDataType(data_type, "row transfer".to_string()));
    }
    if data_len != expected {
        return Err(RasterError::RowOutOfRange(format!(
            "row buffer holds {} bytes, expected {}", data_len, expected)));
    }

    Ok(())
}
