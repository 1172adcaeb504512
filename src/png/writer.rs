//! Write handle for PNG images
//!
//! The file is created when the handle is, so an unwritable path fails
//! early. Rows are gathered into one interleaved buffer and encoded when the
//! handle is closed; rows never written stay zero.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use log::{debug, info, warn};

use crate::codec::{check_window, convert_samples, CodecType, CreateSpec, CreationOptions, RasterHandle};
use crate::errors::{RasterError, RasterResult};

/// Color type for a band count and sample type
fn color_type_for(band_count: usize, data_type: CodecType) -> Option<ExtendedColorType> {
    match (data_type, band_count) {
        (CodecType::Byte, 1) => Some(ExtendedColorType::L8),
        (CodecType::Byte, 2) => Some(ExtendedColorType::La8),
        (CodecType::Byte, 3) => Some(ExtendedColorType::Rgb8),
        (CodecType::Byte, 4) => Some(ExtendedColorType::Rgba8),
        (CodecType::UInt16, 1) => Some(ExtendedColorType::L16),
        (CodecType::UInt16, 2) => Some(ExtendedColorType::La16),
        (CodecType::UInt16, 3) => Some(ExtendedColorType::Rgb16),
        (CodecType::UInt16, 4) => Some(ExtendedColorType::Rgba16),
        _ => None,
    }
}

/// A PNG image being written
pub struct PngWriter {
    path: PathBuf,
    file: Option<File>,
    spec: CreateSpec,
    color_type: ExtendedColorType,
    /// Interleaved samples in native byte order, as the encoder expects
    pixels: Vec<u8>,
    /// One row converted to the file's sample type
    encode_buffer: Vec<u8>,
}

impl PngWriter {
    pub fn create(path: &Path, spec: &CreateSpec, options: &CreationOptions) -> RasterResult<Self> {
        let color_type = color_type_for(spec.band_count, spec.data_type).ok_or_else(|| {
            RasterError::UnsupportedDataType(spec.data_type, format!("PNG create with {} bands", spec.band_count))
        })?;
        if u32::try_from(spec.width).is_err() || u32::try_from(spec.height).is_err() {
            return Err(RasterError::InvalidDimensions(format!(
                "{}x{} exceeds PNG limits", spec.width, spec.height)));
        }

        for (key, _) in options.iter() {
            warn!("PNG driver ignores creation option {}", key);
        }

        let sample_size = spec.data_type.size_in_bytes();
        let total = spec.width
            .checked_mul(spec.height)
            .and_then(|n| n.checked_mul(spec.band_count * sample_size))
            .ok_or(RasterError::AllocationFailed(usize::MAX))?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(total).map_err(|_| RasterError::AllocationFailed(total))?;
        pixels.resize(total, 0);

        let file = File::create(path)?;
        info!("Creating {} ({}x{}x{} {})", path.display(), spec.width, spec.height, spec.band_count, spec.data_type);

        Ok(PngWriter {
            path: path.to_path_buf(),
            file: Some(file),
            spec: *spec,
            color_type,
            pixels,
            encode_buffer: vec![0u8; spec.width * sample_size],
        })
    }

    /// Interleaves the row in `encode_buffer` into band `band` of `row`
    fn store_row(&mut self, band: usize, row: usize) {
        let sample_size = self.spec.data_type.size_in_bytes();
        let pixel_size = self.spec.band_count * sample_size;
        let row_start = row * self.spec.width * pixel_size;

        for x in 0..self.spec.width {
            let src = &self.encode_buffer[x * sample_size..(x + 1) * sample_size];
            let dst = row_start + x * pixel_size + (band - 1) * sample_size;
            match sample_size {
                2 => {
                    let value = u16::from_le_bytes([src[0], src[1]]);
                    self.pixels[dst..dst + 2].copy_from_slice(&value.to_ne_bytes());
                }
                _ => self.pixels[dst] = src[0],
            }
        }
    }
}

impl RasterHandle for PngWriter {
    fn width(&self) -> usize {
        self.spec.width
    }

    fn height(&self) -> usize {
        self.spec.height
    }

    fn band_count(&self) -> usize {
        self.spec.band_count
    }

    fn band_type(&self, band: usize) -> RasterResult<CodecType> {
        if band < 1 || band > self.spec.band_count {
            return Err(RasterError::RowOutOfRange(format!(
                "band {} outside 1..={}", band, self.spec.band_count)));
        }
        Ok(self.spec.data_type)
    }

    fn read_rows(
        &mut self,
        _band: usize,
        _first_row: usize,
        _row_count: usize,
        _target: CodecType,
        _out: &mut [u8]
    ) -> RasterResult<()> {
        Err(RasterError::GenericError("PNG opened for writing cannot be read".to_string()))
    }

    fn write_rows(
        &mut self,
        band: usize,
        first_row: usize,
        row_count: usize,
        source: CodecType,
        data: &[u8]
    ) -> RasterResult<()> {
        check_window(self.spec.width, self.spec.height, self.spec.band_count,
                     band, first_row, row_count, source, data.len())?;

        let row_bytes = self.spec.width * source.size_in_bytes();
        for (i, row) in data.chunks_exact(row_bytes).enumerate() {
            convert_samples(row, source, &mut self.encode_buffer, self.spec.data_type, self.spec.width)?;
            self.store_row(band, first_row + i);
        }
        Ok(())
    }

    fn close(mut self: Box<Self>) -> RasterResult<()> {
        let file = self.file.take()
            .ok_or_else(|| RasterError::GenericError("PNG writer already closed".to_string()))?;

        debug!("Encoding {} bytes of pixels into {}", self.pixels.len(), self.path.display());
        let encoder = PngEncoder::new(BufWriter::new(file));
        encoder.write_image(&self.pixels, self.spec.width as u32, self.spec.height as u32, self.color_type)?;

        info!("Wrote {}", self.path.display());
        Ok(())
    }
}
