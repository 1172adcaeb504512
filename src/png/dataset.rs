//! Read handle for PNG images
//!
//! PNG has no random row access, so the whole image is decoded at open and
//! kept as interleaved little-endian samples.

use std::path::Path;

use image::{DynamicImage, ImageReader};
use log::debug;

use crate::codec::{check_window, convert_samples, CodecType, RasterHandle};
use crate::errors::{RasterError, RasterResult};

/// A decoded PNG image
pub struct PngDataset {
    width: usize,
    height: usize,
    channels: usize,
    data_type: CodecType,
    /// Interleaved samples, `channels` per pixel
    pixels: Vec<u8>,
    /// One row of one band, de-interleaved
    row_buffer: Vec<u8>,
}

fn le_bytes_u16(samples: Vec<u16>) -> Vec<u8> {
    samples.into_iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn le_bytes_f32(samples: Vec<f32>) -> Vec<u8> {
    samples.into_iter().flat_map(|v| v.to_le_bytes()).collect()
}

impl PngDataset {
    /// Decodes the image at `path`
    pub fn open(path: &Path) -> RasterResult<Self> {
        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        let width = image.width() as usize;
        let height = image.height() as usize;

        let (data_type, channels, pixels) = match image {
            DynamicImage::ImageLuma8(buf) => (CodecType::Byte, 1, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (CodecType::Byte, 2, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (CodecType::Byte, 3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (CodecType::Byte, 4, buf.into_raw()),
            DynamicImage::ImageLuma16(buf) => (CodecType::UInt16, 1, le_bytes_u16(buf.into_raw())),
            DynamicImage::ImageLumaA16(buf) => (CodecType::UInt16, 2, le_bytes_u16(buf.into_raw())),
            DynamicImage::ImageRgb16(buf) => (CodecType::UInt16, 3, le_bytes_u16(buf.into_raw())),
            DynamicImage::ImageRgba16(buf) => (CodecType::UInt16, 4, le_bytes_u16(buf.into_raw())),
            DynamicImage::ImageRgb32F(buf) => (CodecType::Float32, 3, le_bytes_f32(buf.into_raw())),
            DynamicImage::ImageRgba32F(buf) => (CodecType::Float32, 4, le_bytes_f32(buf.into_raw())),
            other => return Err(RasterError::GenericError(format!(
                "Unsupported PNG color type {:?}", other.color()))),
        };

        debug!("Decoded {} ({}x{}, {} channels of {})", path.display(), width, height, channels, data_type);

        Ok(PngDataset {
            width,
            height,
            channels,
            data_type,
            pixels,
            row_buffer: vec![0u8; width * data_type.size_in_bytes()],
        })
    }

    /// Copies one band of one row out of the interleaved pixels
    fn load_row(&mut self, band: usize, row: usize) {
        let sample_size = self.data_type.size_in_bytes();
        let pixel_size = self.channels * sample_size;
        let row_start = row * self.width * pixel_size;

        for x in 0..self.width {
            let src = row_start + x * pixel_size + (band - 1) * sample_size;
            let dst = x * sample_size;
            self.row_buffer[dst..dst + sample_size].copy_from_slice(&self.pixels[src..src + sample_size]);
        }
    }
}

impl RasterHandle for PngDataset {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn band_count(&self) -> usize {
        self.channels
    }

    fn band_type(&self, band: usize) -> RasterResult<CodecType> {
        if band < 1 || band > self.channels {
            return Err(RasterError::RowOutOfRange(format!("band {} outside 1..={}", band, self.channels)));
        }
        Ok(self.data_type)
    }

    fn read_rows(
        &mut self,
        band: usize,
        first_row: usize,
        row_count: usize,
        target: CodecType,
        out: &mut [u8]
    ) -> RasterResult<()> {
        check_window(self.width, self.height, self.channels, band, first_row, row_count, target, out.len())?;

        let row_bytes = self.width * target.size_in_bytes();
        for (i, chunk) in out.chunks_exact_mut(row_bytes).enumerate() {
            self.load_row(band, first_row + i);
            convert_samples(&self.row_buffer, self.data_type, chunk, target, self.width)?;
        }
        Ok(())
    }

    fn write_rows(
        &mut self,
        _band: usize,
        _first_row: usize,
        _row_count: usize,
        _source: CodecType,
        _data: &[u8]
    ) -> RasterResult<()> {
        Err(RasterError::GenericError("PNG opened read-only".to_string()))
    }

    fn close(self: Box<Self>) -> RasterResult<()> {
        Ok(())
    }
}
