//! Raster layout of a TIFF directory
//!
//! Turns the tags of the first IFD into the geometry the read handle needs:
//! sample type, block size (strip or tile), plane arrangement and the
//! offset/byte-count tables of every block.

use log::debug;

use crate::codec::CodecType;
use crate::errors::{RasterError, RasterResult};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{compression, planar_config, predictor, sample_format, tags};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// Maps TIFF SampleFormat and BitsPerSample to a codec type
///
/// Complex formats count the bits of the whole complex value.
pub fn codec_type_for(format: u16, bits: u16) -> Option<CodecType> {
    match (format, bits) {
        (sample_format::UNSIGNED, 8) => Some(CodecType::Byte),
        (sample_format::UNSIGNED, 16) => Some(CodecType::UInt16),
        (sample_format::UNSIGNED, 32) => Some(CodecType::UInt32),
        (sample_format::SIGNED, 16) => Some(CodecType::Int16),
        (sample_format::SIGNED, 32) => Some(CodecType::Int32),
        (sample_format::IEEEFP, 32) => Some(CodecType::Float32),
        (sample_format::IEEEFP, 64) => Some(CodecType::Float64),
        (sample_format::COMPLEX_INT, 32) => Some(CodecType::CInt16),
        (sample_format::COMPLEX_INT, 64) => Some(CodecType::CInt32),
        (sample_format::COMPLEX_IEEEFP, 64) => Some(CodecType::CFloat32),
        (sample_format::COMPLEX_IEEEFP, 128) => Some(CodecType::CFloat64),
        _ => None,
    }
}

/// Inverse of [`codec_type_for`]: (SampleFormat, BitsPerSample)
pub fn sample_format_for(data_type: CodecType) -> Option<(u16, u16)> {
    let format = match data_type {
        CodecType::Byte | CodecType::UInt16 | CodecType::UInt32 => sample_format::UNSIGNED,
        CodecType::Int16 | CodecType::Int32 => sample_format::SIGNED,
        CodecType::Float32 | CodecType::Float64 => sample_format::IEEEFP,
        CodecType::CInt16 | CodecType::CInt32 => sample_format::COMPLEX_INT,
        CodecType::CFloat32 | CodecType::CFloat64 => sample_format::COMPLEX_IEEEFP,
        CodecType::Unknown => return None,
    };
    Some((format, (data_type.size_in_bytes() * 8) as u16))
}

/// Geometry of the raster in the first IFD
#[derive(Debug, Clone)]
pub struct ImageLayout {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: usize,
    pub data_type: CodecType,
    pub compression: u64,
    pub predictor: u16,
    pub planar: u16,
    pub tiled: bool,
    pub block_width: usize,
    pub block_height: usize,
    pub offsets: Vec<u64>,
    pub byte_counts: Vec<u64>,
}

/// Reads a tag that must hold the same value for every sample
fn uniform_tag(
    tiff: &TiffReader,
    reader: &mut dyn SeekableReader,
    ifd: &IFD,
    tag: u16,
    default: u64,
    name: &str
) -> RasterResult<u64> {
    if !ifd.has_tag(tag) {
        return Ok(default);
    }
    let values = tiff.read_tag_values(reader, ifd, tag)?;
    let first = values.first().copied().unwrap_or(default);
    if values.iter().any(|&v| v != first) {
        return Err(RasterError::GenericError(format!(
            "Mixed {} values across samples are not supported: {:?}", name, values)));
    }
    Ok(first)
}

impl ImageLayout {
    /// Derives the layout from an IFD
    pub fn from_ifd(tiff: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> RasterResult<Self> {
        if !ifd.has_tag(tags::IMAGE_WIDTH) || !ifd.has_tag(tags::IMAGE_LENGTH) {
            return Err(RasterError::MissingDimensions);
        }
        let width = tiff.read_tag_or(reader, ifd, tags::IMAGE_WIDTH, 0)? as usize;
        let height = tiff.read_tag_or(reader, ifd, tags::IMAGE_LENGTH, 0)? as usize;
        if width == 0 || height == 0 {
            return Err(RasterError::MissingDimensions);
        }

        let samples_per_pixel = tiff.read_tag_or(reader, ifd, tags::SAMPLES_PER_PIXEL, 1)? as usize;
        if samples_per_pixel == 0 {
            return Err(RasterError::GenericError("SamplesPerPixel is 0".to_string()));
        }

        let bits = uniform_tag(tiff, reader, ifd, tags::BITS_PER_SAMPLE, 1, "BitsPerSample")? as u16;
        let format = uniform_tag(tiff, reader, ifd, tags::SAMPLE_FORMAT, sample_format::UNSIGNED as u64, "SampleFormat")? as u16;
        let data_type = codec_type_for(format, bits).ok_or_else(|| RasterError::GenericError(format!(
            "Unsupported sample layout: SampleFormat {} with {} bits per sample", format, bits)))?;

        let compression_code = tiff.read_tag_or(reader, ifd, tags::COMPRESSION, compression::NONE as u64)?;
        let predictor_code = tiff.read_tag_or(reader, ifd, tags::PREDICTOR, predictor::NONE as u64)? as u16;
        match predictor_code {
            predictor::NONE => {},
            predictor::HORIZONTAL_DIFFERENCING if !data_type.is_float() => {},
            other => return Err(RasterError::GenericError(format!(
                "Predictor {} is not supported for {} data", other, data_type))),
        }

        let planar = tiff.read_tag_or(reader, ifd, tags::PLANAR_CONFIGURATION, planar_config::CHUNKY as u64)? as u16;
        if planar != planar_config::CHUNKY && planar != planar_config::PLANAR {
            return Err(RasterError::GenericError(format!("Invalid PlanarConfiguration {}", planar)));
        }

        let tiled = ifd.has_tag(tags::TILE_WIDTH) && ifd.has_tag(tags::TILE_LENGTH);
        let (block_width, block_height, offset_tag, count_tag) = if tiled {
            (
                tiff.read_tag_or(reader, ifd, tags::TILE_WIDTH, 0)? as usize,
                tiff.read_tag_or(reader, ifd, tags::TILE_LENGTH, 0)? as usize,
                tags::TILE_OFFSETS,
                tags::TILE_BYTE_COUNTS,
            )
        } else {
            let rows_per_strip = tiff.read_tag_or(reader, ifd, tags::ROWS_PER_STRIP, height as u64)?;
            (width, (rows_per_strip as usize).clamp(1, height), tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
        };
        if block_width == 0 || block_height == 0 {
            return Err(RasterError::GenericError("Tile dimensions must be positive".to_string()));
        }

        let offsets = tiff.read_tag_values(reader, ifd, offset_tag)?;

        let mut layout = ImageLayout {
            width,
            height,
            samples_per_pixel,
            data_type,
            compression: compression_code,
            predictor: predictor_code,
            planar,
            tiled,
            block_width,
            block_height,
            offsets,
            byte_counts: Vec::new(),
        };

        layout.byte_counts = if ifd.has_tag(count_tag) {
            tiff.read_tag_values(reader, ifd, count_tag)?
        } else if compression_code == compression::NONE as u64 {
            vec![layout.block_bytes() as u64; layout.offsets.len()]
        } else {
            return Err(RasterError::TagNotFound(count_tag));
        };

        let expected = layout.block_count();
        if layout.offsets.len() < expected || layout.byte_counts.len() < expected {
            return Err(RasterError::GenericError(format!(
                "Expected {} blocks, found {} offsets and {} byte counts",
                expected, layout.offsets.len(), layout.byte_counts.len())));
        }

        debug!("TIFF layout: {}x{}x{} {}, {} {}x{} blocks, compression {}, predictor {}, planar {}",
               width, height, samples_per_pixel, data_type, if tiled { "tiled" } else { "stripped" },
               block_width, block_height, compression_code, predictor_code, planar);

        Ok(layout)
    }

    pub fn blocks_across(&self) -> usize {
        self.width.div_ceil(self.block_width)
    }

    pub fn blocks_down(&self) -> usize {
        self.height.div_ceil(self.block_height)
    }

    /// Number of separately stored planes
    pub fn planes(&self) -> usize {
        if self.planar == planar_config::PLANAR { self.samples_per_pixel } else { 1 }
    }

    /// Samples stored per pixel inside one block
    pub fn samples_in_block(&self) -> usize {
        if self.planar == planar_config::PLANAR { 1 } else { self.samples_per_pixel }
    }

    pub fn block_count(&self) -> usize {
        self.blocks_across() * self.blocks_down() * self.planes()
    }

    /// Uncompressed size of one full block
    pub fn block_bytes(&self) -> usize {
        self.block_width * self.block_height * self.samples_in_block() * self.data_type.size_in_bytes()
    }

    /// Index into the offset tables
    pub fn block_index(&self, plane: usize, block_row: usize, block_col: usize) -> usize {
        plane * self.blocks_across() * self.blocks_down() + block_row * self.blocks_across() + block_col
    }

    /// Plane holding a 1-based band
    pub fn plane_for_band(&self, band: usize) -> usize {
        if self.planar == planar_config::PLANAR { band - 1 } else { 0 }
    }

    /// Position of a 1-based band within a stored pixel
    pub fn sample_for_band(&self, band: usize) -> usize {
        if self.planar == planar_config::PLANAR { 0 } else { band - 1 }
    }

    /// Components per stored pixel, counting real and imaginary parts separately
    pub fn components_per_pixel(&self) -> usize {
        let per_sample = if self.data_type.is_complex() { 2 } else { 1 };
        self.samples_in_block() * per_sample
    }
}
