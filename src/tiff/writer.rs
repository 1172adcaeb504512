//! Write handle for TIFF images
//!
//! The file is created and its header written as soon as the handle exists.
//! Each row of each band arrives as its own strip and is appended right away,
//! so nothing larger than one encoded row is held in memory. Closing the
//! handle fills rows that were never written with zeros, writes the directory
//! at the end of the file and patches the header to point at it.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::codec::{check_window, convert_samples, CodecType, CreateSpec, CreationOptions, RasterHandle};
use crate::compression::{CompressionFactory, CompressionHandler};
use crate::errors::{RasterError, RasterResult};
use crate::tiff::builder::DirectoryBuilder;
use crate::tiff::constants::{header, predictor};
use crate::tiff::predictor as horizontal;
use crate::utils::write_utils;

/// Classic TIFF is kept while the raw pixel data stays below this size
const BIGTIFF_THRESHOLD: u64 = 4_000_000_000;

/// Options recognized by the GTiff driver
const KNOWN_OPTIONS: [&str; 4] = ["COMPRESS", "ZSTD_LEVEL", "BIGTIFF", "PREDICTOR"];

/// Creation settings parsed from driver options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiffCreateSettings {
    pub compression: String,
    pub zstd_level: Option<i32>,
    pub is_big_tiff: bool,
    pub predictor: u16,
}

impl TiffCreateSettings {
    /// Interprets `COMPRESS`, `ZSTD_LEVEL`, `BIGTIFF` and `PREDICTOR`
    pub fn from_options(spec: &CreateSpec, options: &CreationOptions) -> RasterResult<Self> {
        for (key, _) in options.iter() {
            if !KNOWN_OPTIONS.contains(&key) {
                warn!("GTiff driver ignores unknown creation option {}", key);
            }
        }

        let compression = options.get("COMPRESS").unwrap_or("NONE").to_string();

        let zstd_level = options.get("ZSTD_LEVEL")
            .map(|v| v.parse::<i32>()
                .map_err(|_| RasterError::Config(format!("ZSTD_LEVEL must be an integer, got '{}'", v))))
            .transpose()?;

        let raw_size = (spec.width as u64)
            .saturating_mul(spec.height as u64)
            .saturating_mul(spec.band_count as u64)
            .saturating_mul(spec.data_type.size_in_bytes() as u64);
        let is_big_tiff = match options.get("BIGTIFF").map(|v| v.to_ascii_uppercase()) {
            None => raw_size > BIGTIFF_THRESHOLD,
            Some(v) if v == "IF_NEEDED" || v == "IF_SAFER" => raw_size > BIGTIFF_THRESHOLD,
            Some(v) if v == "YES" || v == "TRUE" => true,
            Some(v) if v == "NO" || v == "FALSE" => false,
            Some(v) => return Err(RasterError::Config(format!("Invalid BIGTIFF value '{}'", v))),
        };

        let predictor = match options.get("PREDICTOR") {
            None | Some("1") => predictor::NONE,
            Some("2") if !spec.data_type.is_float() => predictor::HORIZONTAL_DIFFERENCING,
            Some(v) => return Err(RasterError::Config(format!(
                "PREDICTOR={} is not supported for {} data", v, spec.data_type))),
        };

        Ok(TiffCreateSettings { compression, zstd_level, is_big_tiff, predictor })
    }
}

/// A TIFF image being written
pub struct TiffWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    spec: CreateSpec,
    settings: TiffCreateSettings,
    compressor: Box<dyn CompressionHandler>,
    /// End of the data written so far
    position: u64,
    /// Strip offsets indexed by (band - 1) * height + row; 0 means not written
    strip_offsets: Vec<u64>,
    strip_byte_counts: Vec<u64>,
    /// One row converted to the file's sample type
    encode_buffer: Vec<u8>,
}

impl TiffWriter {
    /// Creates the file and writes a header placeholder
    pub fn create(path: &Path, spec: &CreateSpec, options: &CreationOptions) -> RasterResult<Self> {
        if spec.data_type == CodecType::Unknown {
            return Err(RasterError::UnsupportedDataType(spec.data_type, "GTiff create".to_string()));
        }

        let settings = TiffCreateSettings::from_options(spec, options)?;
        let compressor = CompressionFactory::get_handler_by_name(&settings.compression, settings.zstd_level)?;

        let file = File::create(path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        let position = Self::write_header(&mut writer, settings.is_big_tiff)?;

        let strips = spec.band_count * spec.height;
        info!("Creating {} ({}x{}x{} {}, {} compression{})",
              path.display(), spec.width, spec.height, spec.band_count, spec.data_type,
              compressor.name(), if settings.is_big_tiff { ", BigTIFF" } else { "" });

        Ok(TiffWriter {
            path: path.to_path_buf(),
            writer,
            spec: *spec,
            settings,
            compressor,
            position,
            strip_offsets: vec![0; strips],
            strip_byte_counts: vec![0; strips],
            encode_buffer: vec![0; spec.width * spec.data_type.size_in_bytes()],
        })
    }

    /// Writes the header with a zero first-IFD offset and returns its length
    fn write_header(writer: &mut impl Write, is_big_tiff: bool) -> RasterResult<u64> {
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;

        if is_big_tiff {
            writer.write_all(&header::BIG_TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&header::BIGTIFF_OFFSET_SIZE.to_le_bytes())?;
            writer.write_all(&[0u8, 0])?;  // Reserved
            writer.write_all(&[0u8; 8])?;  // First IFD offset, patched at close
            Ok(header::BIG_TIFF_HEADER_SIZE)
        } else {
            writer.write_all(&header::TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&[0u8; 4])?;  // First IFD offset, patched at close
            Ok(header::TIFF_HEADER_SIZE)
        }
    }

    /// Encodes the row in `encode_buffer` and appends it as a strip
    fn append_strip(&mut self) -> RasterResult<(u64, u64)> {
        if self.settings.predictor == predictor::HORIZONTAL_DIFFERENCING {
            let stride = if self.spec.data_type.is_complex() { 2 } else { 1 };
            horizontal::apply_horizontal(&mut self.encode_buffer, self.spec.width * stride, stride,
                                         self.spec.data_type.component_size())?;
        }

        let encoded = self.compressor.compress(&self.encode_buffer)?;
        let offset = self.position;
        if !self.settings.is_big_tiff && offset + encoded.len() as u64 > u32::MAX as u64 {
            return Err(RasterError::GenericError(
                "Image exceeds classic TIFF limits; create with BIGTIFF=YES".to_string()));
        }

        self.writer.write_all(&encoded)?;
        self.position += encoded.len() as u64;
        Ok((offset, encoded.len() as u64))
    }

    /// Points every strip that was never written at one shared zero strip
    fn fill_missing_strips(&mut self) -> RasterResult<()> {
        let missing = self.strip_byte_counts.iter().filter(|&&count| count == 0).count();
        if missing == 0 {
            return Ok(());
        }

        debug!("Filling {} unwritten rows of {} with zeros", missing, self.path.display());
        self.encode_buffer.iter_mut().for_each(|b| *b = 0);
        let (offset, count) = self.append_strip()?;
        for (o, c) in self.strip_offsets.iter_mut().zip(self.strip_byte_counts.iter_mut()) {
            if *c == 0 {
                *o = offset;
                *c = count;
            }
        }
        Ok(())
    }

    /// Writes the directory and patches the header
    fn finish(&mut self) -> RasterResult<()> {
        self.fill_missing_strips()?;

        let padding = write_utils::calculate_padding((self.position % 4) as usize);
        self.writer.write_all(&[0u8; 4][..padding])?;
        let ifd_offset = self.position + padding as u64;

        let mut builder = DirectoryBuilder::new(self.settings.is_big_tiff);
        builder.add_image_structure(self.spec.width, self.spec.height, self.spec.band_count,
                                    self.spec.data_type, self.compressor.code(), self.settings.predictor)?;
        builder.add_strips(&self.strip_offsets, &self.strip_byte_counts);
        let end = builder.write(&mut self.writer, ifd_offset)?;
        self.position = end;

        let first_ifd_position = if self.settings.is_big_tiff { 8 } else { 4 };
        self.writer.seek(SeekFrom::Start(first_ifd_position))?;
        write_utils::write_offset(&mut self.writer, ifd_offset, self.settings.is_big_tiff)?;
        self.writer.flush()?;

        info!("Wrote {} ({} bytes, directory at {})", self.path.display(), end, ifd_offset);
        Ok(())
    }
}

impl RasterHandle for TiffWriter {
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
        Err(RasterError::GenericError("TIFF opened for writing cannot be read".to_string()))
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

        let width = self.spec.width;
        let row_bytes = width * source.size_in_bytes();
        for (i, row) in data.chunks_exact(row_bytes).enumerate() {
            convert_samples(row, source, &mut self.encode_buffer, self.spec.data_type, width)?;
            let (offset, count) = self.append_strip()?;

            let index = (band - 1) * self.spec.height + first_row + i;
            self.strip_offsets[index] = offset;
            self.strip_byte_counts[index] = count;
        }

        Ok(())
    }

    fn close(mut self: Box<Self>) -> RasterResult<()> {
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(data_type: CodecType) -> CreateSpec {
        CreateSpec { width: 10, height: 10, band_count: 1, data_type }
    }

    #[test]
    fn test_default_settings_are_uncompressed_classic_tiff() {
        let settings = TiffCreateSettings::from_options(&spec(CodecType::Byte), &CreationOptions::new()).unwrap();
        assert_eq!(settings.compression, "NONE");
        assert!(!settings.is_big_tiff);
        assert_eq!(settings.predictor, predictor::NONE);
    }

    #[test]
    fn test_options_are_parsed() {
        let options = CreationOptions::from_pairs(&["COMPRESS=ZSTD", "ZSTD_LEVEL=9", "BIGTIFF=YES", "PREDICTOR=2"]).unwrap();
        let settings = TiffCreateSettings::from_options(&spec(CodecType::UInt16), &options).unwrap();
        assert_eq!(settings.zstd_level, Some(9));
        assert!(settings.is_big_tiff);
        assert_eq!(settings.predictor, predictor::HORIZONTAL_DIFFERENCING);
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let bad_level = CreationOptions::from_pairs(&["ZSTD_LEVEL=high"]).unwrap();
        assert!(TiffCreateSettings::from_options(&spec(CodecType::Byte), &bad_level).is_err());

        let float_predictor = CreationOptions::from_pairs(&["PREDICTOR=2"]).unwrap();
        assert!(TiffCreateSettings::from_options(&spec(CodecType::Float32), &float_predictor).is_err());

        let bad_bigtiff = CreationOptions::from_pairs(&["BIGTIFF=maybe"]).unwrap();
        assert!(TiffCreateSettings::from_options(&spec(CodecType::Byte), &bad_bigtiff).is_err());
    }
}
