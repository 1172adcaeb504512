//! TIFF directory construction
//!
//! Collects the tag entries of the single directory a created image carries,
//! keeps values too large for the entry's value field as external data, and
//! serializes both in little-endian order.

use std::collections::BTreeMap;
use std::io::Write;

use log::debug;

use crate::codec::CodecType;
use crate::errors::{RasterError, RasterResult};
use crate::tiff::constants::{extra_samples, field_types, photometric, planar_config, predictor, tags};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::layout;
use crate::utils::{ifd_utils, tag_utils, write_utils};

/// Builder for the directory of a created TIFF
pub struct DirectoryBuilder {
    is_big_tiff: bool,
    ifd: IFD,
    external_data: BTreeMap<u16, Vec<u8>>,
}

impl DirectoryBuilder {
    pub fn new(is_big_tiff: bool) -> Self {
        DirectoryBuilder {
            is_big_tiff,
            ifd: IFD::new(0, 0),
            external_data: BTreeMap::new(),
        }
    }

    /// Field type used for offsets and byte counts
    fn offset_field_type(&self) -> u16 {
        if self.is_big_tiff { field_types::LONG8 } else { field_types::LONG }
    }

    /// Adds a tag with one or more values
    ///
    /// Values that fit the value field are packed inline; larger arrays are
    /// stored as external data and patched with their offset when written.
    pub fn add_values(&mut self, tag: u16, field_type: u16, values: &[u64]) {
        let data = tag_utils::encode_tag_values(values, field_type);
        let count = values.len() as u64;

        if data.len() <= ifd_utils::value_field_size(self.is_big_tiff) {
            let mut packed = [0u8; 8];
            packed[..data.len()].copy_from_slice(&data);
            self.ifd.add_entry(IFDEntry::new(tag, field_type, count, u64::from_le_bytes(packed)));
            self.external_data.remove(&tag);
        } else {
            self.ifd.add_entry(IFDEntry::new(tag, field_type, count, 0));
            self.external_data.insert(tag, data);
        }
    }

    pub fn add_value(&mut self, tag: u16, field_type: u16, value: u64) {
        self.add_values(tag, field_type, &[value]);
    }

    /// Adds the tags describing a planar, one-row-per-strip image
    pub fn add_image_structure(
        &mut self,
        width: usize,
        height: usize,
        band_count: usize,
        data_type: CodecType,
        compression_code: u64,
        predictor_code: u16
    ) -> RasterResult<()> {
        let (format, bits) = layout::sample_format_for(data_type)
            .ok_or_else(|| RasterError::UnsupportedDataType(data_type, "GTiff create".to_string()))?;

        debug!("Adding image structure tags: {}x{}x{} {}", width, height, band_count, data_type);

        self.add_value(tags::IMAGE_WIDTH, field_types::LONG, width as u64);
        self.add_value(tags::IMAGE_LENGTH, field_types::LONG, height as u64);
        self.add_values(tags::BITS_PER_SAMPLE, field_types::SHORT, &vec![bits as u64; band_count]);
        self.add_value(tags::COMPRESSION, field_types::SHORT, compression_code);
        self.add_value(tags::PHOTOMETRIC_INTERPRETATION, field_types::SHORT, photometric::BLACK_IS_ZERO as u64);
        self.add_value(tags::SAMPLES_PER_PIXEL, field_types::SHORT, band_count as u64);
        self.add_value(tags::ROWS_PER_STRIP, field_types::LONG, 1);

        let planar = if band_count > 1 { planar_config::PLANAR } else { planar_config::CHUNKY };
        self.add_value(tags::PLANAR_CONFIGURATION, field_types::SHORT, planar as u64);

        if predictor_code != predictor::NONE {
            self.add_value(tags::PREDICTOR, field_types::SHORT, predictor_code as u64);
        }

        if band_count > 1 {
            let extras = vec![extra_samples::UNSPECIFIED as u64; band_count - 1];
            self.add_values(tags::EXTRA_SAMPLES, field_types::SHORT, &extras);
        }

        self.add_values(tags::SAMPLE_FORMAT, field_types::SHORT, &vec![format as u64; band_count]);
        Ok(())
    }

    /// Adds the strip offset and byte count tables
    pub fn add_strips(&mut self, offsets: &[u64], byte_counts: &[u64]) {
        let field_type = self.offset_field_type();
        self.add_values(tags::STRIP_OFFSETS, field_type, offsets);
        self.add_values(tags::STRIP_BYTE_COUNTS, field_type, byte_counts);
    }

    pub fn ifd(&self) -> &IFD {
        &self.ifd
    }

    /// Writes the directory at `ifd_offset`, followed by its external data
    ///
    /// The writer must be positioned at `ifd_offset`, which must be
    /// word-aligned. Returns the offset just past the last byte written.
    pub fn write(&self, writer: &mut impl Write, ifd_offset: u64) -> RasterResult<u64> {
        let entries = self.ifd.sorted_entries();
        let ifd_size = ifd_utils::calculate_ifd_size(entries.len(), self.is_big_tiff);

        // External data follows the directory, each block word-aligned
        let mut data_offset = write_utils::align_to_4_bytes(ifd_offset + ifd_size);
        let mut data_offsets = BTreeMap::new();
        for entry in &entries {
            if let Some(data) = self.external_data.get(&entry.tag) {
                data_offsets.insert(entry.tag, data_offset);
                data_offset = write_utils::align_to_4_bytes(data_offset + data.len() as u64);
            }
        }

        if self.is_big_tiff {
            writer.write_all(&(entries.len() as u64).to_le_bytes())?;
        } else {
            writer.write_all(&(entries.len() as u16).to_le_bytes())?;
        }

        let field_size = ifd_utils::value_field_size(self.is_big_tiff);
        for entry in &entries {
            writer.write_all(&entry.tag.to_le_bytes())?;
            writer.write_all(&entry.field_type.to_le_bytes())?;
            write_utils::write_offset(writer, entry.count, self.is_big_tiff)?;

            match data_offsets.get(&entry.tag) {
                Some(&offset) => write_utils::write_offset(writer, offset, self.is_big_tiff)?,
                None => writer.write_all(&entry.value_bytes[..field_size])?,
            }
        }

        // No further directories
        write_utils::write_offset(writer, 0, self.is_big_tiff)?;
        write_utils::write_padding(writer, ifd_size as usize)?;

        for entry in &entries {
            if let Some(data) = self.external_data.get(&entry.tag) {
                writer.write_all(data)?;
                write_utils::write_padding(writer, data.len())?;
            }
        }

        Ok(data_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_arrays_are_packed_inline() {
        let mut builder = DirectoryBuilder::new(false);
        builder.add_values(tags::BITS_PER_SAMPLE, field_types::SHORT, &[8, 8]);
        let entry = builder.ifd().get_entry(tags::BITS_PER_SAMPLE).unwrap();
        assert_eq!(&entry.value_bytes[..4], &[8, 0, 8, 0]);

        builder.add_values(tags::BITS_PER_SAMPLE, field_types::SHORT, &[8, 8, 8]);
        assert_eq!(builder.ifd().entry_count(), 1);
        assert!(builder.external_data.contains_key(&tags::BITS_PER_SAMPLE));
    }

    #[test]
    fn test_written_directory_has_the_computed_size() {
        let mut builder = DirectoryBuilder::new(false);
        builder.add_image_structure(4, 3, 2, CodecType::Byte, 1, predictor::NONE).unwrap();
        builder.add_strips(&[8, 12, 16, 20, 24, 28], &[4; 6]);

        let mut out = Vec::new();
        let end = builder.write(&mut out, 32).unwrap();
        assert_eq!(out.len() as u64, end - 32);

        let entry_count = u16::from_le_bytes([out[0], out[1]]) as usize;
        assert_eq!(entry_count, builder.ifd().entry_count());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let mut builder = DirectoryBuilder::new(true);
        let result = builder.add_image_structure(1, 1, 1, CodecType::Unknown, 1, predictor::NONE);
        assert!(matches!(result, Err(RasterError::UnsupportedDataType(CodecType::Unknown, _))));
    }
}
