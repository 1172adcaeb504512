//! Tests for the TIFF directory reader

use super::test_utils::{create_test_bigtiff_buffer, create_test_tiff_buffer, TestTiff};
use crate::errors::RasterError;
use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{field_types, tags};
use crate::tiff::reader::TiffReader;
use crate::utils::tag_utils;
use std::io::Cursor;

#[test]
fn test_reads_classic_tiff_directory() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.byte_order, ByteOrder::LittleEndian);
    assert_eq!(tiff.ifd_count(), 1);
    let ifd = tiff.main_ifd().unwrap();
    assert_eq!(ifd.get_tag_value(tags::IMAGE_WIDTH), Some(800));
    assert_eq!(ifd.get_tag_value(tags::IMAGE_LENGTH), Some(600));
}

#[test]
fn test_reads_bigtiff_directory() {
    let mut cursor = create_test_bigtiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    assert!(tiff.is_big_tiff);
    assert!(reader.is_big_tiff());
    let ifd = tiff.main_ifd().unwrap();
    assert_eq!(ifd.get_tag_value(tags::IMAGE_WIDTH), Some(1024));
    assert_eq!(ifd.get_tag_value(tags::IMAGE_LENGTH), Some(768));
}

#[test]
fn test_inline_and_external_arrays_decode_in_big_endian_files() {
    let data = TestTiff::new(true)
        .long(tags::IMAGE_WIDTH, &[2])
        .long(tags::IMAGE_LENGTH, &[1])
        .short(tags::SAMPLES_PER_PIXEL, &[3])
        .short(tags::BITS_PER_SAMPLE, &[16, 16, 16])
        .short(tags::SAMPLE_FORMAT, &[1, 1])
        .short(tags::COMPRESSION, &[1])
        .block(vec![0u8; 12])
        .build();

    let mut cursor = Cursor::new(data);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    assert_eq!(tiff.byte_order, ByteOrder::BigEndian);
    assert_eq!(ifd.get_tag_value(tags::SAMPLES_PER_PIXEL), Some(3));
    assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::BITS_PER_SAMPLE).unwrap(), vec![16, 16, 16]);
    assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::SAMPLE_FORMAT).unwrap(), vec![1, 1]);
    assert_eq!(reader.read_tag_or(&mut cursor, ifd, tags::PREDICTOR, 1).unwrap(), 1);
}

#[test]
fn test_missing_tags_are_reported() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let result = reader.read_tag_values(&mut cursor, tiff.main_ifd().unwrap(), tags::STRIP_OFFSETS);
    assert!(matches!(result, Err(RasterError::TagNotFound(tags::STRIP_OFFSETS))));
}

#[test]
fn test_rejects_non_tiff_data() {
    let mut cursor = Cursor::new(b"\x89PNG\r\n\x1a\n0000".to_vec());
    let result = TiffReader::new().read(&mut cursor);
    assert!(matches!(result, Err(RasterError::InvalidByteOrder(_))));

    let mut wrong_version = Cursor::new(vec![0x49, 0x49, 41, 0, 8, 0, 0, 0]);
    let result = TiffReader::new().read(&mut wrong_version);
    assert!(matches!(result, Err(RasterError::UnsupportedVersion(41))));
}

#[test]
fn test_oversized_bigtiff_count_is_an_error() {
    use byteorder::{LittleEndian, WriteBytesExt};

    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(43).unwrap();
    buffer.write_u16::<LittleEndian>(8).unwrap();
    buffer.write_u16::<LittleEndian>(0).unwrap();
    buffer.write_u64::<LittleEndian>(16).unwrap();

    buffer.write_u64::<LittleEndian>(1).unwrap();
    buffer.write_u16::<LittleEndian>(tags::IMAGE_WIDTH).unwrap();
    buffer.write_u16::<LittleEndian>(field_types::LONG8).unwrap();
    buffer.write_u64::<LittleEndian>(1 << 62).unwrap();
    buffer.write_u64::<LittleEndian>(64).unwrap();
    buffer.write_u64::<LittleEndian>(0).unwrap();

    let mut cursor = Cursor::new(buffer);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();
    let entry = ifd.get_entry(tags::IMAGE_WIDTH).unwrap();

    assert!(entry.data_size().is_err());
    assert!(tag_utils::is_value_inline(entry, true).is_err());
    let result = reader.read_tag_values(&mut cursor, ifd, tags::IMAGE_WIDTH);
    assert!(matches!(result, Err(RasterError::GenericError(_))));
}
