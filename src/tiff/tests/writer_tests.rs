//! Round trips through the TIFF write and read handles

use std::path::Path;

use tempfile::tempdir;

use crate::codec::{CodecType, CreateSpec, CreationOptions, RasterHandle};
use crate::tiff::dataset::TiffDataset;
use crate::tiff::writer::TiffWriter;
use crate::tiff::reader::TiffReader;

fn write_uint16_image(path: &Path, options: &[&str], skip_last_row: bool) -> Vec<Vec<u16>> {
    let spec = CreateSpec { width: 5, height: 4, band_count: 2, data_type: CodecType::UInt16 };
    let options = CreationOptions::from_pairs(options).unwrap();
    let mut handle: Box<dyn RasterHandle> = Box::new(TiffWriter::create(path, &spec, &options).unwrap());

    let mut bands = Vec::new();
    for band in 1..=2usize {
        let values: Vec<u16> = (0..20u16).map(|i| i * 300 + band as u16).collect();
        let rows = if skip_last_row { 3 } else { 4 };
        for row in 0..rows {
            let bytes: Vec<u8> = values[row * 5..(row + 1) * 5].iter().flat_map(|v| v.to_le_bytes()).collect();
            handle.write_rows(band, row, 1, CodecType::UInt16, &bytes).unwrap();
        }
        bands.push(values);
    }
    handle.close().unwrap();
    bands
}

fn read_uint16_band(path: &Path, band: usize) -> Vec<u16> {
    let mut handle = TiffDataset::open(path).unwrap();
    let mut out = vec![0u8; handle.width() * handle.height() * 2];
    let height = handle.height();
    handle.read_rows(band, 0, height, CodecType::UInt16, &mut out).unwrap();
    out.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect()
}

#[test]
fn test_uncompressed_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plain.tif");
    let bands = write_uint16_image(&path, &[], false);

    assert_eq!(read_uint16_band(&path, 1), bands[0]);
    assert_eq!(read_uint16_band(&path, 2), bands[1]);
}

#[test]
fn test_compressed_and_predicted_round_trip() {
    for options in [
        vec!["COMPRESS=DEFLATE", "PREDICTOR=2"],
        vec!["COMPRESS=ZSTD", "ZSTD_LEVEL=5"],
        vec!["COMPRESS=ZSTD", "PREDICTOR=2", "BIGTIFF=YES"],
    ] {
        let dir = tempdir().unwrap();
        let path = dir.path().join("packed.tif");
        let bands = write_uint16_image(&path, &options, false);

        assert_eq!(read_uint16_band(&path, 1), bands[0], "options {:?}", options);
        assert_eq!(read_uint16_band(&path, 2), bands[1], "options {:?}", options);
    }
}

#[test]
fn test_bigtiff_option_changes_the_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("big.tif");
    write_uint16_image(&path, &["BIGTIFF=YES"], false);

    let tiff = TiffReader::new().load(&path).unwrap();
    assert!(tiff.is_big_tiff);
}

#[test]
fn test_unwritten_rows_read_back_as_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.tif");
    let bands = write_uint16_image(&path, &["COMPRESS=DEFLATE"], true);

    let band = read_uint16_band(&path, 2);
    assert_eq!(&band[..15], &bands[1][..15]);
    assert_eq!(&band[15..], &[0u16; 5]);
}

#[test]
fn test_samples_are_converted_to_the_file_type() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("floats.tif");
    let spec = CreateSpec { width: 3, height: 1, band_count: 1, data_type: CodecType::Byte };
    let mut handle = TiffWriter::create(&path, &spec, &CreationOptions::new()).unwrap();

    let row: Vec<u8> = [-5.0f32, 127.5, 300.0].iter().flat_map(|v| v.to_le_bytes()).collect();
    handle.write_rows(1, 0, 1, CodecType::Float32, &row).unwrap();
    Box::new(handle).close().unwrap();

    let mut dataset = TiffDataset::open(&path).unwrap();
    assert_eq!(dataset.band_type(1).unwrap(), CodecType::Byte);
    let mut out = vec![0u8; 3];
    dataset.read_rows(1, 0, 1, CodecType::Byte, &mut out).unwrap();
    assert_eq!(out, vec![0, 128, 255]);
}

#[test]
fn test_complex_samples_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("complex.tif");
    let spec = CreateSpec { width: 2, height: 2, band_count: 1, data_type: CodecType::CFloat32 };
    let mut handle = TiffWriter::create(&path, &spec, &CreationOptions::new()).unwrap();

    let values = [1.5f32, -2.0, 3.25, 4.0, -0.5, 0.0, 8.0, 9.0];
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    handle.write_rows(1, 0, 2, CodecType::CFloat32, &bytes).unwrap();
    Box::new(handle).close().unwrap();

    let mut dataset = TiffDataset::open(&path).unwrap();
    assert_eq!(dataset.band_type(1).unwrap(), CodecType::CFloat32);
    let mut out = vec![0u8; bytes.len()];
    dataset.read_rows(1, 0, 2, CodecType::CFloat32, &mut out).unwrap();
    assert_eq!(out, bytes);
}
