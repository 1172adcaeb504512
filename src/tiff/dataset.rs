//! Read handle for TIFF images
//!
//! Rows are served from decoded blocks. All blocks of the current block row
//! (one strip, or one row of tiles) of one plane are kept decoded; moving to
//! another block row or plane drops them, so memory stays bounded by a single
//! block row whatever the image size.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, trace};

use crate::codec::{check_window, convert_samples, CodecType, RasterHandle};
use crate::compression::{CompressionFactory, CompressionHandler};
use crate::errors::{RasterError, RasterResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::predictor;
use crate::tiff::layout::ImageLayout;
use crate::tiff::predictor as horizontal;
use crate::tiff::reader::TiffReader;
use crate::tiff::validation;

/// An open TIFF image
pub struct TiffDataset {
    reader: BufReader<File>,
    handler: Box<dyn ByteOrderHandler>,
    decompressor: Box<dyn CompressionHandler>,
    layout: ImageLayout,
    file_size: u64,
    /// Decoded blocks of the current block row, keyed by block index
    cache: HashMap<usize, Vec<u8>>,
    /// (plane, block row) held in `cache`
    cached_row: Option<(usize, usize)>,
    /// One row of one band in the on-disk type, little-endian
    row_buffer: Vec<u8>,
}

impl TiffDataset {
    /// Opens the first image of a TIFF file
    pub fn open(path: &Path) -> RasterResult<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(64 * 1024, file);

        let mut tiff_reader = TiffReader::new();
        let tiff = tiff_reader.read(&mut reader)?;
        let ifd = tiff.main_ifd().ok_or(RasterError::MissingDimensions)?;
        let layout = ImageLayout::from_ifd(&tiff_reader, &mut reader, ifd)?;

        let decompressor = CompressionFactory::create_handler(layout.compression)?;
        let file_size = validation::get_file_size(&mut reader)?;
        let row_buffer = vec![0u8; layout.width * layout.data_type.size_in_bytes()];

        debug!("Opened {} ({}x{}, {} bands of {}, {} compression)",
               path.display(), layout.width, layout.height, layout.samples_per_pixel,
               layout.data_type, decompressor.name());

        Ok(TiffDataset {
            reader,
            handler: tiff.byte_order.create_handler(),
            decompressor,
            layout,
            file_size,
            cache: HashMap::new(),
            cached_row: None,
            row_buffer,
        })
    }

    pub fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    /// Reads, decompresses and normalizes one block
    fn read_block(&mut self, index: usize) -> RasterResult<Vec<u8>> {
        let expected = self.layout.block_bytes();
        let offset = self.layout.offsets[index];
        let byte_count = self.layout.byte_counts[index];

        // Sparse files leave unwritten blocks at offset 0
        if byte_count == 0 || offset == 0 {
            return Ok(vec![0u8; expected]);
        }

        validation::validate_block_range(offset, byte_count, self.file_size)?;
        let mut raw = vec![0u8; byte_count as usize];
        self.reader.seek(SeekFrom::Start(offset))?;
        self.reader.read_exact(&mut raw)?;

        let mut data = self.decompressor.decompress(&raw, expected)?;
        // The last strip may legitimately stop short of a full block
        if data.len() < expected {
            trace!("Block {} decoded to {} bytes, padding to {}", index, data.len(), expected);
            data.resize(expected, 0);
        }

        let component_size = self.layout.data_type.component_size();
        self.handler.to_little_endian(&mut data, component_size);

        if self.layout.predictor == predictor::HORIZONTAL_DIFFERENCING {
            let stride = self.layout.components_per_pixel();
            horizontal::undo_horizontal(&mut data, self.layout.block_width * stride, stride, component_size)?;
        }

        Ok(data)
    }

    /// Makes sure every block of (plane, block_row) is decoded
    fn load_block_row(&mut self, plane: usize, block_row: usize) -> RasterResult<()> {
        if self.cached_row == Some((plane, block_row)) {
            return Ok(());
        }

        self.cache.clear();
        self.cached_row = None;
        for block_col in 0..self.layout.blocks_across() {
            let index = self.layout.block_index(plane, block_row, block_col);
            let block = self.read_block(index)?;
            self.cache.insert(index, block);
        }
        self.cached_row = Some((plane, block_row));
        Ok(())
    }

    /// Assembles one row of one band into `row_buffer`
    fn load_row(&mut self, band: usize, row: usize) -> RasterResult<()> {
        let plane = self.layout.plane_for_band(band);
        let block_row = row / self.layout.block_height;
        let row_in_block = row % self.layout.block_height;
        self.load_block_row(plane, block_row)?;

        let sample_size = self.layout.data_type.size_in_bytes();
        let samples_in_block = self.layout.samples_in_block();
        let sample = self.layout.sample_for_band(band);
        let block_width = self.layout.block_width;

        for block_col in 0..self.layout.blocks_across() {
            let index = self.layout.block_index(plane, block_row, block_col);
            let block = self.cache.get(&index)
                .ok_or_else(|| RasterError::GenericError(format!("Block {} missing from cache", index)))?;

            let x0 = block_col * block_width;
            let columns = block_width.min(self.layout.width - x0);
            for x in 0..columns {
                let src = ((row_in_block * block_width + x) * samples_in_block + sample) * sample_size;
                let dst = (x0 + x) * sample_size;
                self.row_buffer[dst..dst + sample_size].copy_from_slice(&block[src..src + sample_size]);
            }
        }

        Ok(())
    }
}

impl RasterHandle for TiffDataset {
    fn width(&self) -> usize {
        self.layout.width
    }

    fn height(&self) -> usize {
        self.layout.height
    }

    fn band_count(&self) -> usize {
        self.layout.samples_per_pixel
    }

    fn band_type(&self, band: usize) -> RasterResult<CodecType> {
        if band < 1 || band > self.layout.samples_per_pixel {
            return Err(RasterError::RowOutOfRange(format!(
                "band {} outside 1..={}", band, self.layout.samples_per_pixel)));
        }
        Ok(self.layout.data_type)
    }

    fn read_rows(
        &mut self,
        band: usize,
        first_row: usize,
        row_count: usize,
        target: CodecType,
        out: &mut [u8]
    ) -> RasterResult<()> {
        check_window(self.layout.width, self.layout.height, self.layout.samples_per_pixel,
                     band, first_row, row_count, target, out.len())?;

        let width = self.layout.width;
        let row_bytes = width * target.size_in_bytes();
        for (i, chunk) in out.chunks_exact_mut(row_bytes).enumerate() {
            self.load_row(band, first_row + i)?;
            convert_samples(&self.row_buffer, self.layout.data_type, chunk, target, width)?;
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
        Err(RasterError::GenericError("TIFF opened read-only".to_string()))
    }

    fn close(self: Box<Self>) -> RasterResult<()> {
        debug!("Closing TIFF read handle");
        Ok(())
    }
}
