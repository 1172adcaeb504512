//! TIFF file reader implementation
//!
//! This module implements the TIFF/BigTIFF directory reader that uses the
//! Strategy pattern to handle different byte orders.

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::path::Path;

use crate::errors::{RasterError, RasterResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::ifd_utils;
use crate::utils::tag_utils;

/// Upper bound on directories followed in one chain
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF directories
pub struct TiffReader {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            is_big_tiff: false,
        }
    }

    /// Returns the byte order handler, with proper error handling for None case
    fn handler(&self) -> RasterResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| RasterError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Loads the directory structure of a TIFF file
    pub fn load(&mut self, path: &Path) -> RasterResult<TIFF> {
        info!("Loading TIFF file: {}", path.display());

        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(64 * 1024, file);

        self.read(&mut reader)
    }

    /// Reads a TIFF file from the given reader
    ///
    /// Detects the byte order, checks for TIFF or BigTIFF and reads the
    /// chain of Image File Directories.
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> RasterResult<TIFF> {
        reader.seek(SeekFrom::Start(0))?;

        let (byte_order, handler) = format_utils::detect_byte_order(reader)?;
        let (is_big_tiff, _) = format_utils::detect_tiff_format(reader, handler.as_ref())?;
        self.byte_order_handler = Some(handler);
        self.is_big_tiff = is_big_tiff;

        let mut tiff = TIFF::new(is_big_tiff, byte_order);

        let first_ifd_offset = ifd_utils::read_ifd_offset(reader, is_big_tiff, self.handler()?)?;
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;
        if tiff.ifds.is_empty() {
            return Err(RasterError::GenericError("No IFDs found in TIFF file".to_string()));
        }

        debug!("Read {} IFDs from TIFF file", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// A broken link after the first directory ends the chain instead of
    /// failing, since only the first directory carries the raster.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64, file_size: u64) -> RasterResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if ifds.is_empty() => return Err(e),
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
            };

            let next_ifd_offset = match ifd_utils::read_ifd_offset(reader, self.is_big_tiff, self.handler()?) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    ifds.push(ifd);
                    break;
                }
            };

            ifds.push(ifd);

            if next_ifd_offset != 0 && validation::validate_ifd_offset(next_ifd_offset, file_size).is_err() {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }
            if next_ifd_offset == ifd_offset {
                warn!("IFD at {} links to itself, stopping IFD chain", ifd_offset);
                break;
            }
            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads an IFD from the reader
    ///
    /// Leaves the reader positioned at the next-IFD link.
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> RasterResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = self.read_ifd_entry_count(reader)?;
        ifd_utils::log_ifd_position(number, offset, entry_count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader)?;
            ifd.add_entry(entry);
        }

        Ok(ifd)
    }

    /// Reads the entry count from an IFD
    fn read_ifd_entry_count(&self, reader: &mut dyn SeekableReader) -> RasterResult<u64> {
        let handler = self.handler()?;
        if self.is_big_tiff {
            Ok(handler.read_u64(reader)?)
        } else {
            Ok(handler.read_u16(reader)? as u64)
        }
    }

    /// Reads a single IFD entry
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> RasterResult<IFDEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let mut value_bytes = [0u8; 8];
        let field_size = ifd_utils::value_field_size(self.is_big_tiff);
        reader.read_exact(&mut value_bytes[..field_size])?;

        let value_offset = if self.is_big_tiff {
            handler.decode_u64(&value_bytes)
        } else {
            handler.decode_u32(&value_bytes) as u64
        };

        // Single SHORT values sit in the first two bytes of the field
        let entry = if count == 1 && tag_utils::field_type_size(field_type) == Some(2) {
            let short = handler.decode_u16(&value_bytes) as u64;
            IFDEntry::with_raw_value(tag, field_type, count, short, value_bytes)
        } else if count == 1 && tag_utils::field_type_size(field_type) == Some(1) {
            IFDEntry::with_raw_value(tag, field_type, count, value_bytes[0] as u64, value_bytes)
        } else {
            IFDEntry::with_raw_value(tag, field_type, count, value_offset, value_bytes)
        };

        Ok(entry)
    }

    /// Reads a tag's values as a vector of u64
    ///
    /// Inline values are decoded from the entry's raw value field; others are
    /// read from the offset it points to.
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> RasterResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(RasterError::TagNotFound(tag))?;
        let handler = self.handler()?;
        let data_size = entry.data_size()?;
        let count = usize::try_from(entry.count).map_err(|_| RasterError::GenericError(format!(
            "Tag {} count {} does not fit in memory", tag, entry.count)))?;

        if tag_utils::is_value_inline(entry, self.is_big_tiff)? {
            return tag_utils::decode_tag_values(&entry.value_bytes, entry.field_type, count, handler);
        }

        let file_size = validation::get_file_size(reader)?;
        validation::validate_block_range(entry.value_offset, data_size, file_size)?;

        let mut data = vec![0u8; data_size as usize];
        reader.seek(SeekFrom::Start(entry.value_offset))?;
        reader.read_exact(&mut data)?;

        tag_utils::decode_tag_values(&data, entry.field_type, count, handler)
    }

    /// Reads a tag holding a single value, falling back to `default` when absent
    pub fn read_tag_or(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16, default: u64) -> RasterResult<u64> {
        if !ifd.has_tag(tag) {
            return Ok(default);
        }
        let values = self.read_tag_values(reader, ifd, tag)?;
        Ok(values.first().copied().unwrap_or(default))
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }
}
