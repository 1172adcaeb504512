//! Byte order handling for TIFF files
//!
//! This module implements the Strategy pattern for handling different
//! byte orders (little-endian vs big-endian) when reading TIFF data.
//! Pixel rows leave the TIFF driver little-endian, so the handlers also
//! know how to normalize decoded sample bytes.

use byteorder::{BigEndian, ByteOrder as ByteOrderExt, LittleEndian, ReadBytesExt};
use std::io::Result;

use crate::errors::{RasterError, RasterResult};
use crate::io::seekable::SeekableReader;

/// Represents the byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the TIFF header
    pub fn detect(reader: &mut dyn SeekableReader) -> RasterResult<Self> {
        let byte_order = reader.read_u16::<LittleEndian>()?;
        match byte_order {
            0x4949 => Ok(ByteOrder::LittleEndian), // "II" (Intel)
            0x4D4D => Ok(ByteOrder::BigEndian),    // "MM" (Motorola)
            _ => Err(RasterError::InvalidByteOrder(byte_order)),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Trait for byte order handling strategies
pub trait ByteOrderHandler: Send + Sync {
    /// Read a u16 value
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    /// Read a u32 value
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    /// Read a u64 value
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    /// Decode a u16 from the start of `bytes`
    fn decode_u16(&self, bytes: &[u8]) -> u16;

    /// Decode a u32 from the start of `bytes`
    fn decode_u32(&self, bytes: &[u8]) -> u32;

    /// Decode a u64 from the start of `bytes`
    fn decode_u64(&self, bytes: &[u8]) -> u64;

    /// Rewrites `data` in place so every `component_size`-byte value is little-endian
    fn to_little_endian(&self, data: &mut [u8], component_size: usize);
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }

    fn decode_u16(&self, bytes: &[u8]) -> u16 {
        LittleEndian::read_u16(bytes)
    }

    fn decode_u32(&self, bytes: &[u8]) -> u32 {
        LittleEndian::read_u32(bytes)
    }

    fn decode_u64(&self, bytes: &[u8]) -> u64 {
        LittleEndian::read_u64(bytes)
    }

    fn to_little_endian(&self, _data: &mut [u8], _component_size: usize) {
        // Already in the target order
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }

    fn decode_u16(&self, bytes: &[u8]) -> u16 {
        BigEndian::read_u16(bytes)
    }

    fn decode_u32(&self, bytes: &[u8]) -> u32 {
        BigEndian::read_u32(bytes)
    }

    fn decode_u64(&self, bytes: &[u8]) -> u64 {
        BigEndian::read_u64(bytes)
    }

    fn to_little_endian(&self, data: &mut [u8], component_size: usize) {
        if component_size < 2 {
            return;
        }
        for component in data.chunks_exact_mut(component_size) {
            component.reverse();
        }
    }
}
