//! TIFF file format driver
//!
//! This module provides structures and functions for reading and writing
//! TIFF and BigTIFF format files through the codec driver interface.

pub mod ifd;
pub(crate) mod types;
pub mod reader;
pub mod layout;
pub(crate) mod constants;
pub(crate) mod validation;
pub(crate) mod predictor;
pub mod builder;
pub mod dataset;
pub mod writer;
mod driver;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use driver::GTiffDriver;
pub use dataset::TiffDataset;
pub use ifd::{IFD, IFDEntry};
pub use layout::ImageLayout;
pub use reader::TiffReader;
pub use types::TIFF;
pub use writer::{TiffCreateSettings, TiffWriter};
