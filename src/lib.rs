//! Raster buffer transfer
//!
//! Reads multi-band raster images into one typed buffer per band and writes
//! such buffers back out, through a small built-in codec with GTiff and PNG
//! drivers.

pub mod api;
pub mod buffer;
pub mod codec;
pub mod compression;
pub mod config;
pub mod errors;
pub mod io;
pub mod png;
pub mod tiff;
pub mod utils;

pub use crate::api::{cleanup, read_image, write_image, Raster, RasterBufferTransfer};
pub use crate::buffer::{map_element_type, BandBuffer, BandBuffers, Dimensions, Element, ElementType};
pub use crate::codec::{CodecType, CreationOptions, RasterDriver, RasterHandle};
pub use crate::config::TransferConfig;
pub use crate::errors::{RasterError, RasterResult};
