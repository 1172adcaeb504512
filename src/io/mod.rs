//! I/O utilities for file handling
//!
//! Seekable readers and byte-order strategies used by the TIFF driver.

pub mod seekable;
pub mod byte_order;
