//! Seekable reader trait
//!
//! TIFF parsing jumps between the header, directories and pixel blocks, so
//! every reader it is handed must support both reading and seeking.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

// Files, buffered files and in-memory cursors all qualify
impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
