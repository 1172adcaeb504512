//! Utility modules for common functionality
//!
//! Logging setup plus the small encoding helpers shared by the TIFF reader
//! and writer.

pub mod logger;
pub(crate) mod write_utils;
pub(crate) mod ifd_utils;
pub(crate) mod format_utils;
pub(crate) mod tag_utils;
