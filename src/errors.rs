//! Custom error types for raster buffer transfer
//!
//! Every failure in the crate is reported through [`RasterError`]. Errors raised
//! by a format driver while opening or creating an image are wrapped in
//! [`RasterError::OpenFailed`] / [`RasterError::CreateFailed`] together with the
//! path, so callers can tell which phase of a transfer failed.

use std::fmt;
use std::io;
use std::path::Path;

use crate::buffer::ElementType;
use crate::codec::CodecType;

/// Raster transfer error types
#[derive(Debug)]
pub enum RasterError {
    /// I/O error
    IoError(io::Error),
    /// Width, height or band count below 1, or too few dimension entries
    InvalidDimensions(String),
    /// Buffer collection does not match the dimensions it is written with
    BufferMismatch(String),
    /// Source image could not be opened
    OpenFailed(String, Box<RasterError>),
    /// Destination image could not be created
    CreateFailed(String, Box<RasterError>),
    /// In-memory element type has no codec equivalent
    UnsupportedElementType(ElementType),
    /// Codec data type not supported by a driver or a conversion
    UnsupportedDataType(CodecType, String),
    /// No registered driver carries this name
    UnknownDriver(String),
    /// Reading rows from an opened image failed
    ReadFailed { band: usize, row: usize, source: Box<RasterError> },
    /// Writing rows into a created image failed
    WriteFailed { band: usize, row: usize, source: Box<RasterError> },
    /// Band or row window lies outside the image
    RowOutOfRange(String),
    /// Buffer allocation failed
    AllocationFailed(usize),
    /// Invalid configuration or creation option
    Config(String),
    /// Error reported by the `image` crate
    ImageError(String),
    /// Invalid TIFF header
    InvalidHeader,
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    InvalidBigTIFFHeader,
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported compression method
    UnsupportedCompression(u64),
    /// Image dimensions not found
    MissingDimensions,
    /// Generic error with message
    GenericError(String),
}

impl RasterError {
    /// Wraps a driver error raised while opening `path`
    pub fn open_failed(path: &Path, cause: RasterError) -> Self {
        RasterError::OpenFailed(path.display().to_string(), Box::new(cause))
    }

    /// Wraps a driver error raised while creating `path`
    pub fn create_failed(path: &Path, cause: RasterError) -> Self {
        RasterError::CreateFailed(path.display().to_string(), Box::new(cause))
    }

    pub fn read_failed(band: usize, row: usize, cause: RasterError) -> Self {
        RasterError::ReadFailed { band, row, source: Box::new(cause) }
    }

    pub fn write_failed(band: usize, row: usize, cause: RasterError) -> Self {
        RasterError::WriteFailed { band, row, source: Box::new(cause) }
    }
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::IoError(e) => write!(f, "I/O error: {}", e),
            RasterError::InvalidDimensions(msg) => write!(f, "Invalid dimensions: {}", msg),
            RasterError::BufferMismatch(msg) => write!(f, "Buffer mismatch: {}", msg),
            RasterError::OpenFailed(path, cause) => write!(f, "Failed to open {}: {}", path, cause),
            RasterError::CreateFailed(path, cause) => write!(f, "Failed to create {}: {}", path, cause),
            RasterError::UnsupportedElementType(t) => write!(f, "Unsupported element type: {}", t),
            RasterError::UnsupportedDataType(t, ctx) => write!(f, "Unsupported data type {} ({})", t, ctx),
            RasterError::UnknownDriver(name) => write!(f, "Unknown driver: {}", name),
            RasterError::ReadFailed { band, row, source } => {
                write!(f, "Read failed at band {}, row {}: {}", band, row, source)
            },
            RasterError::WriteFailed { band, row, source } => {
                write!(f, "Write failed at band {}, row {}: {}", band, row, source)
            },
            RasterError::RowOutOfRange(msg) => write!(f, "Row window out of range: {}", msg),
            RasterError::AllocationFailed(bytes) => write!(f, "Failed to allocate {} bytes", bytes),
            RasterError::Config(msg) => write!(f, "Configuration error: {}", msg),
            RasterError::ImageError(msg) => write!(f, "Image codec error: {}", msg),
            RasterError::InvalidHeader => write!(f, "Invalid TIFF header"),
            RasterError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            RasterError::InvalidBigTIFFHeader => write!(f, "Invalid BigTIFF header"),
            RasterError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            RasterError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            RasterError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            RasterError::UnsupportedCompression(c) => write!(f, "Unsupported compression method: {}", c),
            RasterError::MissingDimensions => write!(f, "Image dimensions not found"),
            RasterError::GenericError(msg) => write!(f, "Raster error: {}", msg),
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RasterError::IoError(e) => Some(e),
            RasterError::OpenFailed(_, cause) | RasterError::CreateFailed(_, cause) => Some(cause.as_ref()),
            RasterError::ReadFailed { source, .. } | RasterError::WriteFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for RasterError {
    fn from(error: io::Error) -> Self {
        RasterError::IoError(error)
    }
}

impl From<image::ImageError> for RasterError {
    fn from(error: image::ImageError) -> Self {
        RasterError::ImageError(error.to_string())
    }
}

impl From<String> for RasterError {
    fn from(msg: String) -> Self {
        RasterError::GenericError(msg)
    }
}

/// Result type for raster operations
pub type RasterResult<T> = Result<T, RasterError>;
