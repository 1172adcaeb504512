//! PNG driver
//!
//! Decoding and encoding go through the `image` crate. Any image the crate
//! can decode is readable, registered after GTiff so TIFF files never reach
//! it. PNG carries at most four 8- or 16-bit channels, so the driver creates
//! only Byte and UInt16 images of one to four bands.

pub mod dataset;
pub mod writer;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::ImageReader;
use log::trace;

use crate::codec::{CreateSpec, CreationOptions, RasterDriver, RasterHandle};
use crate::errors::RasterResult;

pub use dataset::PngDataset;
pub use writer::PngWriter;

/// Portable Network Graphics driver
#[derive(Debug, Default)]
pub struct PngDriver;

impl RasterDriver for PngDriver {
    fn short_name(&self) -> &'static str {
        "PNG"
    }

    fn long_name(&self) -> &'static str {
        "Portable Network Graphics"
    }

    /// Recognizes any content the `image` crate can guess, ignoring the extension
    fn identify(&self, path: &Path) -> bool {
        let format = File::open(path)
            .and_then(|file| ImageReader::new(BufReader::new(file)).with_guessed_format())
            .ok()
            .and_then(|reader| reader.format());
        trace!("PNG identify {}: guessed {:?}", path.display(), format);
        format.is_some()
    }

    fn open(&self, path: &Path) -> RasterResult<Box<dyn RasterHandle>> {
        Ok(Box::new(PngDataset::open(path)?))
    }

    fn create(&self, path: &Path, spec: &CreateSpec, options: &CreationOptions) -> RasterResult<Box<dyn RasterHandle>> {
        Ok(Box::new(PngWriter::create(path, spec, options)?))
    }
}
