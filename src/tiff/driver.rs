//! GTiff driver registration

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::codec::{CreateSpec, CreationOptions, RasterDriver, RasterHandle};
use crate::errors::RasterResult;
use crate::tiff::dataset::TiffDataset;
use crate::tiff::writer::TiffWriter;
use crate::utils::format_utils;

/// TIFF and BigTIFF driver
pub struct GTiffDriver;

impl RasterDriver for GTiffDriver {
    fn short_name(&self) -> &'static str {
        "GTiff"
    }

    fn long_name(&self) -> &'static str {
        "GeoTIFF"
    }

    fn identify(&self, path: &Path) -> bool {
        let mut magic = [0u8; 4];
        match File::open(path).and_then(|mut f| f.read_exact(&mut magic)) {
            Ok(()) => format_utils::has_tiff_signature(&magic),
            Err(_) => false,
        }
    }

    fn open(&self, path: &Path) -> RasterResult<Box<dyn RasterHandle>> {
        Ok(Box::new(TiffDataset::open(path)?))
    }

    fn create(&self, path: &Path, spec: &CreateSpec, options: &CreationOptions) -> RasterResult<Box<dyn RasterHandle>> {
        Ok(Box::new(TiffWriter::create(path, spec, options)?))
    }
}
