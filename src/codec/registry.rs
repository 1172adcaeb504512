//! Process-wide driver registry
//!
//! The registry starts empty. [`global_init`] registers the built-in drivers;
//! it is idempotent and safe to call from several threads. Opening or creating
//! an image before any driver is registered fails, so callers either pass
//! `init_library = true` to a transfer or call [`global_init`] once at startup.

use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lazy_static::lazy_static;
use log::{debug, info};

use crate::codec::{CreateSpec, CreationOptions, RasterDriver, RasterHandle};
use crate::errors::{RasterError, RasterResult};
use crate::png::PngDriver;
use crate::tiff::GTiffDriver;

lazy_static! {
    static ref DRIVER_REGISTRY: RwLock<DriverRegistry> = RwLock::new(DriverRegistry::new());
}

/// Ordered list of registered drivers
///
/// Order matters for [`open_for_read`]: the first driver that identifies a file
/// opens it.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: Vec<Arc<dyn RasterDriver>>,
    initialized: bool,
}

impl DriverRegistry {
    pub fn new() -> Self {
        DriverRegistry { drivers: Vec::new(), initialized: false }
    }

    /// Adds a driver, replacing any driver with the same short name
    pub fn register(&mut self, driver: Arc<dyn RasterDriver>) {
        let name = driver.short_name();
        match self.drivers.iter().position(|d| d.short_name().eq_ignore_ascii_case(name)) {
            Some(idx) => {
                debug!("Replacing driver {}", name);
                self.drivers[idx] = driver;
            },
            None => {
                debug!("Registering driver {}", name);
                self.drivers.push(driver);
            }
        }
    }

    /// Looks a driver up by short name, case-insensitively
    pub fn get(&self, name: &str) -> Option<Arc<dyn RasterDriver>> {
        self.drivers.iter()
            .find(|d| d.short_name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Returns the first driver that identifies the file at `path`
    pub fn identify(&self, path: &Path) -> Option<Arc<dyn RasterDriver>> {
        self.drivers.iter()
            .find(|d| d.identify(path))
            .cloned()
    }

    pub fn driver_names(&self) -> Vec<&'static str> {
        self.drivers.iter().map(|d| d.short_name()).collect()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

fn registry_read() -> RwLockReadGuard<'static, DriverRegistry> {
    DRIVER_REGISTRY.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn registry_write() -> RwLockWriteGuard<'static, DriverRegistry> {
    DRIVER_REGISTRY.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registers the built-in drivers once per process
pub fn global_init() {
    let mut registry = registry_write();
    if registry.initialized {
        return;
    }

    registry.register(Arc::new(GTiffDriver));
    registry.register(Arc::new(PngDriver));
    registry.initialized = true;
    info!("Registered raster drivers: {:?}", registry.driver_names());
}

/// Whether [`global_init`] has run
pub fn is_initialized() -> bool {
    registry_read().initialized
}

/// Registers an additional driver in the process-wide registry
pub fn register_driver(driver: Arc<dyn RasterDriver>) {
    registry_write().register(driver);
}

/// Short names of all registered drivers, in lookup order
pub fn driver_names() -> Vec<&'static str> {
    registry_read().driver_names()
}

/// Looks up a registered driver by short name
pub fn get_driver_by_name(name: &str) -> Option<Arc<dyn RasterDriver>> {
    registry_read().get(name)
}

/// Opens `path` read-only with the first driver that recognizes it
pub fn open_for_read(path: &Path) -> RasterResult<Box<dyn RasterHandle>> {
    if !path.is_file() {
        return Err(RasterError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist or is not a file", path.display()))));
    }

    // Release the lock before the driver touches the file
    let driver = registry_read().identify(path);
    match driver {
        Some(driver) => {
            debug!("Opening {} with driver {}", path.display(), driver.short_name());
            driver.open(path)
        },
        None => Err(RasterError::GenericError(format!(
            "No registered driver recognizes {}", path.display()))),
    }
}

/// Creates `path` through the driver named `driver_name`
pub fn create_for_write(
    path: &Path,
    spec: &CreateSpec,
    driver_name: &str,
    options: &CreationOptions
) -> RasterResult<Box<dyn RasterHandle>> {
    let driver = get_driver_by_name(driver_name)
        .ok_or_else(|| RasterError::UnknownDriver(driver_name.to_string()))?;

    debug!("Creating {} with driver {} ({}x{}x{} {}, options {})",
           path.display(), driver.short_name(), spec.width, spec.height,
           spec.band_count, spec.data_type, options);
    driver.create(path, spec, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_init_registers_builtin_drivers_once() {
        global_init();
        global_init();
        let names = driver_names();
        assert_eq!(names.iter().filter(|n| **n == "GTiff").count(), 1);
        assert!(names.contains(&"PNG"));
        assert!(is_initialized());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut registry = DriverRegistry::new();
        registry.register(Arc::new(GTiffDriver));
        assert!(registry.get("gtiff").is_some());
        assert!(registry.get("HFA").is_none());
    }

    #[test]
    fn test_registering_twice_replaces_the_driver() {
        let mut registry = DriverRegistry::new();
        registry.register(Arc::new(GTiffDriver));
        registry.register(Arc::new(GTiffDriver));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_driver_is_reported_by_name() {
        global_init();
        let spec = CreateSpec { width: 1, height: 1, band_count: 1, data_type: crate::codec::CodecType::Byte };
        let result = create_for_write(Path::new("unused.bin"), &spec, "NoSuchFormat", &CreationOptions::new());
        assert!(matches!(result, Err(RasterError::UnknownDriver(name)) if name == "NoSuchFormat"));
    }
}
