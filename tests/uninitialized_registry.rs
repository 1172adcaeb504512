//! Transfers without codec initialization
//!
//! Lives in its own test binary so no other test has registered drivers.

use tempfile::tempdir;

use rasterbuf::codec::registry;
use rasterbuf::{read_image, write_image, BandBuffers, Dimensions, RasterError};

#[test]
fn test_nothing_opens_or_creates_before_initialization() {
    assert!(!registry::is_initialized());
    assert!(registry::driver_names().is_empty());

    let dir = tempdir().unwrap();
    let path = dir.path().join("image.tif");
    let buffers = BandBuffers::from_vecs(vec![vec![3u8; 4]]);
    let dims = Dimensions::new(2, 2, 1);

    let result = write_image(&buffers, &dims, &path, None, false);
    assert!(matches!(result, Err(RasterError::CreateFailed(..))));
    assert!(!path.exists());

    std::fs::write(&path, b"II*\0\x08\0\0\0").unwrap();
    assert!(matches!(read_image::<u8>(&path, false), Err(RasterError::OpenFailed(..))));

    // Initialization on demand makes the same calls work
    write_image(&buffers, &dims, &path, None, true).unwrap();
    let raster = read_image::<u8>(&path, false).unwrap();
    assert_eq!(raster.dimensions, dims);
    assert!(registry::is_initialized());
}
