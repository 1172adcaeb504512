//! Image dimensions triple

use std::convert::TryFrom;
use std::fmt;

use crate::errors::{RasterError, RasterResult};

/// Width, height and band count of a raster
///
/// All three must be at least 1 before the dimensions are used to read or
/// write; [`Dimensions::validate`] enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
}

impl Dimensions {
    pub fn new(width: usize, height: usize, band_count: usize) -> Self {
        Dimensions { width, height, band_count }
    }

    /// Checks that every entry is at least 1 and that a band fits in memory
    pub fn validate(&self) -> RasterResult<()> {
        if self.width < 1 || self.height < 1 || self.band_count < 1 {
            return Err(RasterError::InvalidDimensions(format!(
                "{} (width, height and band count must all be at least 1)", self)));
        }

        if self.width.checked_mul(self.height).is_none() {
            return Err(RasterError::InvalidDimensions(format!(
                "{} (pixel count overflows)", self)));
        }

        Ok(())
    }

    /// Number of elements in one band buffer
    pub fn pixels_per_band(&self) -> usize {
        self.width * self.height
    }

    /// Returns `[width, height, band_count]`
    pub fn as_array(&self) -> [usize; 3] {
        [self.width, self.height, self.band_count]
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.band_count)
    }
}

/// Builds dimensions from a `[width, height, band_count, ...]` slice
///
/// Fewer than three entries or any of the first three below 1 is rejected.
/// Extra entries are ignored.
impl TryFrom<&[i64]> for Dimensions {
    type Error = RasterError;

    fn try_from(values: &[i64]) -> RasterResult<Self> {
        if values.len() < 3 {
            return Err(RasterError::InvalidDimensions(format!(
                "expected 3 entries, got {}", values.len())));
        }

        let mut triple = [0usize; 3];
        for (slot, &value) in triple.iter_mut().zip(values) {
            if value < 1 {
                return Err(RasterError::InvalidDimensions(format!(
                    "entry {} is below 1 in {:?}", value, &values[..3])));
            }
            *slot = usize::try_from(value)
                .map_err(|_| RasterError::InvalidDimensions(format!("entry {} does not fit in usize", value)))?;
        }

        let dimensions = Dimensions::new(triple[0], triple[1], triple[2]);
        dimensions.validate()?;
        Ok(dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_entries_fail_validation() {
        assert!(Dimensions::new(4, 3, 2).validate().is_ok());
        assert!(Dimensions::new(0, 3, 2).validate().is_err());
        assert!(Dimensions::new(4, 0, 2).validate().is_err());
        assert!(Dimensions::new(4, 3, 0).validate().is_err());
    }

    #[test]
    fn test_slice_conversion_requires_three_positive_entries() {
        let dims = Dimensions::try_from(&[4i64, 3, 2][..]).unwrap();
        assert_eq!(dims.as_array(), [4, 3, 2]);
        assert_eq!(dims.pixels_per_band(), 12);

        assert!(matches!(Dimensions::try_from(&[4i64, 3][..]), Err(RasterError::InvalidDimensions(_))));
        assert!(matches!(Dimensions::try_from(&[4i64, -1, 2][..]), Err(RasterError::InvalidDimensions(_))));
    }

    #[test]
    fn test_display_uses_width_height_bands() {
        assert_eq!(Dimensions::new(4, 3, 2).to_string(), "4x3x2");
    }
}
