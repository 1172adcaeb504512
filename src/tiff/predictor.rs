//! Horizontal differencing predictor
//!
//! Operates on little-endian component values, one block row at a time.
//! `stride` is the number of components per pixel in the block, so each
//! sample is differenced against the same sample of the previous pixel.

use crate::errors::{RasterError, RasterResult};

fn check_args(data: &[u8], row_components: usize, stride: usize, component_size: usize) -> RasterResult<()> {
    if !matches!(component_size, 1 | 2 | 4 | 8) {
        return Err(RasterError::GenericError(format!(
            "Horizontal predictor does not support {}-byte components", component_size)));
    }
    if stride == 0 || row_components == 0 || data.len() % (row_components * component_size) != 0 {
        return Err(RasterError::GenericError(format!(
            "Predictor block of {} bytes is not a whole number of {}-component rows",
            data.len(), row_components)));
    }
    Ok(())
}

fn get(data: &[u8], idx: usize, size: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes[..size].copy_from_slice(&data[idx * size..(idx + 1) * size]);
    u64::from_le_bytes(bytes)
}

fn set(data: &mut [u8], idx: usize, size: usize, value: u64) {
    data[idx * size..(idx + 1) * size].copy_from_slice(&value.to_le_bytes()[..size]);
}

/// Reverses horizontal differencing in place
pub fn undo_horizontal(data: &mut [u8], row_components: usize, stride: usize, component_size: usize) -> RasterResult<()> {
    check_args(data, row_components, stride, component_size)?;
    let row_bytes = row_components * component_size;

    for row in data.chunks_exact_mut(row_bytes) {
        for i in stride..row_components {
            let value = get(row, i, component_size).wrapping_add(get(row, i - stride, component_size));
            set(row, i, component_size, value);
        }
    }
    Ok(())
}

/// Applies horizontal differencing in place
pub fn apply_horizontal(data: &mut [u8], row_components: usize, stride: usize, component_size: usize) -> RasterResult<()> {
    check_args(data, row_components, stride, component_size)?;
    let row_bytes = row_components * component_size;

    for row in data.chunks_exact_mut(row_bytes) {
        // Walk backwards so every difference uses the original left neighbour
        for i in (stride..row_components).rev() {
            let value = get(row, i, component_size).wrapping_sub(get(row, i - stride, component_size));
            set(row, i, component_size, value);
        }
    }
    Ok(())
}
