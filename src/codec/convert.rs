//! Sample conversion between codec types
//!
//! Drivers store samples in their on-disk type and convert on every row
//! transfer. Integer targets clamp to their range and round half away from
//! zero; NaN becomes 0. Complex to real keeps the real part, real to complex
//! sets the imaginary part to 0.

use crate::codec::CodecType;
use crate::errors::{RasterError, RasterResult};

/// Converts `count` samples from `src_type` to `dst_type`
///
/// Both buffers hold little-endian samples. Identical types are copied
/// verbatim.
pub fn convert_samples(
    src: &[u8],
    src_type: CodecType,
    dst: &mut [u8],
    dst_type: CodecType,
    count: usize
) -> RasterResult<()> {
    let src_size = src_type.size_in_bytes();
    let dst_size = dst_type.size_in_bytes();

    if src_size == 0 {
        return Err(RasterError::UnsupportedDataType(src_type, "conversion source".to_string()));
    }
    if dst_size == 0 {
        return Err(RasterError::UnsupportedDataType(dst_type, "conversion target".to_string()));
    }

    if src.len() < count * src_size || dst.len() < count * dst_size {
        return Err(RasterError::GenericError(format!(
            "Conversion buffers too small for {} samples ({} -> {})", count, src_type, dst_type)));
    }

    if src_type == dst_type {
        dst[..count * dst_size].copy_from_slice(&src[..count * src_size]);
        return Ok(());
    }

    for (s, d) in src.chunks_exact(src_size).zip(dst.chunks_exact_mut(dst_size)).take(count) {
        let (re, im) = decode_sample(s, src_type);
        encode_sample(re, im, d, dst_type);
    }

    Ok(())
}

fn le16(b: &[u8]) -> [u8; 2] {
    [b[0], b[1]]
}

fn le32(b: &[u8]) -> [u8; 4] {
    [b[0], b[1], b[2], b[3]]
}

fn le64(b: &[u8]) -> [u8; 8] {
    [b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]
}

/// Decodes one sample into its (real, imaginary) parts
fn decode_sample(b: &[u8], ty: CodecType) -> (f64, f64) {
    match ty {
        CodecType::Byte => (b[0] as f64, 0.0),
        CodecType::UInt16 => (u16::from_le_bytes(le16(b)) as f64, 0.0),
        CodecType::Int16 => (i16::from_le_bytes(le16(b)) as f64, 0.0),
        CodecType::UInt32 => (u32::from_le_bytes(le32(b)) as f64, 0.0),
        CodecType::Int32 => (i32::from_le_bytes(le32(b)) as f64, 0.0),
        CodecType::Float32 => (f32::from_le_bytes(le32(b)) as f64, 0.0),
        CodecType::Float64 => (f64::from_le_bytes(le64(b)), 0.0),
        CodecType::CInt16 => (
            i16::from_le_bytes(le16(b)) as f64,
            i16::from_le_bytes(le16(&b[2..])) as f64,
        ),
        CodecType::CInt32 => (
            i32::from_le_bytes(le32(b)) as f64,
            i32::from_le_bytes(le32(&b[4..])) as f64,
        ),
        CodecType::CFloat32 => (
            f32::from_le_bytes(le32(b)) as f64,
            f32::from_le_bytes(le32(&b[4..])) as f64,
        ),
        CodecType::CFloat64 => (
            f64::from_le_bytes(le64(b)),
            f64::from_le_bytes(le64(&b[8..])),
        ),
        CodecType::Unknown => (0.0, 0.0),
    }
}

/// Rounds and clamps a value into an integer range
fn clamp_round(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.round().clamp(min, max)
    }
}

fn encode_sample(re: f64, im: f64, out: &mut [u8], ty: CodecType) {
    match ty {
        CodecType::Byte => out[0] = clamp_round(re, 0.0, u8::MAX as f64) as u8,
        CodecType::UInt16 => {
            let v = clamp_round(re, 0.0, u16::MAX as f64) as u16;
            out[..2].copy_from_slice(&v.to_le_bytes());
        },
        CodecType::Int16 => {
            let v = clamp_round(re, i16::MIN as f64, i16::MAX as f64) as i16;
            out[..2].copy_from_slice(&v.to_le_bytes());
        },
        CodecType::UInt32 => {
            let v = clamp_round(re, 0.0, u32::MAX as f64) as u32;
            out[..4].copy_from_slice(&v.to_le_bytes());
        },
        CodecType::Int32 => {
            let v = clamp_round(re, i32::MIN as f64, i32::MAX as f64) as i32;
            out[..4].copy_from_slice(&v.to_le_bytes());
        },
        CodecType::Float32 => out[..4].copy_from_slice(&(re as f32).to_le_bytes()),
        CodecType::Float64 => out[..8].copy_from_slice(&re.to_le_bytes()),
        CodecType::CInt16 => {
            let r = clamp_round(re, i16::MIN as f64, i16::MAX as f64) as i16;
            let i = clamp_round(im, i16::MIN as f64, i16::MAX as f64) as i16;
            out[..2].copy_from_slice(&r.to_le_bytes());
            out[2..4].copy_from_slice(&i.to_le_bytes());
        },
        CodecType::CInt32 => {
            let r = clamp_round(re, i32::MIN as f64, i32::MAX as f64) as i32;
            let i = clamp_round(im, i32::MIN as f64, i32::MAX as f64) as i32;
            out[..4].copy_from_slice(&r.to_le_bytes());
            out[4..8].copy_from_slice(&i.to_le_bytes());
        },
        CodecType::CFloat32 => {
            out[..4].copy_from_slice(&(re as f32).to_le_bytes());
            out[4..8].copy_from_slice(&(im as f32).to_le_bytes());
        },
        CodecType::CFloat64 => {
            out[..8].copy_from_slice(&re.to_le_bytes());
            out[8..16].copy_from_slice(&im.to_le_bytes());
        },
        CodecType::Unknown => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_type_is_copied_verbatim() {
        let src = [1u8, 2, 3, 4];
        let mut dst = [0u8; 4];
        convert_samples(&src, CodecType::UInt16, &mut dst, CodecType::UInt16, 2).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_float_to_byte_rounds_and_clamps() {
        let values = [-3.0f32, 1.5, 254.4, 300.0, f32::NAN];
        let src: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut dst = [0u8; 5];
        convert_samples(&src, CodecType::Float32, &mut dst, CodecType::Byte, 5).unwrap();
        assert_eq!(dst, [0, 2, 254, 255, 0]);
    }

    #[test]
    fn test_byte_widens_to_complex_with_zero_imaginary() {
        let src = [7u8];
        let mut dst = [0u8; 8];
        convert_samples(&src, CodecType::Byte, &mut dst, CodecType::CFloat32, 1).unwrap();
        assert_eq!(f32::from_le_bytes([dst[0], dst[1], dst[2], dst[3]]), 7.0);
        assert_eq!(f32::from_le_bytes([dst[4], dst[5], dst[6], dst[7]]), 0.0);
    }

    #[test]
    fn test_complex_to_real_keeps_real_part() {
        let mut src = Vec::new();
        src.extend_from_slice(&(-40i32).to_le_bytes());
        src.extend_from_slice(&9i32.to_le_bytes());
        let mut dst = [0u8; 2];
        convert_samples(&src, CodecType::CInt32, &mut dst, CodecType::Int16, 1).unwrap();
        assert_eq!(i16::from_le_bytes(dst), -40);
    }

    #[test]
    fn test_unknown_types_are_rejected() {
        let mut dst = [0u8; 1];
        let result = convert_samples(&[0u8], CodecType::Byte, &mut dst, CodecType::Unknown, 1);
        assert!(matches!(result, Err(RasterError::UnsupportedDataType(CodecType::Unknown, _))));
    }
}
