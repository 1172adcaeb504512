//! In-memory element types and their codec mapping
//!
//! Every buffer element type implements [`Element`], which carries a runtime
//! [`ElementType`] tag and knows how to move itself in and out of the
//! little-endian row transfer layout. The tag maps to a [`CodecType`] through
//! [`map_element_type`]; types without a codec equivalent map to
//! [`CodecType::Unknown`] and are rejected before any I/O happens.

use std::fmt;
use std::mem::size_of;

use num_complex::Complex;

use crate::codec::CodecType;

/// Runtime tag for an in-memory element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
    ComplexUInt16,
    ComplexInt16,
    ComplexInt32,
    ComplexFloat32,
    ComplexFloat64,
}

impl ElementType {
    /// Returns the codec type used to transfer this element type
    pub fn codec_type(&self) -> CodecType {
        map_element_type(*self)
    }

    pub fn is_supported(&self) -> bool {
        self.codec_type() != CodecType::Unknown
    }

    pub fn name(&self) -> &'static str {
        match self {
            ElementType::UInt8 => "u8",
            ElementType::Int8 => "i8",
            ElementType::UInt16 => "u16",
            ElementType::Int16 => "i16",
            ElementType::UInt32 => "u32",
            ElementType::Int32 => "i32",
            ElementType::UInt64 => "u64",
            ElementType::Int64 => "i64",
            ElementType::Float32 => "f32",
            ElementType::Float64 => "f64",
            ElementType::ComplexUInt16 => "Complex<u16>",
            ElementType::ComplexInt16 => "Complex<i16>",
            ElementType::ComplexInt32 => "Complex<i32>",
            ElementType::ComplexFloat32 => "Complex<f32>",
            ElementType::ComplexFloat64 => "Complex<f64>",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps an element type to the codec type it is transferred as
///
/// Complex unsigned 16-bit data travels as `CInt16`: both layouts are two
/// 16-bit components, so the bits pass through unchanged.
pub fn map_element_type(element: ElementType) -> CodecType {
    match element {
        ElementType::UInt8 => CodecType::Byte,
        ElementType::Int16 => CodecType::Int16,
        ElementType::UInt16 => CodecType::UInt16,
        ElementType::Int32 => CodecType::Int32,
        ElementType::Float32 => CodecType::Float32,
        ElementType::Float64 => CodecType::Float64,
        ElementType::ComplexUInt16 => CodecType::CInt16,
        ElementType::ComplexInt32 => CodecType::CInt32,
        ElementType::ComplexFloat32 => CodecType::CFloat32,
        ElementType::ComplexFloat64 => CodecType::CFloat64,
        ElementType::Int8
        | ElementType::UInt32
        | ElementType::UInt64
        | ElementType::Int64
        | ElementType::ComplexInt16 => CodecType::Unknown,
    }
}

/// A numeric type that can live in a band buffer
pub trait Element: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Runtime tag of this type
    const ELEMENT_TYPE: ElementType;

    /// Size of one element in the transfer layout
    const SIZE: usize = size_of::<Self>();

    /// Writes the element as little-endian bytes into `out[..Self::SIZE]`
    fn write_le(&self, out: &mut [u8]);

    /// Reads an element from little-endian bytes in `bytes[..Self::SIZE]`
    fn read_le(bytes: &[u8]) -> Self;
}

/// Codec type of an element type parameter
pub fn codec_type_of<T: Element>() -> CodecType {
    T::ELEMENT_TYPE.codec_type()
}

/// Decodes a little-endian row into elements
pub fn decode_elements<T: Element>(bytes: &[u8], out: &mut [T]) {
    for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(T::SIZE)) {
        *value = T::read_le(chunk);
    }
}

/// Encodes elements into a little-endian row
pub fn encode_elements<T: Element>(values: &[T], out: &mut [u8]) {
    for (value, chunk) in values.iter().zip(out.chunks_exact_mut(T::SIZE)) {
        value.write_le(chunk);
    }
}

macro_rules! impl_element {
    ($t:ty, $tag:ident) => {
        impl Element for $t {
            const ELEMENT_TYPE: ElementType = ElementType::$tag;

            fn write_le(&self, out: &mut [u8]) {
                out[..size_of::<$t>()].copy_from_slice(&self.to_le_bytes());
            }

            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; size_of::<$t>()];
                raw.copy_from_slice(&bytes[..size_of::<$t>()]);
                <$t>::from_le_bytes(raw)
            }
        }
    };
}

macro_rules! impl_complex_element {
    ($t:ty, $tag:ident) => {
        impl Element for Complex<$t> {
            const ELEMENT_TYPE: ElementType = ElementType::$tag;

            fn write_le(&self, out: &mut [u8]) {
                let half = size_of::<$t>();
                self.re.write_le(&mut out[..half]);
                self.im.write_le(&mut out[half..2 * half]);
            }

            fn read_le(bytes: &[u8]) -> Self {
                let half = size_of::<$t>();
                Complex::new(<$t>::read_le(&bytes[..half]), <$t>::read_le(&bytes[half..2 * half]))
            }
        }
    };
}

impl_element!(u8, UInt8);
impl_element!(i8, Int8);
impl_element!(u16, UInt16);
impl_element!(i16, Int16);
impl_element!(u32, UInt32);
impl_element!(i32, Int32);
impl_element!(u64, UInt64);
impl_element!(i64, Int64);
impl_element!(f32, Float32);
impl_element!(f64, Float64);

impl_complex_element!(u16, ComplexUInt16);
impl_complex_element!(i16, ComplexInt16);
impl_complex_element!(i32, ComplexInt32);
impl_complex_element!(f32, ComplexFloat32);
impl_complex_element!(f64, ComplexFloat64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_types_map_to_known_codec_types() {
        let supported = [
            (codec_type_of::<u8>(), CodecType::Byte),
            (codec_type_of::<i16>(), CodecType::Int16),
            (codec_type_of::<u16>(), CodecType::UInt16),
            (codec_type_of::<i32>(), CodecType::Int32),
            (codec_type_of::<f32>(), CodecType::Float32),
            (codec_type_of::<f64>(), CodecType::Float64),
            (codec_type_of::<Complex<u16>>(), CodecType::CInt16),
            (codec_type_of::<Complex<i32>>(), CodecType::CInt32),
            (codec_type_of::<Complex<f32>>(), CodecType::CFloat32),
            (codec_type_of::<Complex<f64>>(), CodecType::CFloat64),
        ];
        for (actual, expected) in supported {
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_unsupported_types_map_to_unknown() {
        assert_eq!(codec_type_of::<i8>(), CodecType::Unknown);
        assert_eq!(codec_type_of::<u32>(), CodecType::Unknown);
        assert_eq!(codec_type_of::<u64>(), CodecType::Unknown);
        assert_eq!(codec_type_of::<i64>(), CodecType::Unknown);
        assert_eq!(codec_type_of::<Complex<i16>>(), CodecType::Unknown);
        assert!(!ElementType::Int64.is_supported());
    }

    #[test]
    fn test_transfer_size_matches_codec_size_for_supported_types() {
        assert_eq!(<u8 as Element>::SIZE, CodecType::Byte.size_in_bytes());
        assert_eq!(<Complex<u16> as Element>::SIZE, CodecType::CInt16.size_in_bytes());
        assert_eq!(<Complex<f64> as Element>::SIZE, CodecType::CFloat64.size_in_bytes());
    }

    #[test]
    fn test_complex_elements_store_real_part_first() {
        let value = Complex::new(0x0102u16, 0x0304u16);
        let mut bytes = [0u8; 4];
        value.write_le(&mut bytes);
        assert_eq!(bytes, [0x02, 0x01, 0x04, 0x03]);
        assert_eq!(Complex::<u16>::read_le(&bytes), value);
    }

    #[test]
    fn test_decode_elements_fills_the_output_slice() {
        let bytes = [1u8, 0, 2, 0, 0xff, 0xff];
        let mut out = [0i16; 3];
        decode_elements(&bytes, &mut out);
        assert_eq!(out, [1, 2, -1]);
    }
}
