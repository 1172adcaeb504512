//! Codec-side sample data types
//!
//! A [`CodecType`] names how one sample is laid out when it crosses the codec
//! boundary, both on disk and in a row transfer. Row transfer bytes are always
//! little-endian; complex types store the real part first.

use std::fmt;

/// Sample data types understood by the codec collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecType {
    /// No codec equivalent
    Unknown,
    /// Unsigned 8-bit integer
    Byte,
    /// Unsigned 16-bit integer
    UInt16,
    /// Signed 16-bit integer
    Int16,
    /// Unsigned 32-bit integer
    UInt32,
    /// Signed 32-bit integer
    Int32,
    /// 32-bit IEEE float
    Float32,
    /// 64-bit IEEE float
    Float64,
    /// Complex of two signed 16-bit integers
    CInt16,
    /// Complex of two signed 32-bit integers
    CInt32,
    /// Complex of two 32-bit floats
    CFloat32,
    /// Complex of two 64-bit floats
    CFloat64,
}

impl CodecType {
    /// Size in bytes of one sample (both parts for complex types)
    pub fn size_in_bytes(&self) -> usize {
        match self {
            CodecType::Unknown => 0,
            CodecType::Byte => 1,
            CodecType::UInt16 | CodecType::Int16 => 2,
            CodecType::UInt32 | CodecType::Int32 | CodecType::Float32 | CodecType::CInt16 => 4,
            CodecType::Float64 | CodecType::CInt32 | CodecType::CFloat32 => 8,
            CodecType::CFloat64 => 16,
        }
    }

    /// Size in bytes of one numeric component
    ///
    /// Equal to the sample size for real types and half of it for complex ones.
    /// Byte swapping works on components.
    pub fn component_size(&self) -> usize {
        if self.is_complex() {
            self.size_in_bytes() / 2
        } else {
            self.size_in_bytes()
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, CodecType::CInt16 | CodecType::CInt32 | CodecType::CFloat32 | CodecType::CFloat64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, CodecType::Float32 | CodecType::Float64 | CodecType::CFloat32 | CodecType::CFloat64)
    }

    pub fn is_integer(&self) -> bool {
        *self != CodecType::Unknown && !self.is_float()
    }

    /// Returns the conventional name of this type
    pub fn name(&self) -> &'static str {
        match self {
            CodecType::Unknown => "Unknown",
            CodecType::Byte => "Byte",
            CodecType::UInt16 => "UInt16",
            CodecType::Int16 => "Int16",
            CodecType::UInt32 => "UInt32",
            CodecType::Int32 => "Int32",
            CodecType::Float32 => "Float32",
            CodecType::Float64 => "Float64",
            CodecType::CInt16 => "CInt16",
            CodecType::CInt32 => "CInt32",
            CodecType::CFloat32 => "CFloat32",
            CodecType::CFloat64 => "CFloat64",
        }
    }

    /// Looks a type up by name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        let all = [
            CodecType::Byte, CodecType::UInt16, CodecType::Int16, CodecType::UInt32,
            CodecType::Int32, CodecType::Float32, CodecType::Float64, CodecType::CInt16,
            CodecType::CInt32, CodecType::CFloat32, CodecType::CFloat64,
        ];
        all.into_iter().find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for CodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_types_split_into_two_components() {
        assert_eq!(CodecType::CInt16.size_in_bytes(), 4);
        assert_eq!(CodecType::CInt16.component_size(), 2);
        assert_eq!(CodecType::CFloat64.component_size(), 8);
        assert_eq!(CodecType::Float32.component_size(), 4);
    }

    #[test]
    fn test_names_round_trip_case_insensitively() {
        assert_eq!(CodecType::from_name("cfloat32"), Some(CodecType::CFloat32));
        assert_eq!(CodecType::from_name("BYTE"), Some(CodecType::Byte));
        assert_eq!(CodecType::from_name("Unknown"), None);
    }

    #[test]
    fn test_unknown_is_neither_integer_nor_float() {
        assert!(!CodecType::Unknown.is_integer());
        assert!(!CodecType::Unknown.is_float());
        assert!(CodecType::CInt32.is_integer());
    }
}
