//! Element data types.
//!
//! This module provides the canonical definitions for the element types a
//! codec buffer may carry, on both sides of the transform.
//!
//! # Types
//!
//! - [`DataType`] - Runtime element type tag (closed set of integer and float widths)
//! - [`Sample`] - Trait implemented by every Rust type that backs a [`DataType`]
//!
//! # Usage
//!
//! ```rust
//! use anscombe_core::format::DataType;
//!
//! let decoded: DataType = "int16".parse().unwrap();
//! assert_eq!(decoded, DataType::I16);
//! assert_eq!(decoded.max_value(), 32767.0);
//!
//! // Encoded side is typically a narrow unsigned type
//! assert_eq!(DataType::U8.name(), "uint8");
//! ```

use std::fmt;
use std::str::FromStr;

use half::f16;
use serde::{Deserialize, Serialize};

use crate::buffer::Buffer;
use crate::error::Error;

/// Element type of a codec buffer.
///
/// Names follow array-storage metadata conventions (`"uint8"`,
/// `"int16"`, `"float32"`), which is also how the type is serialized.
///
/// # Variants
///
/// Integer formats:
/// - `U8`, `U16`, `U32`, `U64` - unsigned
/// - `I8`, `I16`, `I32`, `I64` - signed two's complement
///
/// Floating-point formats:
/// - `F16` - 16-bit half-precision IEEE 754
/// - `F32` - 32-bit single-precision IEEE 754
/// - `F64` - 64-bit double-precision IEEE 754
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 8-bit unsigned integer.
    #[serde(rename = "uint8")]
    U8,
    /// 16-bit unsigned integer.
    #[serde(rename = "uint16")]
    U16,
    /// 32-bit unsigned integer.
    #[serde(rename = "uint32")]
    U32,
    /// 64-bit unsigned integer.
    #[serde(rename = "uint64")]
    U64,
    /// 8-bit signed integer.
    #[serde(rename = "int8")]
    I8,
    /// 16-bit signed integer.
    #[serde(rename = "int16")]
    I16,
    /// 32-bit signed integer.
    #[serde(rename = "int32")]
    I32,
    /// 64-bit signed integer.
    #[serde(rename = "int64")]
    I64,
    /// 16-bit half-precision float.
    #[serde(rename = "float16")]
    F16,
    /// 32-bit single-precision float.
    #[serde(rename = "float32")]
    F32,
    /// 64-bit double-precision float.
    #[serde(rename = "float64")]
    F64,
}

impl DataType {
    /// Every supported data type, narrowest integers first.
    pub const ALL: [DataType; 11] = [
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::F16,
        Self::F32,
        Self::F64,
    ];

    /// Canonical name used in codec metadata.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::F16 => "float16",
            Self::F32 => "float32",
            Self::F64 => "float64",
        }
    }

    /// Number of bits per element.
    #[inline]
    pub const fn bits(&self) -> u32 {
        match self {
            Self::U8 | Self::I8 => 8,
            Self::U16 | Self::I16 | Self::F16 => 16,
            Self::U32 | Self::I32 | Self::F32 => 32,
            Self::U64 | Self::I64 | Self::F64 => 64,
        }
    }

    /// Bytes per element.
    #[inline]
    pub const fn size(&self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Whether this is a floating-point format.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F16 | Self::F32 | Self::F64)
    }

    /// Whether this is an integer format.
    #[inline]
    pub const fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Whether the type can hold negative values.
    #[inline]
    pub const fn is_signed(&self) -> bool {
        !matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    /// Smallest representable (finite) value.
    pub fn min_value(&self) -> f64 {
        match self {
            Self::U8 | Self::U16 | Self::U32 | Self::U64 => 0.0,
            Self::I8 => i8::MIN as f64,
            Self::I16 => i16::MIN as f64,
            Self::I32 => i32::MIN as f64,
            Self::I64 => i64::MIN as f64,
            Self::F16 => f16::MIN.to_f64(),
            Self::F32 => f32::MIN as f64,
            Self::F64 => f64::MIN,
        }
    }

    /// Largest representable (finite) value.
    ///
    /// For 64-bit integers the value is the nearest `f64`, which rounds
    /// up by one unit; conversions back saturate.
    pub fn max_value(&self) -> f64 {
        match self {
            Self::U8 => u8::MAX as f64,
            Self::U16 => u16::MAX as f64,
            Self::U32 => u32::MAX as f64,
            Self::U64 => u64::MAX as f64,
            Self::I8 => i8::MAX as f64,
            Self::I16 => i16::MAX as f64,
            Self::I32 => i32::MAX as f64,
            Self::I64 => i64::MAX as f64,
            Self::F16 => f16::MAX.to_f64(),
            Self::F32 => f32::MAX as f64,
            Self::F64 => f64::MAX,
        }
    }

    /// Clamps a real value into this type's representable range, rounding
    /// to nearest (half away from zero) for integer types.
    ///
    /// NaN maps to `0` for integer types and stays NaN for floats.
    ///
    /// # Example
    ///
    /// ```rust
    /// use anscombe_core::DataType;
    ///
    /// assert_eq!(DataType::U8.quantize(2.5), 3.0);
    /// assert_eq!(DataType::U8.quantize(-4.0), 0.0);
    /// assert_eq!(DataType::U8.quantize(1e9), 255.0);
    /// ```
    pub fn quantize(&self, v: f64) -> f64 {
        if self.is_float() {
            if v.is_nan() {
                return v;
            }
            return v.clamp(self.min_value(), self.max_value());
        }
        if v.is_nan() {
            return 0.0;
        }
        v.round().clamp(self.min_value(), self.max_value())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = Error;

    /// Parses canonical names (`"uint8"`) and Rust short names (`"u8"`),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let dtype = match lower.as_str() {
            "uint8" | "u8" => Self::U8,
            "uint16" | "u16" => Self::U16,
            "uint32" | "u32" => Self::U32,
            "uint64" | "u64" => Self::U64,
            "int8" | "i8" => Self::I8,
            "int16" | "i16" => Self::I16,
            "int32" | "i32" => Self::I32,
            "int64" | "i64" => Self::I64,
            "float16" | "f16" | "half" => Self::F16,
            "float32" | "f32" | "float" => Self::F32,
            "float64" | "f64" | "double" => Self::F64,
            _ => return Err(Error::UnknownDtype(s.to_string())),
        };
        Ok(dtype)
    }
}

/// Trait for element types that can live in a [`Buffer`].
///
/// Implemented for `u8 u16 u32 u64 i8 i16 i32 i64`, [`half::f16`], `f32`
/// and `f64`. All arithmetic in the codec is carried out in `f64`; this
/// trait is the boundary where values enter and leave that domain.
///
/// # Example
///
/// ```
/// use anscombe_core::{DataType, Sample};
///
/// assert_eq!(<u8 as Sample>::DATA_TYPE, DataType::U8);
/// assert_eq!(<u8 as Sample>::from_f64(254.6), 255);
/// assert_eq!(<i16 as Sample>::from_f64(-1e9), i16::MIN);
/// ```
pub trait Sample: Copy + Send + Sync + PartialOrd + fmt::Debug + 'static {
    /// Runtime tag for this type.
    const DATA_TYPE: DataType;

    /// Widen to `f64`.
    fn to_f64(self) -> f64;

    /// Narrow from `f64`, rounding to nearest and saturating for integers.
    fn from_f64(v: f64) -> Self;

    /// Read one element from exactly `size_of::<Self>()` little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Append the little-endian representation to `out`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Borrow the buffer contents if it holds this type.
    fn slice_of(buffer: &Buffer) -> Option<&[Self]>;

    /// Wrap a vector of this type into a [`Buffer`].
    fn into_buffer(values: Vec<Self>) -> Buffer;
}

macro_rules! impl_sample_int {
    ($t:ty, $variant:ident) => {
        impl Sample for $t {
            const DATA_TYPE: DataType = DataType::$variant;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                // float-to-int `as` saturates and maps NaN to 0
                v.round() as $t
            }

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(bytes);
                <$t>::from_le_bytes(raw)
            }

            #[inline]
            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn slice_of(buffer: &Buffer) -> Option<&[Self]> {
                match buffer {
                    Buffer::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_buffer(values: Vec<Self>) -> Buffer {
                Buffer::$variant(values)
            }
        }
    };
}

impl_sample_int!(u8, U8);
impl_sample_int!(u16, U16);
impl_sample_int!(u32, U32);
impl_sample_int!(u64, U64);
impl_sample_int!(i8, I8);
impl_sample_int!(i16, I16);
impl_sample_int!(i32, I32);
impl_sample_int!(i64, I64);

impl Sample for f16 {
    const DATA_TYPE: DataType = DataType::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        f16::from_f64(DataType::F16.quantize(v))
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        f16::from_le_bytes([bytes[0], bytes[1]])
    }

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn slice_of(buffer: &Buffer) -> Option<&[Self]> {
        match buffer {
            Buffer::F16(v) => Some(v),
            _ => None,
        }
    }

    fn into_buffer(values: Vec<Self>) -> Buffer {
        Buffer::F16(values)
    }
}

impl Sample for f32 {
    const DATA_TYPE: DataType = DataType::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        DataType::F32.quantize(v) as f32
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn slice_of(buffer: &Buffer) -> Option<&[Self]> {
        match buffer {
            Buffer::F32(v) => Some(v),
            _ => None,
        }
    }

    fn into_buffer(values: Vec<Self>) -> Buffer {
        Buffer::F32(values)
    }
}

impl Sample for f64 {
    const DATA_TYPE: DataType = DataType::F64;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        f64::from_le_bytes(raw)
    }

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn slice_of(buffer: &Buffer) -> Option<&[Self]> {
        match buffer {
            Buffer::F64(v) => Some(v),
            _ => None,
        }
    }

    fn into_buffer(values: Vec<Self>) -> Buffer {
        Buffer::F64(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for dtype in DataType::ALL {
            let parsed: DataType = dtype.name().parse().unwrap();
            assert_eq!(parsed, dtype);
        }
        assert_eq!("U16".parse::<DataType>().unwrap(), DataType::U16);
        assert!("complex64".parse::<DataType>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DataType::I16).unwrap();
        assert_eq!(json, "\"int16\"");
        let back: DataType = serde_json::from_str("\"float32\"").unwrap();
        assert_eq!(back, DataType::F32);
    }

    #[test]
    fn test_ranges() {
        assert_eq!(DataType::U8.min_value(), 0.0);
        assert_eq!(DataType::U8.max_value(), 255.0);
        assert_eq!(DataType::I16.min_value(), -32768.0);
        assert_eq!(DataType::F16.max_value(), 65504.0);
        assert_eq!(DataType::I32.size(), 4);
        assert!(DataType::F16.is_float());
        assert!(DataType::I8.is_signed());
        assert!(!DataType::U64.is_signed());
    }

    #[test]
    fn test_quantize_rounds_to_nearest() {
        assert_eq!(DataType::U8.quantize(3.49), 3.0);
        assert_eq!(DataType::U8.quantize(3.5), 4.0);
        assert_eq!(DataType::I8.quantize(-2.5), -3.0);
        assert_eq!(DataType::I8.quantize(-500.0), -128.0);
        assert_eq!(DataType::U16.quantize(f64::NAN), 0.0);
        assert!(DataType::F32.quantize(f64::NAN).is_nan());
        assert_eq!(DataType::F32.quantize(1e300), f32::MAX as f64);
    }

    #[test]
    fn test_sample_saturates() {
        assert_eq!(<u8 as Sample>::from_f64(300.0), 255);
        assert_eq!(<u8 as Sample>::from_f64(-1.0), 0);
        assert_eq!(<i16 as Sample>::from_f64(40000.0), i16::MAX);
        assert_eq!(<u32 as Sample>::from_f64(f64::NAN), 0);
        assert_eq!(<f16 as Sample>::from_f64(1e6), f16::MAX);
        assert!(<f32 as Sample>::from_f64(1e300).is_finite());
    }

    #[test]
    fn test_le_bytes() {
        let mut out = Vec::new();
        (-2i16).write_le(&mut out);
        assert_eq!(out, vec![0xFE, 0xFF]);
        assert_eq!(<i16 as Sample>::read_le(&out), -2);

        out.clear();
        1.5f32.write_le(&mut out);
        assert_eq!(<f32 as Sample>::read_le(&out), 1.5);
    }
}
