//! Typed element buffers.
//!
//! A [`Buffer`] is one contiguous chunk of elements as handed over by the
//! storage host. It is a tagged variant over owned vectors, one variant per
//! [`DataType`], so every operation dispatches on the tag instead of
//! inspecting types at runtime.
//!
//! # Example
//!
//! ```rust
//! use anscombe_core::{Buffer, DataType};
//!
//! let buf = Buffer::from(vec![0i16, 20, 50]);
//! assert_eq!(buf.dtype(), DataType::I16);
//!
//! let bytes = buf.to_le_bytes();
//! let back = Buffer::from_le_bytes(DataType::I16, &bytes).unwrap();
//! assert_eq!(back, buf);
//! ```

use half::f16;

use crate::error::{Error, Result};
use crate::format::{DataType, Sample};

/// A contiguous buffer of elements of one [`DataType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    /// `uint8` elements
    U8(Vec<u8>),
    /// `uint16` elements
    U16(Vec<u16>),
    /// `uint32` elements
    U32(Vec<u32>),
    /// `uint64` elements
    U64(Vec<u64>),
    /// `int8` elements
    I8(Vec<i8>),
    /// `int16` elements
    I16(Vec<i16>),
    /// `int32` elements
    I32(Vec<i32>),
    /// `int64` elements
    I64(Vec<i64>),
    /// `float16` elements
    F16(Vec<f16>),
    /// `float32` elements
    F32(Vec<f32>),
    /// `float64` elements
    F64(Vec<f64>),
}

/// Runs `$body` with `$v` bound to the inner vector of any variant.
macro_rules! dispatch {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            Buffer::U8($v) => $body,
            Buffer::U16($v) => $body,
            Buffer::U32($v) => $body,
            Buffer::U64($v) => $body,
            Buffer::I8($v) => $body,
            Buffer::I16($v) => $body,
            Buffer::I32($v) => $body,
            Buffer::I64($v) => $body,
            Buffer::F16($v) => $body,
            Buffer::F32($v) => $body,
            Buffer::F64($v) => $body,
        }
    };
}

fn collect_as<T: Sample>(values: &[f64]) -> Buffer {
    T::into_buffer(values.iter().map(|&v| T::from_f64(v)).collect())
}

fn parse_as<T: Sample>(bytes: &[u8]) -> Buffer {
    let width = std::mem::size_of::<T>();
    T::into_buffer(bytes.chunks_exact(width).map(T::read_le).collect())
}

impl Buffer {
    /// Element type carried by this buffer.
    pub fn dtype(&self) -> DataType {
        match self {
            Self::U8(_) => DataType::U8,
            Self::U16(_) => DataType::U16,
            Self::U32(_) => DataType::U32,
            Self::U64(_) => DataType::U64,
            Self::I8(_) => DataType::I8,
            Self::I16(_) => DataType::I16,
            Self::I32(_) => DataType::I32,
            Self::I64(_) => DataType::I64,
            Self::F16(_) => DataType::F16,
            Self::F32(_) => DataType::F32,
            Self::F64(_) => DataType::F64,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        dispatch!(self, v => v.len())
    }

    /// Returns true if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `index` widened to `f64`.
    pub fn get(&self, index: usize) -> Option<f64> {
        dispatch!(self, v => v.get(index).map(|x| x.to_f64()))
    }

    /// Borrows the contents as `&[T]` when `T` matches the buffer type.
    ///
    /// ```rust
    /// use anscombe_core::Buffer;
    ///
    /// let buf = Buffer::from(vec![1u8, 2, 3]);
    /// assert_eq!(buf.as_slice::<u8>(), Some(&[1u8, 2, 3][..]));
    /// assert!(buf.as_slice::<i16>().is_none());
    /// ```
    pub fn as_slice<T: Sample>(&self) -> Option<&[T]> {
        T::slice_of(self)
    }

    /// All elements widened to `f64`.
    pub fn to_f64(&self) -> Vec<f64> {
        dispatch!(self, v => v.iter().map(|x| x.to_f64()).collect())
    }

    /// Builds a buffer of `dtype` from real values.
    ///
    /// Integer targets round to nearest and saturate at the type's range;
    /// float targets clamp to their finite range.
    pub fn from_f64(dtype: DataType, values: &[f64]) -> Self {
        match dtype {
            DataType::U8 => collect_as::<u8>(values),
            DataType::U16 => collect_as::<u16>(values),
            DataType::U32 => collect_as::<u32>(values),
            DataType::U64 => collect_as::<u64>(values),
            DataType::I8 => collect_as::<i8>(values),
            DataType::I16 => collect_as::<i16>(values),
            DataType::I32 => collect_as::<i32>(values),
            DataType::I64 => collect_as::<i64>(values),
            DataType::F16 => collect_as::<f16>(values),
            DataType::F32 => collect_as::<f32>(values),
            DataType::F64 => collect_as::<f64>(values),
        }
    }

    /// Parses little-endian element bytes.
    ///
    /// Fails with [`Error::BufferLength`] when `bytes` is not a whole number
    /// of elements.
    pub fn from_le_bytes(dtype: DataType, bytes: &[u8]) -> Result<Self> {
        let width = dtype.size();
        if bytes.len() % width != 0 {
            return Err(Error::BufferLength {
                len: bytes.len(),
                width,
            });
        }
        let buf = match dtype {
            DataType::U8 => parse_as::<u8>(bytes),
            DataType::U16 => parse_as::<u16>(bytes),
            DataType::U32 => parse_as::<u32>(bytes),
            DataType::U64 => parse_as::<u64>(bytes),
            DataType::I8 => parse_as::<i8>(bytes),
            DataType::I16 => parse_as::<i16>(bytes),
            DataType::I32 => parse_as::<i32>(bytes),
            DataType::I64 => parse_as::<i64>(bytes),
            DataType::F16 => parse_as::<f16>(bytes),
            DataType::F32 => parse_as::<f32>(bytes),
            DataType::F64 => parse_as::<f64>(bytes),
        };
        Ok(buf)
    }

    /// Serializes the elements as little-endian bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() * self.dtype().size());
        dispatch!(self, v => v.iter().for_each(|x| x.write_le(&mut out)));
        out
    }
}

macro_rules! impl_from_vec {
    ($($t:ty),*) => {
        $(
            impl From<Vec<$t>> for Buffer {
                fn from(values: Vec<$t>) -> Self {
                    <$t as Sample>::into_buffer(values)
                }
            }
        )*
    };
}

impl_from_vec!(u8, u16, u32, u64, i8, i16, i32, i64, f16, f32, f64);
