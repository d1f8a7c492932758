//! Error types for anscombe-core operations.
//!
//! This module provides the error family shared by every crate in the
//! workspace that validates configuration or handles typed buffers.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes that can occur during:
//! - Construction of [`TransformParameters`](crate::TransformParameters)
//! - Selection of a decoded/encoded [`DataType`](crate::DataType) pair
//! - Conversion between raw bytes and typed [`Buffer`](crate::Buffer)s
//!
//! All configuration errors are raised at construction time. Nothing in
//! this family is ever deferred to encode/decode of an individual element.
//!
//! # Usage
//!
//! ```rust
//! use anscombe_core::{Error, Result};
//!
//! fn check_gain(gain: f64) -> Result<f64> {
//!     if !(gain > 0.0) {
//!         return Err(Error::invalid_parameter("conversion_gain", gain, "must be > 0"));
//!     }
//!     Ok(gain)
//! }
//!
//! assert!(check_gain(0.0).unwrap_err().is_configuration_error());
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation
//!
//! # Used By
//!
//! - `anscombe-lut` - table build failures
//! - `anscombe-codec` - wrapped in `CodecError`

use crate::format::DataType;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring the transform or handling buffers.
///
/// # Categories
///
/// - **Configuration errors**: [`InvalidParameter`](Error::InvalidParameter),
///   [`IncompatibleDtypes`](Error::IncompatibleDtypes), [`UnknownDtype`](Error::UnknownDtype)
/// - **Buffer errors**: [`DtypeMismatch`](Error::DtypeMismatch), [`BufferLength`](Error::BufferLength)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A transform parameter is outside its valid domain.
    ///
    /// Returned for `conversion_gain <= 0`, `beta` outside `(0, 1]`, or any
    /// non-finite parameter.
    ///
    /// # Example
    ///
    /// ```rust
    /// use anscombe_core::Error;
    ///
    /// let err = Error::invalid_parameter("beta", 1.5, "must be in (0, 1]");
    /// assert!(err.to_string().contains("beta"));
    /// ```
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Rejected value
        value: f64,
        /// Why it was rejected
        reason: String,
    },

    /// The decoded/encoded data type pair cannot express the transform.
    ///
    /// Typically the encoded range is too narrow to hold more than one
    /// distinct code over the decoded domain.
    #[error("incompatible dtypes {decoded} -> {encoded}: {reason}")]
    IncompatibleDtypes {
        /// Decoded (raw signal) type
        decoded: DataType,
        /// Encoded (transformed) type
        encoded: DataType,
        /// Failure reason
        reason: String,
    },

    /// A data type name could not be parsed.
    #[error("unknown data type: {0}")]
    UnknownDtype(String),

    /// A buffer does not carry the data type the operation expects.
    #[error("dtype mismatch: expected {expected}, got {got}")]
    DtypeMismatch {
        /// Expected element type
        expected: DataType,
        /// Actual element type
        got: DataType,
    },

    /// A byte buffer length is not a whole number of elements.
    #[error("buffer of {len} bytes is not a multiple of element width {width}")]
    BufferLength {
        /// Byte length
        len: usize,
        /// Element width in bytes
        width: usize,
    },
}

impl Error {
    /// Creates an [`Error::InvalidParameter`] error.
    #[inline]
    pub fn invalid_parameter(name: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::IncompatibleDtypes`] error.
    #[inline]
    pub fn incompatible(decoded: DataType, encoded: DataType, reason: impl Into<String>) -> Self {
        Self::IncompatibleDtypes {
            decoded,
            encoded,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DtypeMismatch`] error.
    #[inline]
    pub fn dtype_mismatch(expected: DataType, got: DataType) -> Self {
        Self::DtypeMismatch { expected, got }
    }

    /// Returns `true` for the configuration family of errors.
    ///
    /// These are raised when parameters or dtypes are chosen, never while
    /// a buffer is being transformed.
    #[inline]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::IncompatibleDtypes { .. } | Self::UnknownDtype(_)
        )
    }
}
