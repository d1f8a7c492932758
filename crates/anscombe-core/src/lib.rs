//! # anscombe-core
//!
//! Core types for the Anscombe codec.
//!
//! This crate provides the foundational types used throughout the workspace:
//!
//! - [`DataType`] - Closed set of element types on either side of the codec
//! - [`Sample`] - Trait tying Rust element types to their [`DataType`]
//! - [`Buffer`] - Tagged, typed element buffer (one host chunk)
//! - [`TransformParameters`] - Validated `zero_level`, `conversion_gain`, `beta`
//! - [`Error`] - Configuration and buffer errors
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. All other crates depend on it:
//!
//! ```text
//! anscombe-core (this crate)
//!    ^
//!    |
//!    +-- anscombe-transfer (forward/inverse curve)
//!    +-- anscombe-lut (lookup tables, table cache)
//!    +-- anscombe-codec (buffer encode/decode, codec config)
//!    +-- anscombe-estimate (gain / zero level estimation)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod format;
pub mod params;

pub use buffer::Buffer;
pub use error::{Error, Result};
pub use format::{DataType, Sample};
pub use params::{TransformParameters, DEFAULT_BETA};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use anscombe_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::Buffer;
    pub use crate::error::{Error, Result};
    pub use crate::format::{DataType, Sample};
    pub use crate::params::{TransformParameters, DEFAULT_BETA};
}
