//! # anscombe-lut
//!
//! Lookup tables for the Anscombe codec.
//!
//! A [`LookupTable`] precomputes the quantized Anscombe curve for one
//! parameter set and one decoded/encoded dtype pair, so that encoding a
//! buffer costs an index (or a binary search) per element instead of a
//! square root.
//!
//! # Table Layouts
//!
//! - [`TableLayout::Enumerated`] - one code per integer raw value
//! - [`TableLayout::Sampled`] - one raw bucket edge per encoded code
//!
//! # Usage
//!
//! ```rust
//! use anscombe_core::{DataType, TransformParameters};
//! use anscombe_lut::TableBuilder;
//!
//! let params = TransformParameters::new(20.0, 30.0, 1.0).unwrap();
//! let table = TableBuilder::new(params, DataType::I16, DataType::U8).build().unwrap();
//!
//! let code = table.encode(200.0);
//! let raw = table.decode(code);
//! assert!(table.bucket(code).is_some_and(|(lo, hi)| raw >= lo && raw <= hi));
//! ```
//!
//! # Caching
//!
//! [`TableCache`] shares built tables between codecs. It is an explicit
//! object owned by the caller, not global state.
//!
//! # Dependencies
//!
//! - [`anscombe-core`] - Parameters, dtypes, errors
//! - [`anscombe-transfer`] - The curve being tabulated
//! - [`tracing`] - Build and cache diagnostics
//!
//! # Used By
//!
//! - `anscombe-codec` - Table-based encode/decode

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cache;
mod table;

pub use cache::TableCache;
pub use table::{
    Coverage, DEFAULT_MAX_ENTRIES, LookupTable, TableBuilder, TableLayout, coverage,
};
