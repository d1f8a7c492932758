//! # anscombe-transfer
//!
//! Variance-stabilizing transfer curve for photon-limited signals.
//!
//! Shot noise has variance proportional to the signal. The Anscombe
//! transform remaps the signal so that, in the output domain, noise has
//! roughly the same standard deviation at every intensity. Quantizing the
//! output to integers then discards only noise, never signal, which is
//! what makes the data compressible.
//!
//! # Terminology
//!
//! - **Zero level**: raw value for zero detected photons (sensor baseline)
//! - **Conversion gain**: raw units per detected photon
//! - **Beta**: output quantization step in units of noise standard deviation
//!
//! # Usage
//!
//! ```rust
//! use anscombe_core::TransformParameters;
//! use anscombe_transfer::AnscombeCurve;
//!
//! let params = TransformParameters::new(20.0, 30.0, 1.0).unwrap();
//! let curve = AnscombeCurve::new(&params);
//!
//! let encoded = curve.forward(200.0);
//! let decoded = curve.inverse(encoded);
//! assert!((decoded - 200.0).abs() < 1e-9);
//! ```
//!
//! # Dependencies
//!
//! - [`anscombe-core`] - Transform parameters
//!
//! # Used By
//!
//! - `anscombe-lut` - Lookup table construction
//! - `anscombe-codec` - Direct (exact) evaluation path

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod anscombe;

pub use anscombe::{AnscombeCurve, THREE_EIGHTHS, forward, inverse};
