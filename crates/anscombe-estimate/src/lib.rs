//! # anscombe-estimate
//!
//! Estimates the conversion gain and zero level of a photon-limited
//! sensor from a stack of frames, without calibration hardware.
//!
//! Shot noise makes each pixel's temporal variance a linear function of
//! its mean, `variance = gain * (mean - zero_level)`. The estimator:
//!
//! 1. computes per-pixel mean and variance across frames ([`pixel_statistics`])
//! 2. bins pixels by mean and takes a robust variance per bin
//! 3. fits a robust weighted line through the bins
//!
//! The slope is the gain, the x-intercept the zero level.
//!
//! # Usage
//!
//! ```rust
//! use anscombe_estimate::{DemoOptions, EstimateOptions, estimate_with, make_demo_stack};
//!
//! let stack = make_demo_stack(&DemoOptions::default().size(64, 64).frames(20)).unwrap();
//! let est = estimate_with(&stack, &EstimateOptions::default().bins(32)).unwrap();
//!
//! let params = est.params(0.5).unwrap();
//! assert!(params.conversion_gain() > 0.0);
//! ```
//!
//! # Features
//!
//! - `parallel` (default) - Per-pixel statistics over pixel blocks with Rayon
//!
//! # Dependencies
//!
//! - [`anscombe-core`] - Buffers and transform parameters
//! - [`rand`], [`rand_distr`] - Synthetic data
//! - [`rayon`] - Parallel per-pixel statistics (optional)
//!
//! # Used By
//!
//! - `anscombe-tests` - End-to-end tests
//! - `anscombe-bench` - Estimator benchmarks

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod binning;
mod error;
mod estimate;
mod fit;
mod stack;
mod stats;
pub mod synthetic;

pub use binning::{BinStatistic, BinSummary};
pub use error::{EstimateError, EstimateResult};
pub use estimate::{EstimateOptions, GainEstimate, MIN_BINS, estimate, estimate_with};
pub use fit::{LineFit, robust_fit};
pub use stack::FrameStack;
pub use stats::{PixelStats, VarianceMethod, pixel_statistics};
pub use synthetic::{DemoOptions, make_demo_data, make_demo_stack};
