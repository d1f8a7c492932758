//! Physical parameters of the transform.
//!
//! [`TransformParameters`] fully determines the shape of the Anscombe
//! curve. Values are validated once, at construction, and cannot change
//! afterwards.

use crate::error::{Error, Result};

/// Quantization step in units of noise standard deviation used when a
/// configuration does not specify one.
pub const DEFAULT_BETA: f64 = 0.5;

/// Validated transform parameters.
///
/// - `zero_level` - raw signal value for zero detected events
/// - `conversion_gain` - raw units per detected event, `> 0`
/// - `beta` - output quantization step in noise standard deviations, `(0, 1]`
///
/// # Example
///
/// ```rust
/// use anscombe_core::TransformParameters;
///
/// let p = TransformParameters::new(20.0, 30.0, 1.0).unwrap();
/// assert_eq!(p.conversion_gain(), 30.0);
///
/// assert!(TransformParameters::new(20.0, 0.0, 1.0).is_err());
/// assert!(TransformParameters::new(20.0, 30.0, 1.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParameters {
    zero_level: f64,
    conversion_gain: f64,
    beta: f64,
}

impl TransformParameters {
    /// Validates and creates a parameter set.
    pub fn new(zero_level: f64, conversion_gain: f64, beta: f64) -> Result<Self> {
        if !zero_level.is_finite() {
            return Err(Error::invalid_parameter("zero_level", zero_level, "must be finite"));
        }
        if !conversion_gain.is_finite() || conversion_gain <= 0.0 {
            return Err(Error::invalid_parameter(
                "conversion_gain",
                conversion_gain,
                "must be finite and > 0",
            ));
        }
        if !beta.is_finite() || beta <= 0.0 || beta > 1.0 {
            return Err(Error::invalid_parameter("beta", beta, "must be in (0, 1]"));
        }
        Ok(Self {
            zero_level,
            conversion_gain,
            beta,
        })
    }

    /// Creates a parameter set with [`DEFAULT_BETA`].
    pub fn with_default_beta(zero_level: f64, conversion_gain: f64) -> Result<Self> {
        Self::new(zero_level, conversion_gain, DEFAULT_BETA)
    }

    /// Raw signal value corresponding to zero detected events.
    #[inline]
    pub fn zero_level(&self) -> f64 {
        self.zero_level
    }

    /// Raw signal units per detected event.
    #[inline]
    pub fn conversion_gain(&self) -> f64 {
        self.conversion_gain
    }

    /// Quantization step in units of noise standard deviation.
    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Bit patterns of the three values, usable as an exact hash key.
    #[inline]
    pub fn to_bits(&self) -> [u64; 3] {
        [
            self.zero_level.to_bits(),
            self.conversion_gain.to_bits(),
            self.beta.to_bits(),
        ]
    }
}
