//! Generalized Anscombe transfer curve.
//!
//! The curve maps raw photon-limited signal to a domain where shot noise
//! has approximately constant standard deviation `1 / beta`. It is
//! piecewise: a square-root (variance-stabilizing) segment above the zero
//! level and a linear segment below it, for readout-noise-only pixels and
//! baseline undershoot.
//!
//! # Formula
//!
//! ```text
//! r         = (x - zero_level) / conversion_gain      (event rate)
//! zero_slope = 1 / (beta * sqrt(3/8))
//! offset     = zero_level * zero_slope / conversion_gain
//!
//! if r < 0:
//!     y = offset + r * zero_slope
//! else:
//!     y = offset + (2 / beta) * (sqrt(r + 3/8) - sqrt(3/8))
//! ```
//!
//! Both segments meet at `r = 0` with value `offset` and slope
//! `zero_slope / conversion_gain`, so the curve is continuous and strictly
//! increasing.

use anscombe_core::TransformParameters;

/// The `3/8` constant of the Anscombe transform.
pub const THREE_EIGHTHS: f64 = 0.375;

/// Precomputed curve for one parameter set.
///
/// # Example
///
/// ```rust
/// use anscombe_core::TransformParameters;
/// use anscombe_transfer::AnscombeCurve;
///
/// let params = TransformParameters::new(20.0, 30.0, 1.0).unwrap();
/// let curve = AnscombeCurve::new(&params);
///
/// let y = curve.forward(200.0);
/// assert!((curve.inverse(y) - 200.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnscombeCurve {
    zero_level: f64,
    conversion_gain: f64,
    beta: f64,
    zero_slope: f64,
    offset: f64,
    sqrt_38: f64,
}

impl AnscombeCurve {
    /// Precomputes the curve constants for `params`.
    pub fn new(params: &TransformParameters) -> Self {
        let sqrt_38 = THREE_EIGHTHS.sqrt();
        let zero_slope = 1.0 / (params.beta() * sqrt_38);
        let offset = params.zero_level() * zero_slope / params.conversion_gain();
        Self {
            zero_level: params.zero_level(),
            conversion_gain: params.conversion_gain(),
            beta: params.beta(),
            zero_slope,
            offset,
            sqrt_38,
        }
    }

    /// Maps a raw value to the transformed domain.
    #[inline]
    pub fn forward(&self, x: f64) -> f64 {
        let rate = (x - self.zero_level) / self.conversion_gain;
        if rate < 0.0 {
            self.offset + rate * self.zero_slope
        } else {
            self.offset + (2.0 / self.beta) * ((rate + THREE_EIGHTHS).sqrt() - self.sqrt_38)
        }
    }

    /// Maps a transformed value back to the raw domain.
    ///
    /// Closed-form inverse of [`forward`](Self::forward); the branch is
    /// chosen by comparing `y` with the breakpoint value.
    #[inline]
    pub fn inverse(&self, y: f64) -> f64 {
        let rate = if y < self.offset {
            (y - self.offset) / self.zero_slope
        } else {
            let s = (y - self.offset) * self.beta / 2.0 + self.sqrt_38;
            s * s - THREE_EIGHTHS
        };
        self.zero_level + rate * self.conversion_gain
    }

    /// Derivative `dy/dx` at raw value `x`.
    ///
    /// `1 / slope(x)` is the width, in raw units, of one output step at `x`.
    #[inline]
    pub fn slope(&self, x: f64) -> f64 {
        let rate = (x - self.zero_level) / self.conversion_gain;
        if rate < 0.0 {
            self.zero_slope / self.conversion_gain
        } else {
            1.0 / (self.beta * self.conversion_gain * (rate + THREE_EIGHTHS).sqrt())
        }
    }

    /// Raw value and output value where the two segments meet.
    #[inline]
    pub fn breakpoint(&self) -> (f64, f64) {
        (self.zero_level, self.offset)
    }

    /// Slope of the linear segment in output units per event.
    #[inline]
    pub fn zero_slope(&self) -> f64 {
        self.zero_slope
    }
}

/// Forward transform of a single value.
///
/// Prefer [`AnscombeCurve`] when evaluating many values with the same
/// parameters.
///
/// # Example
///
/// ```rust
/// use anscombe_core::TransformParameters;
/// use anscombe_transfer::anscombe::forward;
///
/// let p = TransformParameters::new(20.0, 30.0, 1.0).unwrap();
/// assert!((forward(50.0, &p) - 2.2091).abs() < 1e-4);
/// ```
#[inline]
pub fn forward(x: f64, params: &TransformParameters) -> f64 {
    AnscombeCurve::new(params).forward(x)
}

/// Inverse transform of a single value.
#[inline]
pub fn inverse(y: f64, params: &TransformParameters) -> f64 {
    AnscombeCurve::new(params).inverse(y)
}
