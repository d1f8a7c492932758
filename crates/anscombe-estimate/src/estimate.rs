//! Gain and zero level estimation.
//!
//! Shot noise makes each pixel's temporal variance grow linearly with its
//! mean: `variance = gain * (mean - zero_level)`. The estimator measures
//! per-pixel mean and variance across frames, pools pixels into mean bins
//! with robust per-bin variances, and fits a robust line through the bins.
//! The slope is the conversion gain and the x-intercept is the zero level.

use anscombe_core::{Result as CoreResult, TransformParameters};
use tracing::{debug, trace};

use crate::binning::{BinSpec, BinStatistic, BinSummary, bin_pixels};
use crate::error::{EstimateError, EstimateResult};
use crate::fit::robust_fit;
use crate::stack::FrameStack;
use crate::stats::{VarianceMethod, pixel_statistics};

/// Fewest usable bins for a fit.
pub const MIN_BINS: usize = 3;

/// Estimator options.
///
/// # Example
///
/// ```rust
/// use anscombe_estimate::{BinStatistic, EstimateOptions};
///
/// let opts = EstimateOptions::default()
///     .bins(32)
///     .bin_statistic(BinStatistic::Median);
/// assert!(opts.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateOptions {
    /// Number of equal-width mean bins.
    pub bins: usize,
    /// Lower quantile of pixel means covered by the bins.
    pub lower_quantile: f64,
    /// Upper quantile of pixel means covered by the bins.
    pub upper_quantile: f64,
    /// Bins with fewer pixels are dropped.
    pub min_bin_count: usize,
    /// Fewest frames accepted.
    pub min_frames: usize,
    /// Per-pixel variance method.
    pub variance_method: VarianceMethod,
    /// Per-bin variance statistic.
    pub bin_statistic: BinStatistic,
    /// Clip width for [`BinStatistic::ClippedMean`], in MAD-sigmas.
    pub clip_sigma: f64,
    /// Bin rejection threshold of the robust fit, in MAD-sigmas.
    pub outlier_threshold: f64,
    /// Reweighting iterations of the robust fit.
    pub max_iterations: usize,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            bins: 64,
            lower_quantile: 0.001,
            upper_quantile: 0.999,
            min_bin_count: 16,
            min_frames: 3,
            variance_method: VarianceMethod::Temporal,
            bin_statistic: BinStatistic::ClippedMean,
            clip_sigma: 5.0,
            outlier_threshold: 3.5,
            max_iterations: 10,
        }
    }
}

impl EstimateOptions {
    /// Sets the bin count.
    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Sets the quantile range of pixel means covered by the bins.
    pub fn quantiles(mut self, lower: f64, upper: f64) -> Self {
        self.lower_quantile = lower;
        self.upper_quantile = upper;
        self
    }

    /// Sets the minimum pixels per bin.
    pub fn min_bin_count(mut self, n: usize) -> Self {
        self.min_bin_count = n;
        self
    }

    /// Sets the minimum frame count.
    pub fn min_frames(mut self, n: usize) -> Self {
        self.min_frames = n;
        self
    }

    /// Sets the per-pixel variance method.
    pub fn variance_method(mut self, method: VarianceMethod) -> Self {
        self.variance_method = method;
        self
    }

    /// Sets the per-bin statistic.
    pub fn bin_statistic(mut self, statistic: BinStatistic) -> Self {
        self.bin_statistic = statistic;
        self
    }

    /// Sets the clip width of the clipped mean.
    pub fn clip_sigma(mut self, sigma: f64) -> Self {
        self.clip_sigma = sigma;
        self
    }

    /// Sets the outlier threshold of the robust fit.
    pub fn outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = threshold;
        self
    }

    /// Sets the iteration cap of the robust fit.
    pub fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Checks every option range.
    pub fn validate(&self) -> EstimateResult<()> {
        if self.bins < MIN_BINS {
            return Err(EstimateError::option(
                "bins",
                format!("{} is below {}", self.bins, MIN_BINS),
            ));
        }
        let (lo, hi) = (self.lower_quantile, self.upper_quantile);
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo >= hi {
            return Err(EstimateError::option(
                "quantiles",
                format!("need 0 <= lower < upper <= 1, got {} and {}", lo, hi),
            ));
        }
        if self.min_bin_count < 2 {
            return Err(EstimateError::option("min_bin_count", "must be at least 2"));
        }
        if self.min_frames < 2 {
            return Err(EstimateError::option("min_frames", "must be at least 2"));
        }
        if !(self.clip_sigma > 0.0) {
            return Err(EstimateError::option("clip_sigma", "must be positive"));
        }
        if !(self.outlier_threshold > 0.0) {
            return Err(EstimateError::option("outlier_threshold", "must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(EstimateError::option("max_iterations", "must be at least 1"));
        }
        Ok(())
    }
}

/// Estimated calibration with fit diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct GainEstimate {
    /// Conversion gain: raw units per detected photon.
    pub sensitivity: f64,
    /// Raw value for zero detected photons.
    ///
    /// Signal-independent noise shifts this value. Gaussian readout noise of
    /// `sigma` photons adds `sensitivity² * sigma²` to every pixel variance,
    /// which moves the x-intercept down by `sensitivity * sigma²` raw units.
    /// Add that term back when the readout noise is known.
    pub zero_level: f64,
    /// Weighted R² of the final fit over inlier bins, at most 1.
    pub residual_quality: f64,
    /// Inlier bins divided by bins used.
    pub inlier_fraction: f64,
    /// Bins that entered the fit.
    pub bins_used: usize,
    /// Per-bin summaries in increasing mean order.
    pub bins: Vec<BinSummary>,
}

impl GainEstimate {
    /// Transform parameters for this estimate with the given `beta`.
    pub fn params(&self, beta: f64) -> CoreResult<TransformParameters> {
        TransformParameters::new(self.zero_level, self.sensitivity, beta)
    }
}

/// Estimates gain and zero level with default options.
///
/// # Example
///
/// ```rust
/// use anscombe_estimate::{DemoOptions, estimate, make_demo_stack};
///
/// let stack = make_demo_stack(&DemoOptions::default().size(64, 64).frames(20)).unwrap();
/// let est = estimate(&stack).unwrap();
/// assert!((est.sensitivity / 30.0 - 1.0).abs() < 0.1);
/// ```
pub fn estimate(stack: &FrameStack) -> EstimateResult<GainEstimate> {
    estimate_with(stack, &EstimateOptions::default())
}

/// Estimates gain and zero level.
///
/// # Errors
///
/// - [`EstimateError::InvalidOption`] for out-of-range options
/// - [`EstimateError::InsufficientFrames`] below `min_frames`
/// - [`EstimateError::InsufficientRange`] with fewer than three usable bins
/// - [`EstimateError::NonPoissonData`] for a non-positive or non-finite slope
pub fn estimate_with(stack: &FrameStack, options: &EstimateOptions) -> EstimateResult<GainEstimate> {
    options.validate()?;
    if stack.frames() < options.min_frames {
        return Err(EstimateError::InsufficientFrames {
            frames: stack.frames(),
            required: options.min_frames,
        });
    }

    let stats = pixel_statistics(stack, options.variance_method);
    let spec = BinSpec {
        bins: options.bins,
        lower_quantile: options.lower_quantile,
        upper_quantile: options.upper_quantile,
        min_count: options.min_bin_count,
        statistic: options.bin_statistic,
        clip_sigma: options.clip_sigma,
        dof: (stack.frames() - 1) as f64,
    };
    let mut bins = bin_pixels(&stats, &spec);
    trace!(pixels = stats.len(), bins = bins.len(), "binned pixel statistics");
    let insufficient = |n| EstimateError::InsufficientRange {
        bins: n,
        required: MIN_BINS,
    };
    if bins.len() < MIN_BINS {
        return Err(insufficient(bins.len()));
    }

    let x: Vec<f64> = bins.iter().map(|b| b.mean).collect();
    let y: Vec<f64> = bins.iter().map(|b| b.variance).collect();
    let counts: Vec<f64> = bins.iter().map(|b| b.count as f64).collect();
    let fit = robust_fit(
        &x,
        &y,
        &counts,
        options.outlier_threshold,
        options.max_iterations,
    )
    .ok_or_else(|| insufficient(bins.len()))?;

    if !(fit.slope.is_finite() && fit.slope > 0.0) {
        return Err(EstimateError::NonPoissonData { slope: fit.slope });
    }

    for (b, &keep) in bins.iter_mut().zip(&fit.inliers) {
        b.inlier = keep;
    }
    let bins_used = bins.len();
    let estimate = GainEstimate {
        sensitivity: fit.slope,
        zero_level: -fit.intercept / fit.slope,
        residual_quality: fit.r_squared,
        inlier_fraction: fit.inlier_count() as f64 / bins_used as f64,
        bins_used,
        bins,
    };
    debug!(
        sensitivity = estimate.sensitivity,
        zero_level = estimate.zero_level,
        quality = estimate.residual_quality,
        inlier_fraction = estimate.inlier_fraction,
        iterations = fit.iterations,
        "gain estimate"
    );
    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{DemoOptions, make_demo_stack};

    #[test]
    fn test_option_validation() {
        assert!(EstimateOptions::default().validate().is_ok());
        assert!(EstimateOptions::default().bins(2).validate().is_err());
        assert!(EstimateOptions::default().quantiles(0.5, 0.5).validate().is_err());
        assert!(EstimateOptions::default().min_frames(1).validate().is_err());
        assert!(EstimateOptions::default().max_iterations(0).validate().is_err());
        assert!(matches!(
            EstimateOptions::default().clip_sigma(-1.0).validate(),
            Err(EstimateError::InvalidOption { name: "clip_sigma", .. })
        ));
    }

    #[test]
    fn test_too_few_frames() {
        let stack = FrameStack::new(vec![0.0; 2 * 16], 2, 4, 4).unwrap();
        let err = estimate(&stack).unwrap_err();
        assert_eq!(
            err,
            EstimateError::InsufficientFrames {
                frames: 2,
                required: 3
            }
        );
    }

    #[test]
    fn test_constant_data_has_no_range() {
        let stack = FrameStack::new(vec![100.0; 5 * 64], 5, 8, 8).unwrap();
        assert!(matches!(
            estimate(&stack),
            Err(EstimateError::InsufficientRange { .. })
        ));
    }

    #[test]
    fn test_anti_correlated_noise_is_not_poisson() {
        // variance shrinks as the mean grows
        let (frames, pixels) = (8, 4096);
        let mut data = vec![0.0; frames * pixels];
        for p in 0..pixels {
            let mean = 100.0 + p as f64 * 0.1;
            let amp = (600.0 - 0.1 * p as f64).max(1.0).sqrt();
            for f in 0..frames {
                let sign = if (f + p) % 2 == 0 { 1.0 } else { -1.0 };
                data[f * pixels + p] = mean + sign * amp;
            }
        }
        let stack = FrameStack::new(data, frames, 64, 64).unwrap();
        let err = estimate_with(&stack, &EstimateOptions::default().bins(16)).unwrap_err();
        assert!(matches!(err, EstimateError::NonPoissonData { .. }));
    }

    #[test]
    fn test_bins_carry_inlier_flags() {
        let opts = DemoOptions::default().size(64, 64).frames(20).seed(3);
        let stack = make_demo_stack(&opts).unwrap();
        let est = estimate(&stack).unwrap();
        assert_eq!(est.bins.len(), est.bins_used);
        let inliers = est.bins.iter().filter(|b| b.inlier).count();
        assert_eq!(inliers as f64 / est.bins_used as f64, est.inlier_fraction);
        assert!(est.residual_quality <= 1.0);
    }
}
