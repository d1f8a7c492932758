//! Pooling pixel statistics into mean bins.

use crate::stats::{PixelStats, mad_sigma, median, quantile_sorted};

/// Robust per-bin variance statistic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BinStatistic {
    /// Mean of variances within `clip_sigma` MAD-sigmas of the bin median.
    #[default]
    ClippedMean,
    /// Median variance, corrected for the chi-square median bias.
    Median,
}

/// Binning parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BinSpec {
    pub bins: usize,
    pub lower_quantile: f64,
    pub upper_quantile: f64,
    pub min_count: usize,
    pub statistic: BinStatistic,
    pub clip_sigma: f64,
    /// Degrees of freedom of one pixel's variance estimate.
    pub dof: f64,
}

/// One populated mean bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinSummary {
    /// Mean of the pixel means in the bin.
    pub mean: f64,
    /// Robust variance of the bin.
    pub variance: f64,
    /// Pixels in the bin.
    pub count: usize,
    /// Whether the final fit kept this bin.
    pub inlier: bool,
}

/// Median of a chi-square sample variance with `dof` degrees of freedom,
/// relative to the true variance (Wilson-Hilferty).
fn chi2_median_ratio(dof: f64) -> f64 {
    let a = 1.0 - 2.0 / (9.0 * dof);
    a * a * a
}

fn clipped_mean(variances: &mut [f64], clip_sigma: f64) -> f64 {
    let center = median(variances);
    let limit = clip_sigma * mad_sigma(variances, center);
    let (sum, n) = variances
        .iter()
        .filter(|v| (*v - center).abs() <= limit)
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { center } else { sum / n as f64 }
}

/// Bins pixels by mean and summarizes each bin.
///
/// Bins span the quantile range of pixel means with equal widths. Pixels
/// with non-finite statistics or means outside the range are ignored, and
/// bins with fewer than `min_count` pixels are dropped. The result is in
/// increasing mean order.
pub(crate) fn bin_pixels(stats: &[PixelStats], spec: &BinSpec) -> Vec<BinSummary> {
    let mut means: Vec<f64> = stats
        .iter()
        .filter(|s| s.mean.is_finite() && s.variance.is_finite())
        .map(|s| s.mean)
        .collect();
    if means.is_empty() {
        return Vec::new();
    }
    means.sort_unstable_by(f64::total_cmp);
    let lo = quantile_sorted(&means, spec.lower_quantile);
    let hi = quantile_sorted(&means, spec.upper_quantile);
    if !(hi > lo) {
        return Vec::new();
    }
    let width = (hi - lo) / spec.bins as f64;

    let mut members: Vec<(Vec<f64>, f64)> = vec![(Vec::new(), 0.0); spec.bins];
    for s in stats {
        if !s.variance.is_finite() || !(s.mean >= lo && s.mean <= hi) {
            continue;
        }
        let k = (((s.mean - lo) / width) as usize).min(spec.bins - 1);
        members[k].0.push(s.variance);
        members[k].1 += s.mean;
    }

    members
        .into_iter()
        .filter(|(v, _)| v.len() >= spec.min_count)
        .map(|(mut variances, mean_sum)| {
            let count = variances.len();
            let variance = match spec.statistic {
                BinStatistic::ClippedMean => clipped_mean(&mut variances, spec.clip_sigma),
                BinStatistic::Median => median(&mut variances) / chi2_median_ratio(spec.dof),
            };
            BinSummary {
                mean: mean_sum / count as f64,
                variance,
                count,
                inlier: true,
            }
        })
        .collect()
}
