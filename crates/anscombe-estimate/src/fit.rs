//! Robust weighted line fit of bin variance against bin mean.
//!
//! The fit starts from weights equal to the bin pixel counts, then
//! iterates: reweight each bin by `count / fitted^2` (the inverse variance
//! of a variance estimate), standardize residuals, and reject bins whose
//! residual exceeds `threshold` MAD-sigmas. It stops when the inlier set
//! and slope settle, or after `max_iterations`.

use tracing::trace;

use crate::stats::{mad_sigma, median};

/// Result of [`robust_fit`].
#[derive(Debug, Clone, PartialEq)]
pub struct LineFit {
    /// Fitted slope.
    pub slope: f64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Weighted coefficient of determination over inliers.
    pub r_squared: f64,
    /// Inlier mask, one entry per point.
    pub inliers: Vec<bool>,
    /// Reweighting iterations performed.
    pub iterations: usize,
}

impl LineFit {
    /// Number of inlier points.
    pub fn inlier_count(&self) -> usize {
        self.inliers.iter().filter(|&&b| b).count()
    }
}

/// Weighted least squares over the masked points: `(slope, intercept)`.
fn weighted_line(x: &[f64], y: &[f64], w: &[f64], mask: &[bool]) -> Option<(f64, f64)> {
    let mut sw = 0.0;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for i in 0..x.len() {
        if mask[i] {
            sw += w[i];
            sx += w[i] * x[i];
            sy += w[i] * y[i];
        }
    }
    if !(sw > 0.0) {
        return None;
    }
    let (mx, my) = (sx / sw, sy / sw);
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for i in 0..x.len() {
        if mask[i] {
            let dx = x[i] - mx;
            sxx += w[i] * dx * dx;
            sxy += w[i] * dx * (y[i] - my);
        }
    }
    if !(sxx > 0.0) {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, my - slope * mx))
}

fn weighted_r_squared(x: &[f64], y: &[f64], w: &[f64], mask: &[bool], line: (f64, f64)) -> f64 {
    let (slope, intercept) = line;
    let (mut sw, mut sy) = (0.0, 0.0);
    for i in 0..x.len() {
        if mask[i] {
            sw += w[i];
            sy += w[i] * y[i];
        }
    }
    let my = sy / sw;
    let (mut ss_res, mut ss_tot) = (0.0, 0.0);
    for i in 0..x.len() {
        if mask[i] {
            let r = y[i] - (intercept + slope * x[i]);
            ss_res += w[i] * r * r;
            ss_tot += w[i] * (y[i] - my) * (y[i] - my);
        }
    }
    if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 }
}

/// Fits `y = slope * x + intercept` robustly.
///
/// `counts` are the initial weights. Returns `None` when fewer than two
/// distinct `x` values carry weight.
pub fn robust_fit(
    x: &[f64],
    y: &[f64],
    counts: &[f64],
    threshold: f64,
    max_iterations: usize,
) -> Option<LineFit> {
    let n = x.len();
    let mut inliers = vec![true; n];
    let mut weights = counts.to_vec();
    let mut line = weighted_line(x, y, &weights, &inliers)?;
    let mut iterations = 0;

    // bins whose fit dips to zero would otherwise dominate the weights
    let y_max = y.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
    let floor = (1e-3 * y_max).max(f64::MIN_POSITIVE);

    while iterations < max_iterations {
        iterations += 1;
        let (slope, intercept) = line;
        let next_weights: Vec<f64> = (0..n)
            .map(|i| {
                let fitted = (intercept + slope * x[i]).max(floor);
                counts[i] / (fitted * fitted)
            })
            .collect();
        let residuals: Vec<f64> = (0..n)
            .map(|i| (y[i] - (intercept + slope * x[i])) * next_weights[i].sqrt())
            .collect();
        let mut kept: Vec<f64> = (0..n)
            .filter(|&i| inliers[i])
            .map(|i| residuals[i])
            .collect();
        let center = median(&mut kept);
        let sigma = mad_sigma(&kept, center);
        let next_inliers: Vec<bool> = if sigma > 0.0 {
            residuals
                .iter()
                .map(|r| ((r - center) / sigma).abs() <= threshold)
                .collect()
        } else {
            inliers.clone()
        };
        if next_inliers.iter().filter(|&&b| b).count() < 2 {
            break;
        }
        let Some(next) = weighted_line(x, y, &next_weights, &next_inliers) else {
            break;
        };

        let settled = next_inliers == inliers && (next.0 - slope).abs() <= 1e-9 * slope.abs();
        trace!(iteration = iterations, slope = next.0, intercept = next.1, "reweighted fit");
        line = next;
        weights = next_weights;
        inliers = next_inliers;
        if settled {
            break;
        }
    }

    let r_squared = weighted_r_squared(x, y, &weights, &inliers, line);
    Some(LineFit {
        slope: line.0,
        intercept: line.1,
        r_squared,
        inliers,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_line() {
        let x: Vec<f64> = (1..=10).map(|i| i as f64 * 10.0).collect();
        let y: Vec<f64> = x.iter().map(|v| 30.0 * (v - 20.0) + 1000.0).collect();
        let counts = vec![100.0; x.len()];
        let fit = robust_fit(&x, &y, &counts, 3.5, 10).unwrap();
        assert_relative_eq!(fit.slope, 30.0, epsilon = 1e-9);
        assert_relative_eq!(fit.intercept, 400.0, epsilon = 1e-6);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
        assert_eq!(fit.inlier_count(), 10);
    }

    #[test]
    fn test_rejects_outlier_bin() {
        let x: Vec<f64> = (1..=12).map(|i| i as f64 * 10.0).collect();
        let mut y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| 2.0 * v + 5.0 + if i % 2 == 0 { 0.1 } else { -0.1 })
            .collect();
        y[6] *= 3.0;
        let counts = vec![50.0; x.len()];
        let fit = robust_fit(&x, &y, &counts, 3.5, 10).unwrap();
        assert!(!fit.inliers[6]);
        assert_relative_eq!(fit.slope, 2.0, epsilon = 0.01);
    }

    #[test]
    fn test_degenerate_x() {
        let x = vec![5.0; 4];
        let y = vec![1.0, 2.0, 3.0, 4.0];
        assert!(robust_fit(&x, &y, &[1.0; 4], 3.5, 10).is_none());
    }
}
