//! Per-pixel temporal statistics and robust summaries.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::stack::FrameStack;

/// Normal-consistency factor for the median absolute deviation.
pub const MAD_SCALE: f64 = 1.482_602_218_505_602;

/// Pixels per parallel work item.
const PIXEL_BLOCK: usize = 1024;

/// How per-pixel variance is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarianceMethod {
    /// Unbiased sample variance across frames.
    #[default]
    Temporal,
    /// Half the mean squared difference of consecutive frames.
    ///
    /// Insensitive to slow drift such as bleaching.
    FrameDifference,
}

/// Temporal mean and variance of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelStats {
    /// Mean across frames.
    pub mean: f64,
    /// Variance estimate.
    pub variance: f64,
}

/// Running accumulator for one pixel.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    n: f64,
    mean: f64,
    m2: f64,
    prev: f64,
    diff2: f64,
}

impl Accumulator {
    #[inline]
    fn push(&mut self, x: f64) {
        if self.n > 0.0 {
            let d = x - self.prev;
            self.diff2 += d * d;
        }
        self.prev = x;
        self.n += 1.0;
        let delta = x - self.mean;
        self.mean += delta / self.n;
        self.m2 += delta * (x - self.mean);
    }

    fn finish(&self, method: VarianceMethod) -> PixelStats {
        let variance = match method {
            VarianceMethod::Temporal => self.m2 / (self.n - 1.0),
            VarianceMethod::FrameDifference => self.diff2 / (2.0 * (self.n - 1.0)),
        };
        PixelStats {
            mean: self.mean,
            variance,
        }
    }
}

fn block_stats(stack: &FrameStack, start: usize, out: &mut [PixelStats], method: VarianceMethod) {
    let mut acc = vec![Accumulator::default(); out.len()];
    for f in 0..stack.frames() {
        let row = &stack.frame(f)[start..start + out.len()];
        for (a, &x) in acc.iter_mut().zip(row) {
            a.push(x);
        }
    }
    for (o, a) in out.iter_mut().zip(&acc) {
        *o = a.finish(method);
    }
}

/// Computes mean and variance for every pixel, in pixel order.
///
/// Needs at least two frames; with one frame every variance is NaN.
pub fn pixel_statistics(stack: &FrameStack, method: VarianceMethod) -> Vec<PixelStats> {
    let mut out = vec![PixelStats::default(); stack.pixels()];

    #[cfg(feature = "parallel")]
    out.par_chunks_mut(PIXEL_BLOCK)
        .enumerate()
        .for_each(|(b, block)| block_stats(stack, b * PIXEL_BLOCK, block, method));

    #[cfg(not(feature = "parallel"))]
    out.chunks_mut(PIXEL_BLOCK)
        .enumerate()
        .for_each(|(b, block)| block_stats(stack, b * PIXEL_BLOCK, block, method));

    out
}

/// Median of `values`, reordering them. NaN for an empty slice.
pub fn median(values: &mut [f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }
    values.sort_unstable_by(f64::total_cmp);
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Median absolute deviation from `center`, scaled to a normal sigma.
pub fn mad_sigma(values: &[f64], center: f64) -> f64 {
    let mut dev: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    MAD_SCALE * median(&mut dev)
}

/// Linear-interpolated quantile of sorted values, `q` in `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let t = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_temporal_variance() {
        // one pixel: 1, 2, 3, 4 -> mean 2.5, var 5/3
        let stack = FrameStack::new(vec![1.0, 2.0, 3.0, 4.0], 4, 1, 1).unwrap();
        let s = pixel_statistics(&stack, VarianceMethod::Temporal);
        assert_relative_eq!(s[0].mean, 2.5);
        assert_relative_eq!(s[0].variance, 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_difference_ignores_drift() {
        // linear ramp: temporal variance is large, differences are constant
        let stack = FrameStack::new(vec![0.0, 10.0, 20.0, 30.0], 4, 1, 1).unwrap();
        let s = pixel_statistics(&stack, VarianceMethod::FrameDifference);
        assert_relative_eq!(s[0].variance, 50.0);
        let t = pixel_statistics(&stack, VarianceMethod::Temporal);
        assert!(t[0].variance > 150.0);
    }

    #[test]
    fn test_pixel_order_across_blocks() {
        let pixels = PIXEL_BLOCK * 2 + 5;
        let mut data = Vec::with_capacity(pixels * 3);
        for f in 0..3 {
            for p in 0..pixels {
                data.push(p as f64 + f as f64);
            }
        }
        let stack = FrameStack::new(data, 3, 1, pixels).unwrap();
        let s = pixel_statistics(&stack, VarianceMethod::Temporal);
        for (p, st) in s.iter().enumerate() {
            assert_relative_eq!(st.mean, p as f64 + 1.0, epsilon = 1e-9);
            assert_relative_eq!(st.variance, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_median_and_mad() {
        let mut v = vec![5.0, 1.0, 3.0, 2.0, 4.0];
        assert_eq!(median(&mut v), 3.0);
        let mut w = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(median(&mut w), 2.5);
        assert!(median(&mut []).is_nan());
        // deviations from 3: 2,2,0,1,1 -> median 1
        assert_relative_eq!(mad_sigma(&[5.0, 1.0, 3.0, 2.0, 4.0], 3.0), MAD_SCALE);
    }

    #[test]
    fn test_quantile() {
        let v = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert_eq!(quantile_sorted(&v, 0.0), 0.0);
        assert_eq!(quantile_sorted(&v, 1.0), 40.0);
        assert_relative_eq!(quantile_sorted(&v, 0.3), 12.0);
    }
}
