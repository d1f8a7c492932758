//! Element loops shared by encode and decode.
//!
//! Each loop maps every element through a per-value function that also
//! reports whether the value saturated. With the `parallel` feature, long
//! buffers are split into fixed-size chunks processed with Rayon; counts
//! are summed per chunk so the total does not depend on scheduling.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Buffers shorter than this run on the calling thread.
pub(crate) const PARALLEL_MIN_LEN: usize = 1 << 15;

/// Elements per parallel work item.
const CHUNK_LEN: usize = 1 << 12;

fn map_chunk<F>(src: &[f64], dst: &mut [f64], f: &F) -> u64
where
    F: Fn(f64) -> (f64, bool),
{
    let mut saturated = 0;
    for (out, &x) in dst.iter_mut().zip(src) {
        let (y, clamped) = f(x);
        *out = y;
        saturated += clamped as u64;
    }
    saturated
}

/// Maps `src` through `f`, returning the outputs and the saturation count.
pub(crate) fn map_counting<F>(src: &[f64], f: F) -> (Vec<f64>, u64)
where
    F: Fn(f64) -> (f64, bool) + Sync + Send,
{
    let mut dst = vec![0.0; src.len()];

    #[cfg(feature = "parallel")]
    if src.len() >= PARALLEL_MIN_LEN {
        let saturated = dst
            .par_chunks_mut(CHUNK_LEN)
            .zip(src.par_chunks(CHUNK_LEN))
            .map(|(out, chunk)| map_chunk(chunk, out, &f))
            .sum::<u64>();
        return (dst, saturated);
    }

    let saturated = map_chunk(src, &mut dst, &f);
    (dst, saturated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_flagged_values() {
        let src: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let (out, n) = map_counting(&src, |x| (x.min(49.0), x > 49.0));
        assert_eq!(n, 50);
        assert_eq!(out[10], 10.0);
        assert_eq!(out[99], 49.0);
    }

    #[test]
    fn test_long_buffer_matches_short() {
        let len = PARALLEL_MIN_LEN * 3 + 17;
        let src: Vec<f64> = (0..len).map(|i| (i % 1000) as f64).collect();
        let f = |x: f64| (x * 2.0, x >= 900.0);
        let (out, n) = map_counting(&src, f);
        let expected: Vec<f64> = src.iter().map(|&x| x * 2.0).collect();
        assert_eq!(out, expected);
        assert_eq!(n, src.iter().filter(|&&x| x >= 900.0).count() as u64);
    }
}
