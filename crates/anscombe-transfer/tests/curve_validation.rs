//! Anscombe curve validation tests.
//!
//! Checks the curve against reference values computed directly from the
//! closed-form definition, and checks the shape properties the codec relies
//! on: monotonicity, continuity at the zero level and square-root
//! compression above it.

use anscombe_core::TransformParameters;
use anscombe_transfer::{AnscombeCurve, forward, inverse};
use approx::assert_abs_diff_eq;

// ============================================================================
// Reference values
// ============================================================================
// zero_level = 20, conversion_gain = 30, beta = 1
//
//   zero_slope = 1 / sqrt(3/8)        = 1.6329931618554523
//   offset     = 20 * zero_slope / 30 = 1.0886621079036347
//
// Below the zero level the curve is linear: y = x * zero_slope / gain.

const REFERENCE_Z20_G30_B1: &[(f64, f64)] = &[
    // (raw, transformed)
    (0.0, 0.0),
    (10.0, 0.5443310539518174),
    (20.0, 1.0886621079036347), // breakpoint
    (50.0, 2.2091251164237606),
    (80.0, 2.946124237996534),
    (200.0, 4.913669705693085),
    (1000.0, 11.360293477165733),
    (32767.0, 65.9529985334),
];

// zero_level = 0, conversion_gain = 100, beta = 0.5
const REFERENCE_Z0_G100_B05: &[(f64, f64)] = &[
    (0.0, 0.0),
    (100.0, 2.240926017040252),
    (1000.0, 10.43460898394195),
    (10000.0, 37.62544007624458),
    (32767.0, 69.99856061055623),
];

#[test]
fn forward_matches_reference() {
    let params = TransformParameters::new(20.0, 30.0, 1.0).unwrap();
    for &(x, y) in REFERENCE_Z20_G30_B1 {
        assert_abs_diff_eq!(forward(x, &params), y, epsilon = 1e-9);
    }

    let params = TransformParameters::new(0.0, 100.0, 0.5).unwrap();
    for &(x, y) in REFERENCE_Z0_G100_B05 {
        assert_abs_diff_eq!(forward(x, &params), y, epsilon = 1e-9);
    }
}

#[test]
fn inverse_matches_reference() {
    let params = TransformParameters::new(20.0, 30.0, 1.0).unwrap();
    for &(x, y) in REFERENCE_Z20_G30_B1 {
        assert_abs_diff_eq!(inverse(y, &params), x, epsilon = 1e-6);
    }
}

#[test]
fn breakpoint_is_continuous_for_many_parameters() {
    for zero_level in [-100.0, 0.0, 20.0, 5000.0] {
        for gain in [0.1, 1.0, 30.0, 1000.0] {
            for beta in [0.05, 0.5, 1.0] {
                let params = TransformParameters::new(zero_level, gain, beta).unwrap();
                let curve = AnscombeCurve::new(&params);
                let (x0, y0) = curve.breakpoint();
                assert_abs_diff_eq!(curve.forward(x0), y0, epsilon = 1e-12);
                // approaching from below stays continuous
                let below = curve.forward(x0 - 1e-9 * gain);
                assert!((below - y0).abs() < 1e-6);
                assert!(below < y0);
            }
        }
    }
}

#[test]
fn square_root_compression_above_zero_level() {
    let params = TransformParameters::new(20.0, 30.0, 1.0).unwrap();
    let curve = AnscombeCurve::new(&params);
    let mut prev_step = f64::INFINITY;
    for k in 0..200 {
        let x = 20.0 + k as f64 * 30.0;
        let step = curve.forward(x + 30.0) - curve.forward(x);
        assert!(step > 0.0);
        assert!(step < prev_step, "step grew at x={}", x);
        prev_step = step;
    }
}

#[test]
fn quantization_step_tracks_noise() {
    // one output unit spans beta noise standard deviations
    let params = TransformParameters::new(0.0, 10.0, 1.0).unwrap();
    let curve = AnscombeCurve::new(&params);
    for events in [4.0f64, 100.0, 10000.0] {
        let x = events * 10.0;
        let noise_sd = 10.0 * events.sqrt();
        let step = 1.0 / curve.slope(x);
        assert!((step / noise_sd - 1.0).abs() < 0.1, "events={}", events);
    }
}
