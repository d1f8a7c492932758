//! Synthetic photon-limited frame stacks.
//!
//! Each pixel gets a photon rate drawn from an exponential distribution.
//! Every frame then draws a Poisson photon count per pixel, adds Gaussian
//! readout noise (in photons), and scales by the conversion gain on top of
//! the zero level:
//!
//! ```text
//! raw = round(zero_level + conversion_gain * (poisson(rate) + normal(0, read_noise)))
//! ```
//!
//! Generation is seeded, so the same options always produce the same stack.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Exp, Normal, Poisson};

use crate::error::{EstimateError, EstimateResult};
use crate::stack::FrameStack;

/// Options for [`make_demo_data`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoOptions {
    /// Number of frames.
    pub frames: usize,
    /// Frame height.
    pub height: usize,
    /// Frame width.
    pub width: usize,
    /// Raw value for zero photons.
    pub zero_level: f64,
    /// Raw units per photon.
    pub conversion_gain: f64,
    /// Mean of the per-pixel photon rate distribution.
    pub mean_photon_rate: f64,
    /// Readout noise standard deviation, in photons.
    pub read_noise: f64,
    /// Random seed.
    pub seed: u64,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            frames: 50,
            height: 256,
            width: 256,
            zero_level: 20.0,
            conversion_gain: 30.0,
            mean_photon_rate: 5.0,
            read_noise: 0.2,
            seed: 0,
        }
    }
}

impl DemoOptions {
    /// Sets the frame count.
    pub fn frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    /// Sets the frame size.
    pub fn size(mut self, height: usize, width: usize) -> Self {
        self.height = height;
        self.width = width;
        self
    }

    /// Sets the zero level and conversion gain.
    pub fn calibration(mut self, zero_level: f64, conversion_gain: f64) -> Self {
        self.zero_level = zero_level;
        self.conversion_gain = conversion_gain;
        self
    }

    /// Sets the mean photon rate.
    pub fn mean_photon_rate(mut self, rate: f64) -> Self {
        self.mean_photon_rate = rate;
        self
    }

    /// Sets the readout noise in photons.
    pub fn read_noise(mut self, sigma: f64) -> Self {
        self.read_noise = sigma;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Generates a frame-major `(frames, height, width)` stack of `i16` values.
///
/// Fails with [`EstimateError::InvalidOption`] for a non-positive photon
/// rate or a negative readout noise, and with
/// [`EstimateError::InvalidShape`] for zero dimensions.
///
/// # Example
///
/// ```rust
/// use anscombe_estimate::{DemoOptions, make_demo_data};
///
/// let opts = DemoOptions::default().size(8, 8).frames(4);
/// let a = make_demo_data(&opts).unwrap();
/// let b = make_demo_data(&opts).unwrap();
/// assert_eq!(a.len(), 4 * 8 * 8);
/// assert_eq!(a, b);
/// ```
pub fn make_demo_data(opts: &DemoOptions) -> EstimateResult<Vec<i16>> {
    if opts.frames == 0 || opts.height == 0 || opts.width == 0 {
        return Err(EstimateError::shape("demo data needs non-zero dimensions"));
    }
    if !(opts.mean_photon_rate > 0.0) {
        return Err(EstimateError::option("mean_photon_rate", "must be positive"));
    }
    if !(opts.read_noise >= 0.0 && opts.read_noise.is_finite()) {
        return Err(EstimateError::option("read_noise", "must be finite and >= 0"));
    }
    let rate_dist = Exp::new(1.0 / opts.mean_photon_rate)
        .map_err(|e| EstimateError::option("mean_photon_rate", e.to_string()))?;
    let noise = Normal::new(0.0, opts.read_noise)
        .map_err(|e| EstimateError::option("read_noise", e.to_string()))?;

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let pixels = opts.height * opts.width;
    let arrivals: Vec<Option<Poisson<f64>>> = (0..pixels)
        .map(|_| {
            let rate: f64 = rate_dist.sample(&mut rng);
            Poisson::new(rate).ok()
        })
        .collect();

    let mut data = Vec::with_capacity(opts.frames * pixels);
    for _ in 0..opts.frames {
        for dist in &arrivals {
            let photons: f64 = match dist {
                Some(d) => d.sample(&mut rng),
                None => 0.0,
            };
            let signal = photons + noise.sample(&mut rng);
            let raw = opts.zero_level + opts.conversion_gain * signal;
            // float-to-int `as` saturates
            data.push(raw.round() as i16);
        }
    }
    Ok(data)
}

/// Generates demo data wrapped in a [`FrameStack`].
pub fn make_demo_stack(opts: &DemoOptions) -> EstimateResult<FrameStack> {
    let data = make_demo_data(opts)?;
    FrameStack::from_slice(&data, opts.frames, opts.height, opts.width)
}
