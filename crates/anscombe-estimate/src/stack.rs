//! Multi-frame input stacks.

use anscombe_core::{Buffer, Sample};

use crate::error::{EstimateError, EstimateResult};

/// A stack of frames laid out `(frames, height, width)`, frame-major.
///
/// Values are held as `f64` regardless of the source element type.
///
/// # Example
///
/// ```rust
/// use anscombe_estimate::FrameStack;
///
/// let data: Vec<u16> = vec![10; 4 * 2 * 3];
/// let stack = FrameStack::from_slice(&data, 4, 2, 3).unwrap();
/// assert_eq!(stack.pixels(), 6);
/// assert_eq!(stack.frame(1).len(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStack {
    data: Vec<f64>,
    frames: usize,
    height: usize,
    width: usize,
}

impl FrameStack {
    /// Creates a stack from frame-major values.
    ///
    /// Fails with [`EstimateError::InvalidShape`] when a dimension is zero
    /// or `data.len() != frames * height * width`.
    pub fn new(data: Vec<f64>, frames: usize, height: usize, width: usize) -> EstimateResult<Self> {
        if frames == 0 || height == 0 || width == 0 {
            return Err(EstimateError::shape(format!(
                "zero dimension in ({}, {}, {})",
                frames, height, width
            )));
        }
        let expected = frames
            .checked_mul(height)
            .and_then(|n| n.checked_mul(width))
            .ok_or_else(|| EstimateError::shape("dimensions overflow"))?;
        if data.len() != expected {
            return Err(EstimateError::shape(format!(
                "{} values for ({}, {}, {}), expected {}",
                data.len(),
                frames,
                height,
                width,
                expected
            )));
        }
        Ok(Self {
            data,
            frames,
            height,
            width,
        })
    }

    /// Creates a stack from a slice of any element type.
    pub fn from_slice<T: Sample>(
        data: &[T],
        frames: usize,
        height: usize,
        width: usize,
    ) -> EstimateResult<Self> {
        Self::new(data.iter().map(|&v| v.to_f64()).collect(), frames, height, width)
    }

    /// Creates a stack from a typed buffer.
    pub fn from_buffer(
        buffer: &Buffer,
        frames: usize,
        height: usize,
        width: usize,
    ) -> EstimateResult<Self> {
        Self::new(buffer.to_f64(), frames, height, width)
    }

    /// Number of frames.
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Frame height.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Frame width.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Pixels per frame.
    #[inline]
    pub fn pixels(&self) -> usize {
        self.height * self.width
    }

    /// Values of frame `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= frames()`.
    pub fn frame(&self, index: usize) -> &[f64] {
        let n = self.pixels();
        &self.data[index * n..(index + 1) * n]
    }

    /// All values, frame-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
