//! Error types for estimation.

use thiserror::Error;

/// Error type for estimation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// Too few frames for a variance estimate.
    #[error("insufficient frames: got {frames}, need at least {required}")]
    InsufficientFrames {
        /// Frames in the stack.
        frames: usize,
        /// Minimum required.
        required: usize,
    },

    /// Stack dimensions do not match the data.
    #[error("invalid stack shape: {0}")]
    InvalidShape(String),

    /// Pixel means do not span enough distinct levels to fit a line.
    #[error("insufficient signal range: {bins} usable bins, need at least {required}")]
    InsufficientRange {
        /// Bins that survived filtering.
        bins: usize,
        /// Minimum required.
        required: usize,
    },

    /// Variance does not grow with the mean.
    #[error("data is not Poisson-like: fitted slope {slope}")]
    NonPoissonData {
        /// Fitted variance-vs-mean slope.
        slope: f64,
    },

    /// An estimator option is out of range.
    #[error("invalid option {name}: {reason}")]
    InvalidOption {
        /// Option name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl EstimateError {
    /// Create an invalid shape error.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    /// Create an invalid option error.
    pub fn option(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for estimation.
pub type EstimateResult<T> = Result<T, EstimateError>;
