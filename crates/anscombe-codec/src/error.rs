//! Error types for codec operations.

use thiserror::Error;

/// Error type for codec operations.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Invalid configuration or buffer, see [`anscombe_core::Error`].
    #[error(transparent)]
    Core(#[from] anscombe_core::Error),

    /// Codec metadata is not valid JSON for this codec.
    #[error("invalid codec metadata: {0}")]
    Json(#[from] serde_json::Error),

    /// Metadata names a different codec.
    #[error("unknown codec id: {0}")]
    UnknownCodec(String),
}

impl CodecError {
    /// Returns `true` when the error was raised while configuring the codec.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::Core(e) => e.is_configuration_error(),
            Self::Json(_) | Self::UnknownCodec(_) => true,
        }
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
