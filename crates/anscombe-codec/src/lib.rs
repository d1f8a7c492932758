//! # anscombe-codec
//!
//! Lossy compression filter for photon-limited imaging data.
//!
//! The codec maps raw camera values through the Anscombe transform and
//! rounds the result, so that one encoded step corresponds to `beta`
//! standard deviations of shot noise. The encoded chunks are small
//! integers that downstream lossless compressors pack tightly.
//!
//! # Quick Start
//!
//! ```rust
//! use anscombe_codec::{AnscombeCodec, BufferCodec, CodecConfig};
//! use anscombe_core::Buffer;
//!
//! let config = CodecConfig::new(20.0, 30.0).with_beta(1.0);
//! let codec = AnscombeCodec::new(config).unwrap();
//!
//! let raw = Buffer::from(vec![0i16, 20, 50, 80, 200]);
//! let codes = codec.encode(&raw).unwrap();
//! let restored = codec.decode(&codes).unwrap();
//! assert_eq!(restored.dtype(), raw.dtype());
//!
//! // persist the configuration next to the data
//! let meta = config.to_json_v2().unwrap();
//! assert_eq!(meta["id"], "anscombe-v1");
//! ```
//!
//! # Evaluation
//!
//! Integer encoded types use a lookup table from `anscombe-lut` when one
//! fits within [`CodecOptions::max_table_entries`]; float encoded types and
//! [`Evaluation::Exact`] evaluate the curve per element. Both paths produce
//! the same codes.
//!
//! # Features
//!
//! - `parallel` (default) - Split long buffers across threads with Rayon
//!
//! # Dependencies
//!
//! - [`anscombe-core`] - Buffers, dtypes, parameters
//! - [`anscombe-transfer`] - Forward/inverse curve
//! - [`anscombe-lut`] - Lookup tables and table cache
//! - [`serde`], [`serde_json`] - Configuration metadata
//! - [`rayon`] - Parallel element loops (optional)
//!
//! # Used By
//!
//! - `anscombe-tests` - End-to-end tests
//! - `anscombe-bench` - Throughput benchmarks

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod codec;
mod config;
mod error;
mod kernel;

pub use codec::{AnscombeCodec, BufferCodec, CodecOptions, Evaluation, decode, encode};
pub use config::{CODEC_ID, CodecConfig};
pub use error::{CodecError, CodecResult};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{AnscombeCodec, BufferCodec, CodecConfig, CodecError, CodecOptions};
    pub use anscombe_core::{Buffer, DataType};
}
