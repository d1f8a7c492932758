//! The Anscombe buffer codec.
//!
//! [`AnscombeCodec`] turns raw chunks of the decoded type into chunks of
//! the encoded type and back. Integer encoded types go through a
//! [`LookupTable`] when one fits within the configured entry bound;
//! everything else evaluates the curve per element.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anscombe_core::{Buffer, DataType, Error, TransformParameters};
use anscombe_lut::{DEFAULT_MAX_ENTRIES, LookupTable, TableBuilder, TableCache, coverage};
use anscombe_transfer::AnscombeCurve;
use tracing::{debug, trace};

use crate::config::CodecConfig;
use crate::error::CodecResult;
use crate::kernel::map_counting;

/// How element values are mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Evaluation {
    /// Use a lookup table when one fits, otherwise evaluate directly.
    #[default]
    Auto,
    /// Always evaluate the curve per element.
    Exact,
}

/// Codec construction options.
///
/// Options change speed and memory use, never the configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Evaluation strategy.
    pub evaluation: Evaluation,
    /// Upper bound on lookup table entries.
    pub max_table_entries: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            evaluation: Evaluation::Auto,
            max_table_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl CodecOptions {
    /// Options that always evaluate the curve directly.
    pub fn exact() -> Self {
        Self {
            evaluation: Evaluation::Exact,
            ..Self::default()
        }
    }

    /// Sets the table entry bound.
    pub fn with_max_table_entries(mut self, n: usize) -> Self {
        self.max_table_entries = n;
        self
    }
}

/// Encode/decode over typed buffers.
pub trait BufferCodec {
    /// Encodes a buffer of the decoded type into the encoded type.
    fn encode(&self, buffer: &Buffer) -> CodecResult<Buffer>;
    /// Decodes a buffer of the encoded type into the decoded type.
    fn decode(&self, buffer: &Buffer) -> CodecResult<Buffer>;
}

enum Plan {
    Table(Arc<LookupTable>),
    /// `codes` is the covered code range for integer encoded types.
    Direct { codes: Option<(f64, f64)> },
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(t) => f
                .debug_struct("Table")
                .field("layout", &t.layout())
                .field("len", &t.len())
                .finish(),
            Self::Direct { codes } => f.debug_struct("Direct").field("codes", codes).finish(),
        }
    }
}

/// Anscombe transform codec for one configuration.
///
/// Construction validates the configuration and prepares the lookup
/// table, so a constructed codec never fails on a well-typed buffer.
/// The codec is `Send + Sync` and can be shared between threads.
///
/// # Example
///
/// ```rust
/// use anscombe_codec::{AnscombeCodec, BufferCodec, CodecConfig};
/// use anscombe_core::Buffer;
///
/// let codec = AnscombeCodec::new(CodecConfig::new(20.0, 30.0).with_beta(1.0)).unwrap();
/// let raw = Buffer::from(vec![0i16, 20, 50, 80, 200]);
///
/// let encoded = codec.encode(&raw).unwrap();
/// assert_eq!(encoded.as_slice::<u8>().unwrap(), &[0, 1, 2, 3, 5]);
///
/// let decoded = codec.decode(&encoded).unwrap();
/// assert_eq!(decoded.len(), 5);
/// ```
#[derive(Debug)]
pub struct AnscombeCodec {
    config: CodecConfig,
    params: TransformParameters,
    curve: AnscombeCurve,
    plan: Plan,
    saturated: AtomicU64,
}

impl AnscombeCodec {
    /// Creates a codec with default options and a private table.
    pub fn new(config: CodecConfig) -> CodecResult<Self> {
        Self::build(config, CodecOptions::default(), None)
    }

    /// Creates a codec with explicit options and a private table.
    pub fn with_options(config: CodecConfig, options: CodecOptions) -> CodecResult<Self> {
        Self::build(config, options, None)
    }

    /// Creates a codec whose table is shared through `cache`.
    pub fn with_cache(
        config: CodecConfig,
        options: CodecOptions,
        cache: &TableCache,
    ) -> CodecResult<Self> {
        Self::build(config, options, Some(cache))
    }

    fn build(
        config: CodecConfig,
        options: CodecOptions,
        cache: Option<&TableCache>,
    ) -> CodecResult<Self> {
        let params = config.params()?;
        let curve = AnscombeCurve::new(&params);
        let (decoded, encoded) = (config.decoded_dtype, config.encoded_dtype);

        let codes = if encoded.is_integer() {
            let cov = coverage(&curve, decoded, encoded)?;
            Some((cov.code_min as f64, cov.code_max as f64))
        } else {
            None
        };

        let builder = TableBuilder::new(params, decoded, encoded)
            .max_entries(options.max_table_entries);
        let layout = match options.evaluation {
            Evaluation::Exact => None,
            Evaluation::Auto => builder.layout()?,
        };
        let plan = match layout {
            Some(_) => {
                let table = match cache {
                    Some(cache) => cache.get_or_build(&builder)?,
                    None => Arc::new(builder.build()?),
                };
                Plan::Table(table)
            }
            None => Plan::Direct { codes },
        };

        debug!(
            zero_level = params.zero_level(),
            conversion_gain = params.conversion_gain(),
            beta = params.beta(),
            %decoded,
            %encoded,
            plan = ?plan,
            "codec ready"
        );

        Ok(Self {
            config,
            params,
            curve,
            plan,
            saturated: AtomicU64::new(0),
        })
    }

    /// The configuration record.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Validated transform parameters.
    pub fn params(&self) -> &TransformParameters {
        &self.params
    }

    /// The lookup table, if the codec uses one.
    pub fn table(&self) -> Option<&Arc<LookupTable>> {
        match &self.plan {
            Plan::Table(t) => Some(t),
            Plan::Direct { .. } => None,
        }
    }

    /// Whether values are mapped by evaluating the curve per element.
    pub fn is_exact(&self) -> bool {
        matches!(self.plan, Plan::Direct { .. })
    }

    /// Total number of values clamped while encoding, since construction.
    pub fn saturated(&self) -> u64 {
        self.saturated.load(Ordering::Relaxed)
    }

    /// Encodes a little-endian byte chunk of the decoded type.
    pub fn encode_bytes(&self, bytes: &[u8]) -> CodecResult<Vec<u8>> {
        let raw = Buffer::from_le_bytes(self.config.decoded_dtype, bytes)?;
        Ok(self.encode(&raw)?.to_le_bytes())
    }

    /// Decodes a little-endian byte chunk of the encoded type.
    pub fn decode_bytes(&self, bytes: &[u8]) -> CodecResult<Vec<u8>> {
        let codes = Buffer::from_le_bytes(self.config.encoded_dtype, bytes)?;
        Ok(self.decode(&codes)?.to_le_bytes())
    }

    fn check_dtype(expected: DataType, buffer: &Buffer) -> CodecResult<()> {
        if buffer.dtype() == expected {
            Ok(())
        } else {
            Err(Error::dtype_mismatch(expected, buffer.dtype()).into())
        }
    }

    fn encode_values(&self, values: &[f64]) -> (Vec<f64>, u64) {
        let curve = &self.curve;
        match &self.plan {
            Plan::Table(table) => map_counting(values, |x| {
                (table.encode(x) as f64, !table.contains(x))
            }),
            Plan::Direct { codes: Some((lo, hi)) } => {
                let (lo, hi) = (*lo, *hi);
                map_counting(values, move |x| {
                    let q = curve.forward(x).round();
                    if q.is_nan() || q < lo {
                        (lo, true)
                    } else if q > hi {
                        (hi, true)
                    } else {
                        (q, false)
                    }
                })
            }
            Plan::Direct { codes: None } => {
                let encoded = self.config.encoded_dtype;
                let (lo, hi) = (encoded.min_value(), encoded.max_value());
                map_counting(values, move |x| {
                    let y = curve.forward(x);
                    (encoded.quantize(y), y.is_nan() || y < lo || y > hi)
                })
            }
        }
    }

    fn decode_values(&self, codes: &[f64]) -> Vec<f64> {
        let curve = &self.curve;
        let (values, _) = match &self.plan {
            Plan::Table(table) => map_counting(codes, |c| (table.decode(c as i64), false)),
            Plan::Direct { .. } => map_counting(codes, |c| (curve.inverse(c), false)),
        };
        values
    }
}

impl BufferCodec for AnscombeCodec {
    /// Encodes raw values, clamping out-of-range values to the end codes.
    ///
    /// Fails with [`Error::DtypeMismatch`] when the buffer is not of the
    /// decoded type. NaN inputs are counted as saturated. They encode as
    /// the lowest code for integer encoded types and stay NaN for float
    /// encoded types.
    fn encode(&self, buffer: &Buffer) -> CodecResult<Buffer> {
        Self::check_dtype(self.config.decoded_dtype, buffer)?;
        let values = buffer.to_f64();
        let (codes, saturated) = self.encode_values(&values);
        if saturated > 0 {
            self.saturated.fetch_add(saturated, Ordering::Relaxed);
            debug!(saturated, len = values.len(), "clamped values outside the encodable range");
        }
        trace!(len = values.len(), "encoded chunk");
        Ok(Buffer::from_f64(self.config.encoded_dtype, &codes))
    }

    /// Decodes codes to representative raw values.
    ///
    /// Fails with [`Error::DtypeMismatch`] when the buffer is not of the
    /// encoded type.
    fn decode(&self, buffer: &Buffer) -> CodecResult<Buffer> {
        Self::check_dtype(self.config.encoded_dtype, buffer)?;
        let raw = self.decode_values(&buffer.to_f64());
        trace!(len = raw.len(), "decoded chunk");
        Ok(Buffer::from_f64(self.config.decoded_dtype, &raw))
    }
}

/// Encodes `buffer` with a codec built for `config`.
///
/// Builds a private table per call; keep an [`AnscombeCodec`] around when
/// encoding many chunks.
pub fn encode(buffer: &Buffer, config: &CodecConfig) -> CodecResult<Buffer> {
    AnscombeCodec::new(*config)?.encode(buffer)
}

/// Decodes `buffer` with a codec built for `config`.
pub fn decode(buffer: &Buffer, config: &CodecConfig) -> CodecResult<Buffer> {
    AnscombeCodec::new(*config)?.decode(buffer)
}
