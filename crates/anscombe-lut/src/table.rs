//! Monotonic lookup table from raw values to encoded codes.
//!
//! The table amortizes the square roots of the Anscombe curve into a
//! one-time build per parameter set and dtype pair. Two layouts exist:
//!
//! - **Enumerated**: one code per integer raw value in the covered range.
//!   Encoding is a direct index, decoding a binary search over codes.
//! - **Sampled**: one entry per encoded code, holding the lower raw edge of
//!   the bucket that rounds to that code. Used when the raw domain is too
//!   wide to enumerate (floats, 32/64-bit integers). Encoding is a binary
//!   search over edges, decoding a direct index.
//!
//! In both layouts codes are non-decreasing in raw value, which is what
//! makes the inverse well defined.
//!
//! # Example
//!
//! ```rust
//! use anscombe_core::{DataType, TransformParameters};
//! use anscombe_lut::{TableBuilder, TableLayout};
//!
//! let params = TransformParameters::new(20.0, 30.0, 1.0).unwrap();
//! let table = TableBuilder::new(params, DataType::I16, DataType::U8).build().unwrap();
//!
//! assert_eq!(table.layout(), TableLayout::Enumerated);
//! assert_eq!(table.encode(20.0), 1);
//! assert_eq!(table.encode(1e9), table.code_range().1);
//! ```

use anscombe_core::{DataType, Error, Result, TransformParameters};
use anscombe_transfer::AnscombeCurve;
use tracing::debug;

/// Default bound on table entries (1M entries, 8 MB of codes).
pub const DEFAULT_MAX_ENTRIES: usize = 1 << 20;

/// How a [`LookupTable`] indexes its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableLayout {
    /// One entry per integer raw value.
    Enumerated,
    /// One entry per encoded code (bucket lower edges).
    Sampled,
}

/// Raw values that encode without saturating, and their end codes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    /// Smallest covered raw value.
    pub raw_min: f64,
    /// Largest covered raw value.
    pub raw_max: f64,
    /// Code of `raw_min`.
    pub code_min: i64,
    /// Code of `raw_max`.
    pub code_max: i64,
}

impl Coverage {
    /// Number of integer raw values in the covered range.
    pub fn raw_span(&self) -> f64 {
        self.raw_max - self.raw_min + 1.0
    }

    /// Number of codes between the end codes, inclusive.
    pub fn code_span(&self) -> f64 {
        (self.code_max as f64) - (self.code_min as f64) + 1.0
    }
}

/// Integer code range of an encoded type, limited to what `i64` holds.
fn code_limits(encoded: DataType) -> (f64, f64) {
    let lo = encoded.min_value().max(i64::MIN as f64);
    let hi = encoded.max_value().min(i64::MAX as f64);
    (lo, hi)
}

/// Computes the covered raw range of a dtype pair.
///
/// The covered range is the decoded type's range intersected with the raw
/// values whose transformed value rounds into the encoded range. Fails with
/// [`Error::IncompatibleDtypes`] when the encoded type is a float, or when
/// the covered range holds fewer than two distinct codes.
pub fn coverage(
    curve: &AnscombeCurve,
    decoded: DataType,
    encoded: DataType,
) -> Result<Coverage> {
    if encoded.is_float() {
        return Err(Error::incompatible(
            decoded,
            encoded,
            "tables need an integer encoded type",
        ));
    }
    let (enc_lo, enc_hi) = code_limits(encoded);
    let lo_edge = curve.inverse(enc_lo - 0.5);
    let hi_edge = curve.inverse(enc_hi + 0.5);

    let mut raw_min = decoded.min_value().max(lo_edge);
    let mut raw_max = decoded.max_value().min(hi_edge);
    if decoded.is_integer() {
        raw_min = raw_min.ceil();
        raw_max = raw_max.floor();
    }
    if !(raw_min <= raw_max) {
        return Err(Error::incompatible(
            decoded,
            encoded,
            "no raw value encodes inside the encoded range",
        ));
    }

    let code_of = |x: f64| curve.forward(x).round().clamp(enc_lo, enc_hi) as i64;
    let code_min = code_of(raw_min);
    let code_max = code_of(raw_max);
    if code_min >= code_max {
        return Err(Error::incompatible(
            decoded,
            encoded,
            format!("every raw value maps to code {}", code_min),
        ));
    }
    Ok(Coverage {
        raw_min,
        raw_max,
        code_min,
        code_max,
    })
}

/// Raises every entry that is below its predecessor. Returns the count.
fn enforce_monotonic<T: PartialOrd + Copy>(values: &mut [T]) -> usize {
    let mut repaired = 0;
    for i in 1..values.len() {
        if values[i] < values[i - 1] {
            values[i] = values[i - 1];
            repaired += 1;
        }
    }
    repaired
}

#[derive(Debug, Clone)]
enum Index {
    Enumerated { origin: i64 },
    Sampled { edges: Vec<f64> },
}

/// Builder for a [`LookupTable`].
///
/// # Example
///
/// ```rust
/// use anscombe_core::{DataType, TransformParameters};
/// use anscombe_lut::{TableBuilder, TableLayout};
///
/// let params = TransformParameters::new(0.0, 1.0, 0.5).unwrap();
/// let builder = TableBuilder::new(params, DataType::F32, DataType::U8);
/// assert_eq!(builder.layout().unwrap(), Some(TableLayout::Sampled));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableBuilder {
    params: TransformParameters,
    decoded: DataType,
    encoded: DataType,
    max_entries: usize,
}

impl TableBuilder {
    /// Creates a builder with [`DEFAULT_MAX_ENTRIES`].
    pub fn new(params: TransformParameters, decoded: DataType, encoded: DataType) -> Self {
        Self {
            params,
            decoded,
            encoded,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Sets the bound on table entries.
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(2);
        self
    }

    /// Transform parameters.
    pub fn params(&self) -> &TransformParameters {
        &self.params
    }

    /// Decoded (raw) data type.
    pub fn decoded(&self) -> DataType {
        self.decoded
    }

    /// Encoded data type.
    pub fn encoded(&self) -> DataType {
        self.encoded
    }

    /// Configured entry bound.
    pub fn entry_bound(&self) -> usize {
        self.max_entries
    }

    /// Picks the table layout for this configuration.
    ///
    /// Returns `Ok(None)` when no layout fits within the entry bound or the
    /// encoded type is a float; callers then evaluate the curve directly.
    /// Fails when the dtype pair cannot express more than one code.
    pub fn layout(&self) -> Result<Option<TableLayout>> {
        if self.encoded.is_float() {
            return Ok(None);
        }
        let curve = AnscombeCurve::new(&self.params);
        let cov = coverage(&curve, self.decoded, self.encoded)?;
        Ok(self.layout_for(&cov))
    }

    fn layout_for(&self, cov: &Coverage) -> Option<TableLayout> {
        let bound = self.max_entries as f64;
        if self.decoded.is_integer() && cov.raw_span() <= bound {
            Some(TableLayout::Enumerated)
        } else if cov.code_span() <= bound {
            Some(TableLayout::Sampled)
        } else {
            None
        }
    }

    /// Builds the table.
    ///
    /// Fails with [`Error::IncompatibleDtypes`] when the dtype pair has no
    /// usable overlap or no layout fits within the entry bound.
    pub fn build(&self) -> Result<LookupTable> {
        let curve = AnscombeCurve::new(&self.params);
        let cov = coverage(&curve, self.decoded, self.encoded)?;
        let layout = self.layout_for(&cov).ok_or_else(|| {
            Error::incompatible(
                self.decoded,
                self.encoded,
                format!("no table layout fits within {} entries", self.max_entries),
            )
        })?;

        let (codes, index, repaired) = match layout {
            TableLayout::Enumerated => self.build_enumerated(&curve, &cov),
            TableLayout::Sampled => self.build_sampled(&curve, &cov),
        };

        debug!(
            decoded = %self.decoded,
            encoded = %self.encoded,
            ?layout,
            entries = codes.len(),
            repaired,
            "built anscombe lookup table"
        );

        Ok(LookupTable {
            params: self.params,
            decoded: self.decoded,
            encoded: self.encoded,
            codes,
            index,
            raw_min: cov.raw_min,
            raw_max: cov.raw_max,
            repaired,
        })
    }

    fn build_enumerated(&self, curve: &AnscombeCurve, cov: &Coverage) -> (Vec<i64>, Index, usize) {
        let (enc_lo, enc_hi) = code_limits(self.encoded);
        let origin = cov.raw_min as i64;
        let len = cov.raw_span() as usize;
        let mut codes: Vec<i64> = (0..len)
            .map(|i| {
                let x = (origin + i as i64) as f64;
                curve.forward(x).round().clamp(enc_lo, enc_hi) as i64
            })
            .collect();
        let repaired = enforce_monotonic(&mut codes);
        (codes, Index::Enumerated { origin }, repaired)
    }

    fn build_sampled(&self, curve: &AnscombeCurve, cov: &Coverage) -> (Vec<i64>, Index, usize) {
        let codes: Vec<i64> = (cov.code_min..=cov.code_max).collect();
        let mut edges: Vec<f64> = codes
            .iter()
            .enumerate()
            .map(|(k, &c)| {
                if k == 0 {
                    cov.raw_min
                } else {
                    curve.inverse(c as f64 - 0.5).clamp(cov.raw_min, cov.raw_max)
                }
            })
            .collect();
        let repaired = enforce_monotonic(&mut edges);
        (codes, Index::Sampled { edges }, repaired)
    }
}

/// Immutable, shareable lookup table.
///
/// Built by [`TableBuilder`]; usually shared as `Arc<LookupTable>` through a
/// [`TableCache`](crate::TableCache).
#[derive(Debug, Clone)]
pub struct LookupTable {
    params: TransformParameters,
    decoded: DataType,
    encoded: DataType,
    codes: Vec<i64>,
    index: Index,
    raw_min: f64,
    raw_max: f64,
    repaired: usize,
}

impl LookupTable {
    /// Parameters the table was built for.
    pub fn params(&self) -> &TransformParameters {
        &self.params
    }

    /// Decoded (raw) data type.
    pub fn decoded(&self) -> DataType {
        self.decoded
    }

    /// Encoded data type.
    pub fn encoded(&self) -> DataType {
        self.encoded
    }

    /// Layout of this table.
    pub fn layout(&self) -> TableLayout {
        match self.index {
            Index::Enumerated { .. } => TableLayout::Enumerated,
            Index::Sampled { .. } => TableLayout::Sampled,
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Always false for a built table.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Code sequence in raw-value order (non-decreasing).
    pub fn codes(&self) -> &[i64] {
        &self.codes
    }

    /// Covered raw range `(min, max)`; inputs outside are clamped.
    pub fn raw_range(&self) -> (f64, f64) {
        (self.raw_min, self.raw_max)
    }

    /// Smallest and largest code.
    pub fn code_range(&self) -> (i64, i64) {
        (self.codes[0], self.codes[self.codes.len() - 1])
    }

    /// Entries raised during the monotonicity pass.
    pub fn repaired(&self) -> usize {
        self.repaired
    }

    /// Raw value of entry `i` (lower bucket edge for sampled tables).
    pub fn raw_at(&self, i: usize) -> f64 {
        match &self.index {
            Index::Enumerated { origin } => (origin + i as i64) as f64,
            Index::Sampled { edges } => edges[i],
        }
    }

    /// Whether `x` lies in the covered raw range (false for NaN).
    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.raw_min && x <= self.raw_max
    }

    /// Encodes one raw value, clamping it into the covered range first.
    ///
    /// NaN encodes as the lowest code.
    #[inline]
    pub fn encode(&self, x: f64) -> i64 {
        let x = if x.is_nan() {
            self.raw_min
        } else {
            x.clamp(self.raw_min, self.raw_max)
        };
        let last = self.codes.len() - 1;
        match &self.index {
            Index::Enumerated { origin } => {
                let i = (x.round() as i64 - origin).clamp(0, last as i64) as usize;
                self.codes[i]
            }
            Index::Sampled { edges } => {
                let i = edges.partition_point(|&e| e <= x).saturating_sub(1);
                self.codes[i.min(last)]
            }
        }
    }

    /// Decodes one code to the representative raw value of its bucket.
    ///
    /// The representative is the bucket midpoint. Codes between two table
    /// codes interpolate linearly between their raw values; codes beyond
    /// either end map to the end of the covered range.
    pub fn decode(&self, code: i64) -> f64 {
        let (first, last) = self.code_range();
        if code < first {
            return self.raw_min;
        }
        if code > last {
            return self.raw_max;
        }
        match &self.index {
            Index::Enumerated { origin } => {
                let lo = self.codes.partition_point(|&c| c < code);
                let hi = self.codes.partition_point(|&c| c <= code);
                if lo < hi {
                    *origin as f64 + (lo + hi - 1) as f64 / 2.0
                } else {
                    // gap: codes[lo - 1] < code < codes[lo]
                    let (c0, c1) = (self.codes[lo - 1], self.codes[lo]);
                    let t = (code - c0) as f64 / (c1 - c0) as f64;
                    self.raw_at(lo - 1) + t
                }
            }
            Index::Sampled { edges } => {
                let k = (code - first) as usize;
                let lower = edges[k];
                let upper = edges.get(k + 1).copied().unwrap_or(self.raw_max);
                (lower + upper) / 2.0
            }
        }
    }

    /// Raw extent `(low, high)` of the values that encode to `code`.
    ///
    /// Returns `None` when no raw value maps to `code`.
    pub fn bucket(&self, code: i64) -> Option<(f64, f64)> {
        match &self.index {
            Index::Enumerated { origin } => {
                let lo = self.codes.partition_point(|&c| c < code);
                let hi = self.codes.partition_point(|&c| c <= code);
                (lo < hi).then(|| ((*origin + lo as i64) as f64, (*origin + hi as i64 - 1) as f64))
            }
            Index::Sampled { edges } => {
                let k = self.codes.binary_search(&code).ok()?;
                let upper = edges.get(k + 1).copied().unwrap_or(self.raw_max);
                Some((edges[k], upper))
            }
        }
    }
}
