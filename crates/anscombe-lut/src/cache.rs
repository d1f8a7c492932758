//! Thread-safe lookup table caching.
//!
//! Cache built tables to avoid rebuilding them for every chunk encoded with
//! the same parameters.
//!
//! ```rust
//! use anscombe_core::{DataType, TransformParameters};
//! use anscombe_lut::{TableBuilder, TableCache};
//!
//! let params = TransformParameters::new(20.0, 30.0, 1.0).unwrap();
//! let builder = TableBuilder::new(params, DataType::I16, DataType::U8);
//! let cache = TableCache::new();
//!
//! // First call builds the table
//! let t1 = cache.get_or_build(&builder).unwrap();
//!
//! // Second call returns the same table
//! let t2 = cache.get_or_build(&builder).unwrap();
//! assert!(std::sync::Arc::ptr_eq(&t1, &t2));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use anscombe_core::{DataType, Result};
use tracing::trace;

use crate::table::{LookupTable, TableBuilder};

/// Cache key for table lookup.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct CacheKey {
    params: [u64; 3],
    decoded: DataType,
    encoded: DataType,
    max_entries: usize,
}

impl CacheKey {
    fn of(builder: &TableBuilder) -> Self {
        Self {
            params: builder.params().to_bits(),
            decoded: builder.decoded(),
            encoded: builder.encoded(),
            max_entries: builder.entry_bound(),
        }
    }
}

/// Thread-safe table cache.
///
/// Caches built tables by parameters, dtype pair and entry bound. Tables
/// are published only once fully built, so readers never observe a
/// partial table. The cache is an ordinary value: create one per process,
/// per codec, or per batch, and drop it to release the tables.
#[derive(Debug, Default)]
pub struct TableCache {
    tables: RwLock<HashMap<CacheKey, Arc<LookupTable>>>,
}

impl TableCache {
    /// Create empty cache.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Get or build the table described by `builder`.
    ///
    /// When two threads miss at the same time both build, and the first
    /// table published is the one every caller receives.
    pub fn get_or_build(&self, builder: &TableBuilder) -> Result<Arc<LookupTable>> {
        let key = CacheKey::of(builder);

        // Try read lock first (fast path)
        {
            let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(table) = tables.get(&key) {
                trace!(decoded = %key.decoded, encoded = %key.encoded, "table cache hit");
                return Ok(Arc::clone(table));
            }
        }

        // Cache miss - build outside the lock
        trace!(decoded = %key.decoded, encoded = %key.encoded, "table cache miss");
        let built = Arc::new(builder.build()?);

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let table = tables.entry(key).or_insert(built);
        Ok(Arc::clone(table))
    }

    /// Drop all cached tables.
    pub fn clear(&self) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.tables.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
