//! LRU cache of decoded elements
//!
//! For arrays where the same few elements are read repeatedly and decoding
//! dominates. The cache sits behind a `Mutex` so a `CachedArray` can still be
//! shared read-only across threads.

use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use lru::LruCache;

use super::{ArrayError, ElementDecoder, IndexedArray};

pub struct CachedArray<'a, T, D> {
    array: IndexedArray<'a, T, D>,
    cache: Mutex<LruCache<usize, T>>,
}

impl<'a, T: Clone, D: ElementDecoder<T>> CachedArray<'a, T, D> {
    /// Wrap `array`, keeping up to `capacity` decoded elements
    pub fn new(array: IndexedArray<'a, T, D>, capacity: NonZeroUsize) -> Self {
        Self {
            array,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.array.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Element `index`, decoded at most once while it stays cached
    pub fn get(&self, index: usize) -> Result<T, ArrayError> {
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&index)
        {
            return Ok(hit.clone());
        }

        // Decode without holding the lock
        let value = self.array.get(index)?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(index, value.clone());
        Ok(value)
    }

    /// Number of elements currently cached
    pub fn cached(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn into_inner(self) -> IndexedArray<'a, T, D> {
        self.array
    }
}
