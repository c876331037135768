//! ResourceArc Wrappers
//!
//! Builders are mutable and shared with the BEAM, so they sit behind a
//! mutex. Decoded containers are immutable and need no lock.

use std::sync::Mutex;

use rustler::ResourceArc;

use crate::error::Result;
use crate::index::{HeaderPosition, IndexedDataBuilder, OwnedIndexedData};

pub struct BuilderResource {
    pub inner: Mutex<IndexedDataBuilder>,
}

impl BuilderResource {
    pub fn new() -> Self {
        Self::from_builder(IndexedDataBuilder::new())
    }

    pub fn from_builder(builder: IndexedDataBuilder) -> Self {
        BuilderResource {
            inner: Mutex::new(builder),
        }
    }

    /// Run `f` with the builder locked
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if a previous holder panicked.
    pub fn with_builder<F, R>(&self, f: F) -> std::result::Result<R, &'static str>
    where
        F: FnOnce(&mut IndexedDataBuilder) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for BuilderResource {}

impl Default for BuilderResource {
    fn default() -> Self {
        Self::new()
    }
}

pub type BuilderRef = ResourceArc<BuilderResource>;

/// A decoded container; entries are handed out as sub-binaries of `data`
pub struct IndexedDataResource {
    pub data: OwnedIndexedData,
}

impl IndexedDataResource {
    pub fn new(buffer: Vec<u8>, position: HeaderPosition) -> Result<Self> {
        Ok(IndexedDataResource {
            data: OwnedIndexedData::new(buffer, position)?,
        })
    }
}

#[rustler::resource_impl]
impl rustler::Resource for IndexedDataResource {}

pub type IndexedDataRef = ResourceArc<IndexedDataResource>;
