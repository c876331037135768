//! Indexed Arrays
//!
//! Typed sequences on top of the container: each element is encoded to its
//! own entry, so a single element can be decoded without touching the rest.
//! The element format is supplied by the caller through [`ElementEncoder`]
//! and [`ElementDecoder`]; [`json::JsonCodec`] covers serde types.

pub mod cache;
pub mod json;

use std::error::Error as StdError;
use std::marker::PhantomData;
use std::ops::Range;

use rayon::prelude::*;
use thiserror::Error;

use crate::error::IndexedDataError;
use crate::index::{HeaderPosition, IndexedData, IndexedDataBuilder};

pub use cache::CachedArray;
pub use json::{to_indexed_json_array, IndexedJsonArray, JsonCodec};

/// Turns one element into the bytes of one entry
pub trait ElementEncoder<T: ?Sized> {
    type Error: StdError + Send + Sync + 'static;

    fn encode(&self, value: &T) -> Result<Vec<u8>, Self::Error>;
}

/// Turns the bytes of one entry back into an element
pub trait ElementDecoder<T> {
    type Error: StdError + Send + Sync + 'static;

    fn decode(&self, bytes: &[u8]) -> Result<T, Self::Error>;
}

#[derive(Error, Debug)]
pub enum ArrayError {
    #[error(transparent)]
    Container(#[from] IndexedDataError),

    #[error("element {index}: {source}")]
    Codec {
        index: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl ArrayError {
    fn codec(index: usize, source: impl StdError + Send + Sync + 'static) -> Self {
        ArrayError::Codec {
            index,
            source: Box::new(source),
        }
    }
}

/// Encode every element into one finished container
pub fn encode_all<'t, T, E, I>(
    items: I,
    encoder: &E,
    position: HeaderPosition,
) -> Result<Vec<u8>, ArrayError>
where
    T: ?Sized + 't,
    E: ElementEncoder<T>,
    I: IntoIterator<Item = &'t T>,
{
    let mut builder = IndexedDataBuilder::new();
    for (index, item) in items.into_iter().enumerate() {
        let bytes = encoder
            .encode(item)
            .map_err(|e| ArrayError::codec(index, e))?;
        builder.append(&bytes);
    }
    Ok(builder.finish(position))
}

/// [`encode_all`] with elements encoded in parallel
///
/// Entries are still appended in slice order, so the output is identical.
pub fn encode_all_parallel<T, E>(
    items: &[T],
    encoder: &E,
    position: HeaderPosition,
) -> Result<Vec<u8>, ArrayError>
where
    T: Sync,
    E: ElementEncoder<T> + Sync,
{
    let encoded: Vec<Vec<u8>> = items
        .par_iter()
        .enumerate()
        .map(|(index, item)| {
            encoder
                .encode(item)
                .map_err(|e| ArrayError::codec(index, e))
        })
        .collect::<Result<_, _>>()?;

    let total = encoded.iter().map(Vec::len).sum();
    let mut builder = IndexedDataBuilder::with_capacity(total);
    for bytes in &encoded {
        builder.append(bytes);
    }
    Ok(builder.finish(position))
}

/// Lazily decoded view of an encoded array
///
/// Nothing is decoded up front; every [`get`](Self::get) decodes one entry.
pub struct IndexedArray<'a, T, D> {
    data: IndexedData<'a>,
    decoder: D,
    _element: PhantomData<fn() -> T>,
}

impl<'a, T, D: ElementDecoder<T>> IndexedArray<'a, T, D> {
    /// Decode the container header of `buf`
    pub fn new(buf: &'a [u8], position: HeaderPosition, decoder: D) -> Result<Self, ArrayError> {
        Ok(Self::from_data(IndexedData::new(buf, position)?, decoder))
    }

    pub fn from_data(data: IndexedData<'a>, decoder: D) -> Self {
        Self {
            data,
            decoder,
            _element: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decode element `index`
    pub fn get(&self, index: usize) -> Result<T, ArrayError> {
        let bytes = self.data.get(index)?;
        self.decoder
            .decode(bytes)
            .map_err(|e| ArrayError::codec(index, e))
    }

    /// Decode elements in order; reversible with `.rev()`
    pub fn iter(&self) -> Elements<'_, 'a, T, D> {
        Elements {
            array: self,
            range: 0..self.len(),
        }
    }

    /// The underlying container
    #[inline]
    pub fn data(&self) -> &IndexedData<'a> {
        &self.data
    }
}

/// Iterator decoding one element per step
pub struct Elements<'s, 'a, T, D> {
    array: &'s IndexedArray<'a, T, D>,
    range: Range<usize>,
}

impl<T, D: ElementDecoder<T>> Iterator for Elements<'_, '_, T, D> {
    type Item = Result<T, ArrayError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|index| self.array.get(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<T, D: ElementDecoder<T>> DoubleEndedIterator for Elements<'_, '_, T, D> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.range.next_back().map(|index| self.array.get(index))
    }
}

impl<T, D: ElementDecoder<T>> ExactSizeIterator for Elements<'_, '_, T, D> {}
