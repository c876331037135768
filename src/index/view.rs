//! Indexed Data View
//!
//! Read-only random access over a finished container. Decoding reads only
//! the header (O(width classes)); entries are located on demand and handed
//! out as slices borrowed from the original buffer.

use std::borrow::Cow;
use std::iter::FusedIterator;

use super::builder::IndexedDataBuilder;
use super::layout::{HeaderPosition, Layout};
use super::offsets::{entry_count, entry_span, widths};
use crate::error::Result;

/// Borrowed view of a finished container
///
/// Immutable after construction, so it can be shared across threads.
#[derive(Debug, Clone)]
pub struct IndexedData<'a> {
    payload: &'a [u8],
    offsets: &'a [u8],
    counts: Cow<'a, [usize]>,
    len: usize,
}

impl<'a> IndexedData<'a> {
    /// Decode the header of `buf` laid out per `position`
    pub fn new(buf: &'a [u8], position: HeaderPosition) -> Result<Self> {
        let layout = Layout::decode(buf, position)?;
        Ok(Self {
            payload: layout.payload.slice(buf),
            offsets: layout.offsets.slice(buf),
            len: entry_count(&layout.counts),
            counts: Cow::Owned(layout.counts),
        })
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes of entry `index`, borrowed from the buffer
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        let span = entry_span(self.offsets, &self.counts, self.payload.len(), index)?;
        Ok(span.slice(self.payload))
    }

    /// Entries in order; reversible with `.rev()`
    pub fn iter(&self) -> Entries<'_, 'a> {
        Entries {
            data: self,
            front: 0,
            back: self.len,
        }
    }

    /// Entries per width class (index 0 is the 1-byte class)
    #[inline]
    pub fn width_classes(&self) -> &[usize] {
        &self.counts
    }

    /// Offset width of every entry, in entry order
    pub fn entry_widths(&self) -> impl Iterator<Item = usize> + '_ {
        widths(&self.counts)
    }

    /// All entry bytes, concatenated
    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Raw offset table
    #[inline]
    pub fn offset_table(&self) -> &'a [u8] {
        self.offsets
    }

    /// Builder holding exactly the decoded state, ready for more appends
    pub fn to_builder(&self) -> IndexedDataBuilder {
        IndexedDataBuilder::from_parts(
            self.payload.to_vec(),
            self.offsets.to_vec(),
            self.counts.to_vec(),
        )
    }
}

impl<'v, 'a> IntoIterator for &'v IndexedData<'a> {
    type Item = Result<&'a [u8]>;
    type IntoIter = Entries<'v, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of an [`IndexedData`]
///
/// Yields an error only for entries whose offsets are corrupt.
#[derive(Debug, Clone)]
pub struct Entries<'v, 'a> {
    data: &'v IndexedData<'a>,
    front: usize,
    back: usize,
}

impl<'a> Iterator for Entries<'_, 'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let entry = self.data.get(self.front);
        self.front += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Entries<'_, '_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.data.get(self.back))
    }
}

impl ExactSizeIterator for Entries<'_, '_> {}

impl FusedIterator for Entries<'_, '_> {}

/// A finished container that owns its buffer
///
/// Decoded once; [`as_borrowed`](Self::as_borrowed) is O(1).
#[derive(Debug, Clone)]
pub struct OwnedIndexedData {
    buffer: Vec<u8>,
    layout: Layout,
}

impl OwnedIndexedData {
    /// Take ownership of `buffer` and decode its header
    pub fn new(buffer: Vec<u8>, position: HeaderPosition) -> Result<Self> {
        let layout = Layout::decode(&buffer, position)?;
        Ok(Self { buffer, layout })
    }

    pub fn as_borrowed(&self) -> IndexedData<'_> {
        IndexedData {
            payload: self.layout.payload.slice(&self.buffer),
            offsets: self.layout.offsets.slice(&self.buffer),
            counts: Cow::Borrowed(&self.layout.counts),
            len: self.layout.len(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Bytes of entry `index`
    pub fn get(&self, index: usize) -> Result<&[u8]> {
        let span = entry_span(
            self.layout.offsets.slice(&self.buffer),
            &self.layout.counts,
            self.layout.payload.len(),
            index,
        )?;
        Ok(span.slice(self.layout.payload.slice(&self.buffer)))
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}
