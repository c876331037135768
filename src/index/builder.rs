//! Indexed Data Builder
//!
//! Accumulates entries into a payload buffer plus an offset table, supports
//! tail edits (drop, split) in place, and serializes to either layout.
//!
//! A builder is single-owner: mutation takes `&mut self` and there is no
//! internal locking. Wrap it in a `Mutex` to share it (see `resource.rs`).

use std::io::{self, Write};

use super::layout::{encode_header, header_len, HeaderPosition};
use super::offsets::{entry_span, OffsetTable};
use crate::error::{IndexedDataError, Result};

/// Mutable accumulator for an indexed data container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDataBuilder {
    /// Concatenated entry bytes
    data: Vec<u8>,
    /// Cumulative end offset of every entry
    offsets: OffsetTable,
}

impl Default for IndexedDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexedDataBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create an empty builder with room for `bytes` of payload
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            offsets: OffsetTable::new(),
        }
    }

    /// Adopt decoded state as-is (no re-encoding)
    pub fn from_parts(data: Vec<u8>, offset_bytes: Vec<u8>, counts: Vec<usize>) -> Self {
        Self {
            data,
            offsets: OffsetTable::from_parts(offset_bytes, counts),
        }
    }

    /// Append one entry
    pub fn append(&mut self, entry: &[u8]) {
        self.data.extend_from_slice(entry);
        self.offsets.push(self.data.len() as u64);
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries per width class (index 0 is the 1-byte class)
    #[inline]
    pub fn width_classes(&self) -> &[usize] {
        self.offsets.counts()
    }

    /// Bytes of entry `index`
    pub fn get(&self, index: usize) -> Result<&[u8]> {
        let span = entry_span(
            self.offsets.bytes(),
            self.offsets.counts(),
            self.data.len(),
            index,
        )?;
        Ok(span.slice(&self.data))
    }

    /// Drop the last `k` entries
    ///
    /// Dropping more entries than exist empties the builder.
    pub fn truncate_last(&mut self, k: usize) {
        if k == 0 {
            return;
        }
        let count = self.len();
        if k >= count {
            if k > count {
                tracing::debug!(requested = k, available = count, "truncation clamped to empty");
            }
            self.reset();
            return;
        }
        self.truncate_to(count - k);
    }

    /// Like [`truncate_last`](Self::truncate_last) but refuses to clamp
    pub fn try_truncate_last(&mut self, k: usize) -> Result<()> {
        let available = self.len();
        if k > available {
            return Err(IndexedDataError::EmptyTruncation {
                requested: k,
                available,
            });
        }
        self.truncate_last(k);
        Ok(())
    }

    /// Split after entry `k`
    ///
    /// `self` keeps entries `0..=k`; the returned builder owns the rest,
    /// with offsets rebased to start at zero. Each moved entry costs one
    /// table lookup and re-encode, so this is O(moved entries) rather than
    /// O(1) like the other edits. With `k` at or past the last entry the
    /// returned builder is empty and `self` is untouched.
    pub fn split_at(&mut self, k: usize) -> Self {
        let count = self.len();
        let mut tail = Self::new();
        if k.saturating_add(1) >= count {
            if k >= count && count > 0 {
                tracing::debug!(index = k, available = count, "split point past last entry");
            }
            return tail;
        }

        let base = self.offsets.value_at(k).unwrap_or(0);
        tail.data = self.data.get(base as usize..).unwrap_or(&[]).to_vec();
        for index in (k + 1)..count {
            let end = self.offsets.value_at(index).unwrap_or(base);
            tail.offsets.push(end.saturating_sub(base));
        }

        self.truncate_to(k + 1);
        tail
    }

    /// Size of the serialized container
    pub fn serialized_len(&self, _position: HeaderPosition) -> usize {
        self.data.len() + self.offsets.bytes().len() + header_len(self.offsets.counts())
    }

    /// Emit the serialized container as a sequence of chunks
    ///
    /// Concatenating the chunks gives exactly what [`finish`](Self::finish)
    /// would return, but nothing is copied and the builder is left as is.
    pub fn stream<F>(&self, position: HeaderPosition, mut sink: F)
    where
        F: FnMut(&[u8]),
    {
        let mut header = Vec::new();
        encode_header(self.offsets.counts(), position, &mut header);

        match position {
            HeaderPosition::Postfix => {
                sink(&self.data);
                sink(self.offsets.bytes());
                sink(&header);
            }
            HeaderPosition::Prefix => {
                sink(&header);
                sink(self.offsets.bytes());
                sink(&self.data);
            }
        }
    }

    /// Write the serialized container to `writer`
    pub fn write_to<W: Write>(&self, position: HeaderPosition, mut writer: W) -> io::Result<()> {
        let mut result = Ok(());
        self.stream(position, |chunk| {
            if result.is_ok() {
                result = writer.write_all(chunk);
            }
        });
        result
    }

    /// Serialized copy of the container, leaving the builder intact
    pub fn to_bytes(&self, position: HeaderPosition) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len(position));
        self.stream(position, |chunk| out.extend_from_slice(chunk));
        out
    }

    /// Serialize the container and reset the builder to empty
    pub fn finish(&mut self, position: HeaderPosition) -> Vec<u8> {
        let total = self.serialized_len(position);
        let mut data = std::mem::take(&mut self.data);
        let (offsets, counts) = self.offsets.take();

        let out = match position {
            HeaderPosition::Postfix => {
                // Payload is already first; grow it in place
                data.reserve_exact(total - data.len());
                data.extend_from_slice(&offsets);
                encode_header(&counts, position, &mut data);
                data
            }
            HeaderPosition::Prefix => {
                let mut out = Vec::with_capacity(total);
                encode_header(&counts, position, &mut out);
                out.extend_from_slice(&offsets);
                out.extend_from_slice(&data);
                out
            }
        };

        tracing::trace!(?position, bytes = out.len(), classes = counts.len(), "finished container");
        out
    }

    fn truncate_to(&mut self, n: usize) {
        let end = self.offsets.truncate_to(n);
        self.data.truncate(end as usize);
    }

    fn reset(&mut self) {
        self.data.clear();
        self.offsets.reset();
    }
}
