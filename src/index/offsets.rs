//! Offset Table
//!
//! Cumulative end offsets of every entry, packed as raw little-endian
//! integers of minimal width. Offsets never decrease, so neither do their
//! widths: the table is a run of 1-byte offsets, then 2-byte ones, and so
//! on. Only the run lengths ("bucket counts", one per width class starting
//! at width 1) are kept as metadata.
//!
//! ```text
//! counts = [3, 2]          bytes = [30, 55, 120, 164, 1, 212, 118]
//!           │  └ width 2          └──── w1 ────┘ └─ w2 ─┘ └─ w2 ─┘
//!           └─── width 1
//! ```

use super::span::Span;
use crate::core::fixed::{read_le, width_of, write_le};
use crate::error::{IndexedDataError, Result};

/// Number of entries described by `counts`
#[inline]
pub fn entry_count(counts: &[usize]) -> usize {
    counts.iter().sum()
}

/// Byte length of the raw offset table described by `counts`
#[inline]
pub fn table_len(counts: &[usize]) -> usize {
    counts
        .iter()
        .enumerate()
        .map(|(class, count)| count * (class + 1))
        .sum()
}

/// Byte span of entry `index`'s offset within the raw table
///
/// Walks the width classes, so the cost is O(distinct widths).
pub fn locate(counts: &[usize], index: usize) -> Option<Span> {
    let mut start = 0;
    let mut relative = index;
    for (class, &count) in counts.iter().enumerate() {
        let width = class + 1;
        if relative < count {
            return Some(Span::with_len(start + relative * width, width));
        }
        relative -= count;
        start += count * width;
    }
    None
}

/// Cumulative offset of entry `index`, read from `bytes`
#[inline]
pub fn value_at(bytes: &[u8], counts: &[usize], index: usize) -> Option<u64> {
    locate(counts, index)
        .and_then(|span| span.try_slice(bytes))
        .map(read_le)
}

/// Payload span of entry `index`: from the previous cumulative offset (0 for
/// the first entry) to its own
pub fn entry_span(
    bytes: &[u8],
    counts: &[usize],
    payload_len: usize,
    index: usize,
) -> Result<Span> {
    let len = entry_count(counts);
    if index >= len {
        return Err(IndexedDataError::IndexOutOfRange { index, len });
    }
    let corrupt = IndexedDataError::CorruptOffset { index };
    let end = value_at(bytes, counts, index).ok_or(corrupt.clone())?;
    let start = match index {
        0 => 0,
        _ => value_at(bytes, counts, index - 1).ok_or(corrupt.clone())?,
    };
    match (usize::try_from(start), usize::try_from(end)) {
        (Ok(start), Ok(end)) if start <= end && end <= payload_len => Ok(Span::new(start, end)),
        _ => Err(corrupt),
    }
}

/// Bucket counts for the first `n` entries of `counts`
///
/// Whole buckets are copied until the one holding entry `n - 1`, which is
/// clipped; everything after it is dropped.
pub fn reduced_counts(counts: &[usize], n: usize) -> Vec<usize> {
    let mut result = Vec::with_capacity(counts.len());
    let mut remaining = n;
    for &count in counts {
        if count < remaining {
            result.push(count);
            remaining -= count;
        } else {
            result.push(remaining);
            break;
        }
    }
    result
}

/// Per-entry width of every offset, in entry order
pub fn widths(counts: &[usize]) -> impl Iterator<Item = usize> + '_ {
    counts
        .iter()
        .enumerate()
        .flat_map(|(class, &count)| std::iter::repeat(class + 1).take(count))
}

/// Mutable offset table owned by a builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    /// Raw offsets, packed with no padding
    bytes: Vec<u8>,
    /// Entries per width class; never empty
    counts: Vec<usize>,
}

impl Default for OffsetTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetTable {
    /// Create an empty table (a single, empty width-1 class)
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            counts: vec![0],
        }
    }

    /// Adopt an already-encoded table without re-encoding it
    pub fn from_parts(bytes: Vec<u8>, mut counts: Vec<usize>) -> Self {
        if counts.is_empty() {
            counts.push(0);
        }
        Self { bytes, counts }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    #[inline]
    pub fn len(&self) -> usize {
        entry_count(&self.counts)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one cumulative offset
    ///
    /// The offset is stored in its minimal width, widened to the current
    /// widest class if needed so classes stay in non-decreasing order.
    pub fn push(&mut self, offset: u64) {
        let width = width_of(offset).max(self.counts.len());
        write_le(offset, width, &mut self.bytes);
        if self.counts.len() < width {
            self.counts.resize(width, 0);
        }
        self.counts[width - 1] += 1;
    }

    #[inline]
    pub fn locate(&self, index: usize) -> Option<Span> {
        locate(&self.counts, index)
    }

    #[inline]
    pub fn value_at(&self, index: usize) -> Option<u64> {
        value_at(&self.bytes, &self.counts, index)
    }

    /// Offset of the last entry, i.e. the payload length (0 when empty)
    pub fn last_value(&self) -> u64 {
        match self.len() {
            0 => 0,
            n => self.value_at(n - 1).unwrap_or(0),
        }
    }

    /// Keep only the first `n` entries; returns the new last offset
    pub fn truncate_to(&mut self, n: usize) -> u64 {
        if n == 0 {
            self.reset();
            return 0;
        }
        let Some(last) = self.locate(n - 1) else {
            // n >= len: nothing to drop
            return self.last_value();
        };
        self.bytes.truncate(last.end);
        self.counts = reduced_counts(&self.counts, n);
        read_le(last.slice(&self.bytes))
    }

    pub fn reset(&mut self) {
        self.bytes.clear();
        self.counts.clear();
        self.counts.push(0);
    }

    /// Take the raw parts, leaving an empty table behind
    pub fn take(&mut self) -> (Vec<u8>, Vec<usize>) {
        let bytes = std::mem::take(&mut self.bytes);
        let counts = std::mem::replace(&mut self.counts, vec![0]);
        (bytes, counts)
    }
}
