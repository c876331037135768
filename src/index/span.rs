//! Span - half-open byte range into a buffer owned elsewhere
//!
//! Offset-table lookups and the decoded layout of a finished container are
//! expressed as spans; the bytes themselves stay in the owning buffer.

use std::ops::Range;

/// A `[start, end)` range of bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// First byte (inclusive)
    pub start: usize,
    /// One past the last byte
    pub end: usize,
}

impl Span {
    /// Create a new span
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a span of `len` bytes starting at `start`
    #[inline]
    pub const fn with_len(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extract the byte slice, or `None` if the span does not fit `input`
    #[inline]
    pub fn try_slice<'a>(&self, input: &'a [u8]) -> Option<&'a [u8]> {
        input.get(self.start..self.end)
    }

    /// Extract the byte slice, empty when out of bounds
    #[inline]
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        self.try_slice(input).unwrap_or(&[])
    }

    #[inline]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}
