//! Container Layout
//!
//! Where the header sits and how to find the offset table and payload in a
//! finished buffer.
//!
//! ```text
//! postfix: [payload][offsets][count[W-1] rev-VLQ]..[count[0] rev-VLQ][W]
//! prefix:  [W][count[0] VLQ]..[count[W-1] VLQ][offsets][payload]
//! ```
//!
//! `W` is the number of width classes. The postfix header is written
//! back-to-front so it can be decoded by scanning left from the last byte.

use super::offsets::{entry_count, table_len, value_at};
use super::span::Span;
use crate::core::fixed::MAX_WIDTH;
use crate::core::vlq::{self, Direction};
use crate::error::{IndexedDataError, Result};

/// Placement of the bucket-count header relative to the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum HeaderPosition {
    /// Header first, then offsets, then payload
    Prefix,
    /// Payload first, offsets next, header last
    #[default]
    Postfix,
}

/// Serialized size of the header for `counts`
pub fn header_len(counts: &[usize]) -> usize {
    vlq::encoded_len(counts.len() as u64)
        + counts
            .iter()
            .map(|&count| vlq::encoded_len(count as u64))
            .sum::<usize>()
}

/// Append the header for `counts` in the layout's byte order
pub fn encode_header(counts: &[usize], position: HeaderPosition, out: &mut Vec<u8>) {
    out.reserve(header_len(counts));
    match position {
        HeaderPosition::Postfix => {
            for &count in counts.iter().rev() {
                vlq::encode_reversed_into(count as u64, out);
            }
            vlq::encode_into(counts.len() as u64, out);
        }
        HeaderPosition::Prefix => {
            vlq::encode_into(counts.len() as u64, out);
            for &count in counts {
                vlq::encode_into(count as u64, out);
            }
        }
    }
}

/// Decoded structure of a finished buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Entries per width class
    pub counts: Vec<usize>,
    /// Raw offset table
    pub offsets: Span,
    /// Concatenated entry bytes
    pub payload: Span,
}

impl Layout {
    /// Decode the header of `buf` and locate its regions
    pub fn decode(buf: &[u8], position: HeaderPosition) -> Result<Self> {
        let layout = match position {
            HeaderPosition::Postfix => Self::decode_postfix(buf),
            HeaderPosition::Prefix => Self::decode_prefix(buf),
        };
        if let Err(ref err) = layout {
            tracing::debug!(?position, len = buf.len(), %err, "rejected container");
        }
        layout
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        entry_count(&self.counts)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn decode_postfix(buf: &[u8]) -> Result<Self> {
        let len = buf.len();
        let last = len.checked_sub(1).ok_or(IndexedDataError::TruncatedHeader {
            needed: 1,
            available: 0,
        })?;

        // W is the final group; a continuation bit there walks off the end
        let (classes, _) = vlq::decode(buf, last, Direction::Forward)?;
        let classes = width_class_count(classes)?;

        let mut counts = Vec::with_capacity(classes);
        let mut cursor = last;
        for _ in 0..classes {
            let pos = cursor
                .checked_sub(1)
                .ok_or(IndexedDataError::TruncatedHeader {
                    needed: len - cursor + 1,
                    available: len,
                })?;
            let (count, consumed) = vlq::decode(buf, pos, Direction::Reverse)?;
            counts.push(to_usize(count, pos)?);
            cursor = pos + 1 - consumed;
        }

        let table = checked_table_len(&counts, len)?;
        let offsets_start = cursor
            .checked_sub(table)
            .ok_or(IndexedDataError::TruncatedHeader {
                needed: table + (len - cursor),
                available: len,
            })?;
        let offsets = Span::new(offsets_start, cursor);
        let declared = declared_payload(offsets.slice(buf), &counts)?;
        if declared != offsets_start {
            return Err(IndexedDataError::PayloadMismatch {
                declared,
                actual: offsets_start,
            });
        }

        Ok(Self {
            counts,
            offsets,
            payload: Span::new(0, offsets_start),
        })
    }

    fn decode_prefix(buf: &[u8]) -> Result<Self> {
        let len = buf.len();
        if len == 0 {
            return Err(IndexedDataError::TruncatedHeader {
                needed: 1,
                available: 0,
            });
        }

        let (classes, mut cursor) = vlq::decode(buf, 0, Direction::Forward)?;
        let classes = width_class_count(classes)?;

        let mut counts = Vec::with_capacity(classes);
        for _ in 0..classes {
            if cursor >= len {
                return Err(IndexedDataError::TruncatedHeader {
                    needed: cursor + 1,
                    available: len,
                });
            }
            let (count, consumed) = vlq::decode(buf, cursor, Direction::Forward)?;
            counts.push(to_usize(count, cursor)?);
            cursor += consumed;
        }

        let table = checked_table_len(&counts, len)?;
        let offsets_end = cursor + table;
        if offsets_end > len {
            return Err(IndexedDataError::TruncatedHeader {
                needed: offsets_end,
                available: len,
            });
        }
        let offsets = Span::new(cursor, offsets_end);
        let declared = declared_payload(offsets.slice(buf), &counts)?;
        if declared != len - offsets_end {
            return Err(IndexedDataError::PayloadMismatch {
                declared,
                actual: len - offsets_end,
            });
        }

        Ok(Self {
            counts,
            offsets,
            payload: Span::new(offsets_end, len),
        })
    }
}

fn width_class_count(classes: u64) -> Result<usize> {
    match usize::try_from(classes) {
        Ok(classes) if classes <= MAX_WIDTH => Ok(classes),
        _ => Err(IndexedDataError::TooManyWidthClasses(
            classes.min(usize::MAX as u64) as usize,
        )),
    }
}

fn to_usize(value: u64, position: usize) -> Result<usize> {
    usize::try_from(value).map_err(|_| IndexedDataError::MalformedVarint { position })
}

/// Table length, rejecting counts no buffer of `available` bytes could hold
fn checked_table_len(counts: &[usize], available: usize) -> Result<usize> {
    let mut total: usize = 0;
    for (class, &count) in counts.iter().enumerate() {
        total = count
            .checked_mul(class + 1)
            .and_then(|bytes| total.checked_add(bytes))
            .filter(|&total| total <= available)
            .ok_or(IndexedDataError::TruncatedHeader {
                needed: usize::MAX,
                available,
            })?;
    }
    debug_assert_eq!(total, table_len(counts));
    Ok(total)
}

/// Payload length according to the last offset in the table
fn declared_payload(table: &[u8], counts: &[usize]) -> Result<usize> {
    let declared = match entry_count(counts) {
        0 => 0,
        n => value_at(table, counts, n - 1).unwrap_or(0),
    };
    usize::try_from(declared).map_err(|_| IndexedDataError::CorruptOffset {
        index: entry_count(counts).saturating_sub(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(counts: &[usize], position: HeaderPosition) -> Vec<u8> {
        let mut out = Vec::new();
        encode_header(counts, position, &mut out);
        out
    }

    #[test]
    fn test_encode_header_postfix() {
        assert_eq!(header(&[1], HeaderPosition::Postfix), vec![1, 1]);
        assert_eq!(header(&[3, 2], HeaderPosition::Postfix), vec![2, 3, 2]);
        assert_eq!(header(&[0], HeaderPosition::Postfix), vec![0, 1]);
        // Multi-byte counts are byte-reversed
        assert_eq!(header(&[250], HeaderPosition::Postfix), vec![1, 250, 1]);
    }

    #[test]
    fn test_encode_header_prefix() {
        assert_eq!(header(&[1], HeaderPosition::Prefix), vec![1, 1]);
        assert_eq!(header(&[3, 2], HeaderPosition::Prefix), vec![2, 3, 2]);
        assert_eq!(header(&[250], HeaderPosition::Prefix), vec![1, 250, 1]);
    }

    #[test]
    fn test_header_len() {
        assert_eq!(header_len(&[1]), 2);
        assert_eq!(header_len(&[250, 16384]), 1 + 2 + 3);
    }

    #[test]
    fn test_decode_postfix_single() {
        let buf = [22, 11, 11, 2, 3, 5, 1, 1];
        let layout = Layout::decode(&buf, HeaderPosition::Postfix).unwrap();
        assert_eq!(layout.counts, vec![1]);
        assert_eq!(layout.offsets, Span::new(5, 6));
        assert_eq!(layout.payload, Span::new(0, 5));
        assert_eq!(layout.len(), 1);
    }

    #[test]
    fn test_decode_prefix_single() {
        let buf = [1, 1, 5, 22, 11, 11, 2, 3];
        let layout = Layout::decode(&buf, HeaderPosition::Prefix).unwrap();
        assert_eq!(layout.counts, vec![1]);
        assert_eq!(layout.offsets, Span::new(2, 3));
        assert_eq!(layout.payload, Span::new(3, 8));
    }

    #[test]
    fn test_decode_multibyte_count() {
        let mut buf = vec![7u8; 250];
        buf.extend(1..=250u8);
        buf.extend(header(&[250], HeaderPosition::Postfix));
        let layout = Layout::decode(&buf, HeaderPosition::Postfix).unwrap();
        assert_eq!(layout.counts, vec![250]);
        assert_eq!(layout.payload, Span::new(0, 250));
    }

    #[test]
    fn test_decode_empty_container() {
        let layout = Layout::decode(&[0, 1], HeaderPosition::Postfix).unwrap();
        assert!(layout.is_empty());
        assert!(layout.payload.is_empty());

        let layout = Layout::decode(&[1, 0], HeaderPosition::Prefix).unwrap();
        assert!(layout.is_empty());
        assert!(layout.payload.is_empty());

        // No width classes at all
        assert!(Layout::decode(&[0], HeaderPosition::Postfix).unwrap().is_empty());
    }

    #[test]
    fn test_decode_empty_buffer() {
        for position in [HeaderPosition::Prefix, HeaderPosition::Postfix] {
            assert_eq!(
                Layout::decode(&[], position),
                Err(IndexedDataError::TruncatedHeader {
                    needed: 1,
                    available: 0
                })
            );
        }
    }

    #[test]
    fn test_decode_trailing_continuation_bit() {
        assert!(matches!(
            Layout::decode(&[1, 2, 0x81], HeaderPosition::Postfix),
            Err(IndexedDataError::MalformedVarint { .. })
        ));
    }

    #[test]
    fn test_decode_too_many_classes() {
        assert_eq!(
            Layout::decode(&[9], HeaderPosition::Postfix),
            Err(IndexedDataError::TooManyWidthClasses(9))
        );
        assert_eq!(
            Layout::decode(&[12, 0], HeaderPosition::Prefix),
            Err(IndexedDataError::TooManyWidthClasses(12))
        );
    }

    #[test]
    fn test_decode_missing_counts() {
        // Declares two classes but only one count byte precedes W
        assert!(matches!(
            Layout::decode(&[1, 2], HeaderPosition::Postfix),
            Err(IndexedDataError::TruncatedHeader { .. })
        ));
        assert!(matches!(
            Layout::decode(&[2, 1], HeaderPosition::Prefix),
            Err(IndexedDataError::TruncatedHeader { .. })
        ));
    }

    #[test]
    fn test_decode_offsets_past_buffer() {
        // 5 one-byte offsets declared, only 1 byte available
        assert!(matches!(
            Layout::decode(&[3, 5, 1], HeaderPosition::Postfix),
            Err(IndexedDataError::TruncatedHeader { .. })
        ));
        assert!(matches!(
            Layout::decode(&[1, 5, 3], HeaderPosition::Prefix),
            Err(IndexedDataError::TruncatedHeader { .. })
        ));
    }

    #[test]
    fn test_decode_payload_mismatch() {
        // Last offset claims 9 bytes, 5 are present
        assert_eq!(
            Layout::decode(&[22, 11, 11, 2, 3, 9, 1, 1], HeaderPosition::Postfix),
            Err(IndexedDataError::PayloadMismatch {
                declared: 9,
                actual: 5
            })
        );
        assert_eq!(
            Layout::decode(&[1, 1, 2, 22, 11, 11], HeaderPosition::Prefix),
            Err(IndexedDataError::PayloadMismatch {
                declared: 2,
                actual: 3
            })
        );
    }
}
