//! Variable-Length Quantity Codec
//!
//! Little-endian base-128 integers: every group except the last carries the
//! continuation bit (0x80). The container header stores its bucket counts
//! this way, forward in the prefix layout and byte-reversed in the postfix
//! layout so it can be read right-to-left from the end of a buffer.

use crate::error::{IndexedDataError, Result};

const CONTINUATION: u8 = 0x80;
const GROUP_MASK: u8 = 0x7F;

/// Walk direction for [`decode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending byte index
    Forward,
    /// Descending byte index
    Reverse,
}

impl Direction {
    #[inline]
    const fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

/// Encode `value` as a fresh VLQ byte vector
pub fn encode(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(value));
    encode_into(value, &mut buf);
    buf
}

/// Append the VLQ encoding of `value` to `buf`
pub fn encode_into(mut value: u64, buf: &mut Vec<u8>) {
    while value > GROUP_MASK as u64 {
        buf.push((value as u8 & GROUP_MASK) | CONTINUATION);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Append the VLQ encoding of `value` to `buf` with its bytes reversed
///
/// The terminating group lands first, so a reverse [`decode`] starting at
/// the last pushed byte reads the value back.
pub fn encode_reversed_into(value: u64, buf: &mut Vec<u8>) {
    let start = buf.len();
    encode_into(value, buf);
    buf[start..].reverse();
}

/// Number of bytes [`encode`] produces for `value`
#[inline]
pub const fn encoded_len(value: u64) -> usize {
    let bits = (u64::BITS - value.leading_zeros()) as usize;
    if bits == 0 {
        1
    } else {
        bits.div_ceil(7)
    }
}

/// Decode one VLQ value starting at `buf[start]`
///
/// Returns the value and the number of groups consumed. In reverse, the
/// next value (if any) starts at `start - consumed`.
pub fn decode(buf: &[u8], start: usize, direction: Direction) -> Result<(u64, usize)> {
    let malformed = IndexedDataError::MalformedVarint { position: start };
    let mut result: u64 = 0;
    let mut consumed = 0usize;
    let mut index = start;

    loop {
        let byte = *buf.get(index).ok_or(malformed.clone())?;
        let group = (byte & GROUP_MASK) as u64;
        let shift = 7 * consumed as u32;
        // A tenth group, or a ninth carrying more than the top bit, overflows u64
        if shift >= u64::BITS || (shift == 63 && group > 1) {
            return Err(malformed);
        }
        result |= group << shift;
        consumed += 1;

        if byte & CONTINUATION == 0 {
            return Ok((result, consumed));
        }
        index = index
            .checked_add_signed(direction.step())
            .ok_or(malformed.clone())?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode(0), vec![0]);
        assert_eq!(encode(25), vec![25]);
        assert_eq!(encode(127), vec![127]);
        assert_eq!(encode(250), vec![250, 1]);
        assert_eq!(encode(1250), vec![226, 9]);
        assert_eq!(encode(16384), vec![128, 128, 1]);
        assert_eq!(encode(0xff), vec![255, 1]);
        assert_eq!(encode(0xaaff), vec![255, 213, 2]);
    }

    #[test]
    fn test_encoded_len_matches_encode() {
        for value in [0, 1, 127, 128, 16383, 16384, u32::MAX as u64, u64::MAX] {
            assert_eq!(encoded_len(value), encode(value).len(), "value {value}");
        }
        assert_eq!(encoded_len(u64::MAX), 10);
    }

    #[test]
    fn test_decode_forward() {
        assert_eq!(decode(&[25], 0, Direction::Forward).unwrap(), (25, 1));
        assert_eq!(decode(&[250, 1], 0, Direction::Forward).unwrap(), (250, 2));
        assert_eq!(decode(&[226, 9], 0, Direction::Forward).unwrap(), (1250, 2));
        assert_eq!(decode(&[128, 128, 1], 0, Direction::Forward).unwrap(), (16384, 3));
        assert_eq!(decode(&[128, 128, 2], 0, Direction::Forward).unwrap().1, 3);
        assert_eq!(decode(&[255, 213, 2], 0, Direction::Forward).unwrap(), (0xaaff, 3));
    }

    #[test]
    fn test_decode_reverse() {
        assert_eq!(decode(&[1, 250], 1, Direction::Reverse).unwrap(), (250, 2));
        assert_eq!(decode(&[9, 226], 1, Direction::Reverse).unwrap(), (1250, 2));
        assert_eq!(decode(&[1, 128, 128], 2, Direction::Reverse).unwrap(), (16384, 3));
        assert_eq!(decode(&[2, 213, 255], 2, Direction::Reverse).unwrap(), (0xaaff, 3));
    }

    #[test]
    fn test_decode_both_directions_agree() {
        for value in [0, 1, 127, 128, 300, 1250, 16384, 1 << 35, u64::MAX] {
            let forward = encode(value);
            let mut reversed = Vec::new();
            encode_reversed_into(value, &mut reversed);

            let f = decode(&forward, 0, Direction::Forward).unwrap();
            let r = decode(&reversed, reversed.len() - 1, Direction::Reverse).unwrap();
            assert_eq!(f, (value, forward.len()));
            assert_eq!(r, f);
        }
    }

    #[test]
    fn test_decode_mid_buffer() {
        let mut buf = vec![0xEE, 0xEE];
        encode_into(1250, &mut buf);
        encode_into(7, &mut buf);
        assert_eq!(decode(&buf, 2, Direction::Forward).unwrap(), (1250, 2));
        assert_eq!(decode(&buf, 4, Direction::Forward).unwrap(), (7, 1));
    }

    #[test]
    fn test_decode_runs_off_end() {
        assert_eq!(
            decode(&[], 0, Direction::Forward),
            Err(IndexedDataError::MalformedVarint { position: 0 })
        );
        assert!(decode(&[128, 128], 0, Direction::Forward).is_err());
        // Reverse walk hits index 0 with the continuation bit still set
        assert!(decode(&[128, 128], 1, Direction::Reverse).is_err());
    }

    #[test]
    fn test_decode_overflow() {
        let too_long = [0xFF; 11];
        assert!(decode(&too_long, 0, Direction::Forward).is_err());

        let mut max = encode(u64::MAX);
        assert_eq!(decode(&max, 0, Direction::Forward).unwrap().0, u64::MAX);
        *max.last_mut().unwrap() = 2;
        assert!(decode(&max, 0, Direction::Forward).is_err());
    }
}
