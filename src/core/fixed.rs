//! Minimal-width little-endian integers
//!
//! Cumulative offsets are stored raw, using only as many bytes as the value
//! needs. Zero still takes one byte so an empty first entry keeps a slot in
//! the width-1 class.

/// Largest width an offset can take
pub const MAX_WIDTH: usize = 8;

/// Bytes needed to hold `value`, in `1..=8`
#[inline]
pub const fn width_of(value: u64) -> usize {
    let bytes = MAX_WIDTH - (value.leading_zeros() as usize >> 3);
    if bytes == 0 {
        1
    } else {
        bytes
    }
}

/// Little-endian bytes of `value` plus how many of them are significant
#[inline]
pub const fn as_le_bytes(value: u64) -> ([u8; MAX_WIDTH], usize) {
    (value.to_le_bytes(), width_of(value))
}

/// Append the low `width` little-endian bytes of `value`
#[inline]
pub fn write_le(value: u64, width: usize, buf: &mut Vec<u8>) {
    debug_assert!((1..=MAX_WIDTH).contains(&width));
    debug_assert!(width >= width_of(value));
    buf.extend_from_slice(&value.to_le_bytes()[..width]);
}

/// Read a little-endian integer of `bytes.len()` bytes (at most 8)
#[inline]
pub fn read_le(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= MAX_WIDTH);
    let mut raw = [0u8; MAX_WIDTH];
    raw[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(raw)
}
