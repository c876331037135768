//! Core encoding primitives
//!
//! - vlq: variable-length unsigned integers, readable in either direction
//! - fixed: minimal-width little-endian integers for the offset table

pub mod fixed;
pub mod vlq;
