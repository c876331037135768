//! Indexed Data Container
//!
//! A sequence of opaque byte entries stored as one buffer with a compact
//! random-access index:
//!
//! - **Payload**: every entry's bytes, concatenated in order.
//! - **Offset table**: each entry's cumulative end offset as a raw
//!   little-endian integer of minimal width. Widths never decrease, so only
//!   the run length of each width class is recorded.
//! - **Header**: the VLQ run lengths plus their count, either before the
//!   data (prefix) or after it (postfix).
//!
//! ## Architecture
//!
//! ```text
//! IndexedDataBuilder                 IndexedData<'a> / OwnedIndexedData
//! ├── data: Vec<u8>       finish()   ├── payload: &'a [u8]
//! └── offsets: OffsetTable  ───────► ├── offsets: &'a [u8]
//!     ├── bytes: Vec<u8>  ◄───────── └── counts: [usize; W]
//!     └── counts: Vec<usize>  to_builder()
//! ```
//!
//! | Operation            | Cost                     |
//! |----------------------|--------------------------|
//! | append               | O(entry len)             |
//! | get / locate         | O(width classes) ≤ 8     |
//! | truncate_last        | O(width classes)         |
//! | split_at             | O(moved entries)         |
//! | decode header        | O(width classes)         |

pub mod builder;
pub mod layout;
pub mod offsets;
pub mod span;
pub mod view;

#[cfg(test)]
mod properties;

pub use builder::IndexedDataBuilder;
pub use layout::{HeaderPosition, Layout};
pub use span::Span;
pub use view::{Entries, IndexedData, OwnedIndexedData};
