//! Error types for container encoding and decoding.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexedDataError {
    /// A VLQ sequence ran off the buffer (or past 64 bits) before terminating.
    #[error("malformed varint at byte {position}")]
    MalformedVarint { position: usize },

    #[error("truncated header: need {needed} bytes, buffer has {available}")]
    TruncatedHeader { needed: usize, available: usize },

    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot drop {requested} entries from a container of {available}")]
    EmptyTruncation { requested: usize, available: usize },

    #[error("header declares {0} width classes, at most 8 are possible")]
    TooManyWidthClasses(usize),

    #[error("offset table declares {declared} payload bytes, buffer holds {actual}")]
    PayloadMismatch { declared: usize, actual: usize },

    /// Offsets for this entry decrease or point past the payload.
    #[error("corrupt offset for entry {index}")]
    CorruptOffset { index: usize },
}

pub type Result<T> = std::result::Result<T, IndexedDataError>;
