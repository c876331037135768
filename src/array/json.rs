//! JSON element codec
//!
//! One serde_json document per entry. Compared with a plain JSON array the
//! container costs a few offset bytes per element but any element can be
//! read without parsing the others.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{encode_all, ArrayError, ElementDecoder, ElementEncoder, IndexedArray};
use crate::index::HeaderPosition;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T: Serialize + ?Sized> ElementEncoder<T> for JsonCodec {
    type Error = serde_json::Error;

    fn encode(&self, value: &T) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(value)
    }
}

impl<T: DeserializeOwned> ElementDecoder<T> for JsonCodec {
    type Error = serde_json::Error;

    fn decode(&self, bytes: &[u8]) -> Result<T, Self::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Lazily decoded array of JSON elements
pub type IndexedJsonArray<'a, T> = IndexedArray<'a, T, JsonCodec>;

impl<'a, T: DeserializeOwned> IndexedArray<'a, T, JsonCodec> {
    /// Read a postfix container of JSON elements
    pub fn from_json(buf: &'a [u8]) -> Result<Self, ArrayError> {
        Self::new(buf, HeaderPosition::Postfix, JsonCodec)
    }
}

/// Encode `items` as one JSON document per entry, postfix layout
pub fn to_indexed_json_array<'t, T, I>(items: I) -> Result<Vec<u8>, ArrayError>
where
    T: Serialize + ?Sized + 't,
    I: IntoIterator<Item = &'t T>,
{
    encode_all(items, &JsonCodec, HeaderPosition::Postfix)
}
