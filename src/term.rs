//! Elixir Term Conversion Utilities
//!
//! Atoms, header positions, error reasons and binaries.

use rustler::{Atom, Encoder, Env, Error, NewBinary, NifResult, Term};

use crate::error::IndexedDataError;
use crate::index::HeaderPosition;

rustler::atoms! {
    ok,
    error,
    prefix,
    postfix,
    malformed_varint,
    truncated_header,
    index_out_of_range,
    empty_truncation,
    too_many_width_classes,
    payload_mismatch,
    corrupt_offset,
}

/// `:prefix` or `:postfix`; anything else is `badarg`
pub fn header_position_from_atom(atom: Atom) -> NifResult<HeaderPosition> {
    if atom == prefix() {
        Ok(HeaderPosition::Prefix)
    } else if atom == postfix() {
        Ok(HeaderPosition::Postfix)
    } else {
        Err(Error::BadArg)
    }
}

/// Reason atom for an error
pub fn error_reason(err: &IndexedDataError) -> Atom {
    match err {
        IndexedDataError::MalformedVarint { .. } => malformed_varint(),
        IndexedDataError::TruncatedHeader { .. } => truncated_header(),
        IndexedDataError::IndexOutOfRange { .. } => index_out_of_range(),
        IndexedDataError::EmptyTruncation { .. } => empty_truncation(),
        IndexedDataError::TooManyWidthClasses(_) => too_many_width_classes(),
        IndexedDataError::PayloadMismatch { .. } => payload_mismatch(),
        IndexedDataError::CorruptOffset { .. } => corrupt_offset(),
    }
}

/// `{:error, reason}`
pub fn error_to_term<'a>(env: Env<'a>, err: &IndexedDataError) -> Term<'a> {
    (error(), error_reason(err)).encode(env)
}

/// `{:ok, value}`
pub fn ok_tuple<'a>(env: Env<'a>, value: Term<'a>) -> Term<'a> {
    (ok(), value).encode(env)
}

/// Copy bytes into a fresh BEAM binary
pub fn bytes_to_binary<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

/// Build a list from terms produced back to front
pub fn list_from_rev<'a, I>(env: Env<'a>, reversed: I) -> Term<'a>
where
    I: IntoIterator<Item = Term<'a>>,
{
    let mut list = Term::list_new_empty(env);
    for term in reversed {
        list = list.list_prepend(term);
    }
    list
}
