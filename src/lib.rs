//! IndexedData - random-access containers of byte entries
//!
//! A container packs a sequence of opaque entries into one buffer with a
//! compact offset index, so any entry can be sliced out without scanning.
//!
//! - [`index::IndexedDataBuilder`]: append, truncate, split, serialize
//! - [`index::IndexedData`]: zero-copy reader over a finished buffer
//! - [`array`]: typed element arrays on top (JSON via serde)
//!
//! The cdylib is loaded by the BEAM as `Elixir.IndexedData.Native`.

use rustler::{Atom, Binary, Encoder, Env, NifResult, ResourceArc, Term};

pub mod array;
pub mod core;
pub mod error;
pub mod index;
mod resource;
mod term;

pub use error::{IndexedDataError, Result};
pub use index::{HeaderPosition, IndexedData, IndexedDataBuilder, OwnedIndexedData};

use resource::{BuilderRef, BuilderResource, IndexedDataRef, IndexedDataResource};
use term::{error_to_term, header_position_from_atom};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                let current = ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
                let mut peak = PEAK_ALLOCATED.load(Ordering::Relaxed);
                while current > peak {
                    match PEAK_ALLOCATED.compare_exchange_weak(
                        peak,
                        current,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => break,
                        Err(p) => peak = p,
                    }
                }
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Memory Tracking NIFs
// ============================================================================

#[cfg(feature = "memory_tracking")]
use std::sync::atomic::Ordering;

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory() -> usize {
    tracking::ALLOCATED.load(Ordering::SeqCst)
}

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    tracking::PEAK_ALLOCATED.load(Ordering::SeqCst)
}

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    let current = tracking::ALLOCATED.load(Ordering::SeqCst);
    let peak = tracking::PEAK_ALLOCATED.swap(current, Ordering::SeqCst);
    (current, peak)
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    (0, 0)
}


// ============================================================================
// Builder NIFs
// ============================================================================

fn poisoned(reason: &'static str) -> rustler::Error {
    rustler::Error::RaiseAtom(reason)
}

/// Create an empty builder
#[rustler::nif]
fn builder_new() -> BuilderRef {
    ResourceArc::new(BuilderResource::new())
}

/// Append one entry, returning the new entry count
#[rustler::nif]
fn builder_append(builder: BuilderRef, entry: Binary) -> NifResult<usize> {
    builder
        .with_builder(|b| {
            b.append(entry.as_slice());
            b.len()
        })
        .map_err(poisoned)
}

#[rustler::nif]
fn builder_count(builder: BuilderRef) -> NifResult<usize> {
    builder.with_builder(|b| b.len()).map_err(poisoned)
}

/// Remove the last `k` entries (clamped), returning the new entry count
#[rustler::nif]
fn builder_drop_last(builder: BuilderRef, k: usize) -> NifResult<usize> {
    builder
        .with_builder(|b| {
            b.truncate_last(k);
            b.len()
        })
        .map_err(poisoned)
}

/// Move entries after `k` into a new builder
#[rustler::nif]
fn builder_split(builder: BuilderRef, k: usize) -> NifResult<BuilderRef> {
    let tail = builder.with_builder(|b| b.split_at(k)).map_err(poisoned)?;
    Ok(ResourceArc::new(BuilderResource::from_builder(tail)))
}

/// Serialized container as a list of binaries (iodata); the builder is kept
#[rustler::nif]
fn builder_stream<'a>(env: Env<'a>, builder: BuilderRef, position: Atom) -> NifResult<Term<'a>> {
    let position = header_position_from_atom(position)?;
    let chunks = builder
        .with_builder(|b| {
            let mut chunks = Vec::with_capacity(3);
            b.stream(position, |chunk| chunks.push(term::bytes_to_binary(env, chunk)));
            chunks
        })
        .map_err(poisoned)?;
    Ok(term::list_from_rev(env, chunks.into_iter().rev()))
}

/// Serialize into one binary and reset the builder
#[rustler::nif(schedule = "DirtyCpu")]
fn builder_finish<'a>(env: Env<'a>, builder: BuilderRef, position: Atom) -> NifResult<Term<'a>> {
    let position = header_position_from_atom(position)?;
    let bytes = builder
        .with_builder(|b| b.finish(position))
        .map_err(poisoned)?;
    Ok(term::bytes_to_binary(env, &bytes))
}

// ============================================================================
// Container NIFs
// ============================================================================

/// Decode a finished container (returns {:ok, ref} or {:error, reason})
#[rustler::nif]
fn data_new<'a>(env: Env<'a>, input: Binary<'a>, position: Atom) -> NifResult<Term<'a>> {
    let position = header_position_from_atom(position)?;
    match IndexedDataResource::new(input.as_slice().to_vec(), position) {
        Ok(resource) => Ok(term::ok_tuple(env, ResourceArc::new(resource).encode(env))),
        Err(e) => Ok(error_to_term(env, &e)),
    }
}

#[rustler::nif]
fn data_count(data: IndexedDataRef) -> usize {
    data.data.len()
}

/// Entry `index` as a sub-binary of the container (no copy)
#[rustler::nif]
fn data_get<'a>(env: Env<'a>, data: IndexedDataRef, index: usize) -> NifResult<Term<'a>> {
    if let Err(e) = data.data.get(index) {
        return Ok(error_to_term(env, &e));
    }
    let entry = data.make_binary(env, |r| r.data.get(index).unwrap_or_default());
    Ok(term::ok_tuple(env, entry.encode(env)))
}

/// All entries as sub-binaries, in order
#[rustler::nif]
fn data_to_list<'a>(env: Env<'a>, data: IndexedDataRef) -> NifResult<Term<'a>> {
    if let Some(Err(e)) = data.data.as_borrowed().iter().find(|entry| entry.is_err()) {
        return Ok(error_to_term(env, &e));
    }
    let entries = (0..data.data.len()).rev().map(|index| {
        data.make_binary(env, |r| r.data.get(index).unwrap_or_default())
            .encode(env)
    });
    Ok(term::ok_tuple(env, term::list_from_rev(env, entries)))
}

/// Copy a container back into a builder for further appends
#[rustler::nif]
fn data_to_builder(data: IndexedDataRef) -> BuilderRef {
    let builder = data.data.as_borrowed().to_builder();
    ResourceArc::new(BuilderResource::from_builder(builder))
}

rustler::init!("Elixir.IndexedData.Native");
