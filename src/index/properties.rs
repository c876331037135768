//! Property-based tests for the container invariants

use proptest::prelude::*;

use super::{HeaderPosition, IndexedData, IndexedDataBuilder};
use crate::core::fixed::width_of;

fn entries_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 0..40)
}

// Few entries but large enough to reach 3-byte offsets
fn large_entries_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec((0usize..40_000, any::<u8>()), 0..5)
        .prop_map(|sizes| sizes.into_iter().map(|(n, b)| vec![b; n]).collect())
}

fn position_strategy() -> impl Strategy<Value = HeaderPosition> {
    prop_oneof![Just(HeaderPosition::Prefix), Just(HeaderPosition::Postfix)]
}

fn build(entries: &[Vec<u8>]) -> IndexedDataBuilder {
    let mut builder = IndexedDataBuilder::new();
    for entry in entries {
        builder.append(entry);
    }
    builder
}

fn decode_all(buf: &[u8], position: HeaderPosition) -> Vec<Vec<u8>> {
    let data = IndexedData::new(buf, position).unwrap();
    data.iter().map(|entry| entry.unwrap().to_vec()).collect()
}

proptest! {
    #[test]
    fn test_round_trip(entries in entries_strategy(), position in position_strategy()) {
        let buf = build(&entries).finish(position);
        prop_assert_eq!(decode_all(&buf, position), entries);
    }

    #[test]
    fn test_round_trip_wide_offsets(
        entries in large_entries_strategy(),
        position in position_strategy()
    ) {
        let buf = build(&entries).finish(position);
        prop_assert_eq!(decode_all(&buf, position), entries);
    }

    #[test]
    fn test_reverse_iteration(entries in entries_strategy(), position in position_strategy()) {
        let buf = build(&entries).finish(position);
        let data = IndexedData::new(&buf, position).unwrap();
        let reversed: Vec<&[u8]> = data.iter().rev().map(|e| e.unwrap()).collect();
        let expected: Vec<&[u8]> = entries.iter().rev().map(Vec::as_slice).collect();
        prop_assert_eq!(reversed, expected);
    }

    #[test]
    fn test_finish_resets(entries in entries_strategy(), position in position_strategy()) {
        let mut builder = build(&entries);
        builder.finish(position);
        prop_assert!(builder.is_empty());
        prop_assert_eq!(
            builder.finish(position),
            IndexedDataBuilder::new().finish(position)
        );

        // A reused builder behaves like a fresh one
        for entry in &entries {
            builder.append(entry);
        }
        prop_assert_eq!(builder.finish(position), build(&entries).finish(position));
    }

    #[test]
    fn test_stream_matches_finish(entries in entries_strategy(), position in position_strategy()) {
        let mut builder = build(&entries);

        let mut streamed = Vec::new();
        builder.stream(position, |chunk| streamed.extend_from_slice(chunk));
        let mut written = Vec::new();
        builder.write_to(position, &mut written).unwrap();

        prop_assert_eq!(builder.serialized_len(position), streamed.len());
        prop_assert_eq!(&builder.to_bytes(position), &streamed);
        prop_assert_eq!(&written, &streamed);
        prop_assert_eq!(builder.finish(position), streamed);
    }

    #[test]
    fn test_widths_minimal_and_monotonic(
        entries in prop_oneof![entries_strategy(), large_entries_strategy()]
    ) {
        let buf = build(&entries).finish(HeaderPosition::Postfix);
        let data = IndexedData::new(&buf, HeaderPosition::Postfix).unwrap();

        let widths: Vec<usize> = data.entry_widths().collect();
        prop_assert!(widths.windows(2).all(|w| w[0] <= w[1]));

        let mut end = 0u64;
        for (entry, width) in entries.iter().zip(&widths) {
            end += entry.len() as u64;
            prop_assert_eq!(*width, width_of(end));
        }
    }

    #[test]
    fn test_truncate_undoes_append(
        kept in entries_strategy(),
        extra in entries_strategy(),
        position in position_strategy()
    ) {
        let mut builder = build(&kept);
        for entry in &extra {
            builder.append(entry);
        }
        builder.truncate_last(extra.len());
        prop_assert_eq!(builder.finish(position), build(&kept).finish(position));
    }

    #[test]
    fn test_split_partitions(
        entries in entries_strategy(),
        k in 0usize..45,
        position in position_strategy()
    ) {
        let mut head = build(&entries);
        let before = head.to_bytes(position);
        let tail = head.split_at(k);

        if k + 1 < entries.len() {
            prop_assert_eq!(head.to_bytes(position), build(&entries[..=k]).finish(position));
            prop_assert_eq!(tail.to_bytes(position), build(&entries[k + 1..]).finish(position));
        } else {
            prop_assert!(tail.is_empty());
            prop_assert_eq!(head.to_bytes(position), before);
        }
    }

    #[test]
    fn test_to_builder_continues(
        first in entries_strategy(),
        second in entries_strategy(),
        position in position_strategy()
    ) {
        let buf = build(&first).finish(position);
        let mut builder = IndexedData::new(&buf, position).unwrap().to_builder();
        for entry in &second {
            builder.append(entry);
        }

        let all: Vec<Vec<u8>> = first.iter().chain(&second).cloned().collect();
        prop_assert_eq!(builder.finish(position), build(&all).finish(position));
    }
}
