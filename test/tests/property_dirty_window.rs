/// PROPERTY-BASED TESTS: Dirty window invariants
///
/// Uses proptest to verify the dirty tracking holds across random inputs.
///
/// Key invariants:
/// 1. An entity is never both added and dirtied in the same tick
/// 2. A tick can be looked up exactly while it is inside the window
/// 3. Advancing clears the reused slot and nothing else
/// 4. Sessions inside the window get deltas, sessions outside get resyncs
/// 5. Acknowledged ticks never move backwards and never leave the window

use std::collections::HashSet;

use proptest::prelude::*;
use sightline_server::{ResyncReason, SessionUpdate, VisibilityConfig};
use sightline_shared::{DirtyRingBuffer, EntityId, Tick};
use sightline_test::TestServer;

#[derive(Clone, Debug)]
enum Op {
    Add(u64),
    Dirty(u64),
    Advance,
}

// Strategy for generating buffer operations
fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..20u64).prop_map(Op::Add),
        (0u64..20u64).prop_map(Op::Dirty),
        Just(Op::Advance),
    ]
}

fn apply(buffer: &mut DirtyRingBuffer, ops: &[Op]) {
    for op in ops {
        let tick = buffer.current_tick();
        match op {
            Op::Add(id) => buffer.record_added(&EntityId::from_u64(*id), tick),
            Op::Dirty(id) => buffer.record_dirtied(&EntityId::from_u64(*id), tick),
            Op::Advance => buffer.advance(tick + 1),
        }
    }
}

proptest! {
    /// Test that added and dirtied never overlap, per tick or collected
    #[test]
    fn prop_added_and_dirtied_are_disjoint(
        buffer_size in 1usize..16usize,
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let mut buffer = DirtyRingBuffer::new(buffer_size).unwrap();
        apply(&mut buffer, &ops);

        let current = buffer.current_tick();
        for tick in buffer.oldest_tick()..=current {
            let (added, dirtied) = buffer.lookup(tick).unwrap();
            prop_assert!(added.is_disjoint(dirtied), "tick {} overlaps", tick);

            let collected = buffer.collect_since(tick).unwrap();
            prop_assert!(collected.added().is_disjoint(collected.dirtied()));
        }
    }

    /// Test that lookup succeeds exactly for ticks within the window
    #[test]
    fn prop_lookup_iff_within_window(
        buffer_size in 1usize..32usize,
        advances in 0u32..100u32,
        query in 0u32..110u32,
    ) {
        let mut buffer = DirtyRingBuffer::new(buffer_size).unwrap();
        for tick in 1..=advances {
            buffer.advance(tick);
        }

        let in_window = query <= advances && ((advances - query) as usize) < buffer_size;
        prop_assert_eq!(buffer.lookup(query).is_some(), in_window);
        prop_assert_eq!(buffer.collect_since(query).is_some(), in_window);
    }

    /// Test that advancing empties the reused slot and leaves the rest intact
    #[test]
    fn prop_advance_clears_only_reused_slot(
        buffer_size in 2usize..16usize,
        ticks in 0u32..40u32,
    ) {
        let mut buffer = DirtyRingBuffer::new(buffer_size).unwrap();
        for tick in 0..=ticks {
            if tick > 0 {
                buffer.advance(tick);
            }
            buffer.record_added(&EntityId::from_u64(u64::from(tick)), tick);
            buffer.record_dirtied(&EntityId::from_u64(1000 + u64::from(tick)), tick);
        }

        let snapshot: Vec<(Tick, HashSet<EntityId>, HashSet<EntityId>)> = (buffer.oldest_tick()..=ticks)
            .map(|tick| {
                let (added, dirtied) = buffer.lookup(tick).unwrap();
                (tick, added.clone(), dirtied.clone())
            })
            .collect();

        buffer.advance(ticks + 1);

        let (added, dirtied) = buffer.lookup(ticks + 1).unwrap();
        prop_assert!(added.is_empty());
        prop_assert!(dirtied.is_empty());
        for (tick, added, dirtied) in snapshot {
            match buffer.lookup(tick) {
                Some((now_added, now_dirtied)) => {
                    prop_assert_eq!(now_added, &added);
                    prop_assert_eq!(now_dirtied, &dirtied);
                }
                // only the slot that was reused may disappear
                None => {
                    prop_assert_eq!(ticks + 1 - tick, buffer_size as u32);
                }
            }
        }
    }

    /// Test that a synced session resyncs exactly when its ack leaves the window
    #[test]
    fn prop_resync_iff_ack_outside_window(
        buffer_size in 2usize..16usize,
        lag in 0usize..40usize,
    ) {
        let mut test = TestServer::with_buffer_size(buffer_size);
        let session = test.connect();
        test.serve_and_ack(&session, 0.0, 0.0);
        test.end_ticks(lag);

        match test.serve(&session, 0.0, 0.0) {
            SessionUpdate::Delta(delta) => {
                prop_assert!(lag < buffer_size);
                prop_assert_eq!(delta.since, 0);
            }
            SessionUpdate::FullResync(full) => {
                prop_assert!(lag >= buffer_size);
                prop_assert_eq!(full.reason, ResyncReason::WindowExpired);
            }
        }
    }

    /// Test that the stored ack only moves forward, and only to ticks inside
    /// the window
    #[test]
    fn prop_acknowledgment_is_monotonic(
        steps in prop::collection::vec((0usize..3usize, -4i64..12i64), 1..50),
    ) {
        let buffer_size: i64 = 8;
        let config = VisibilityConfig {
            dirty_buffer_size: buffer_size as usize,
            ..Default::default()
        };
        let mut test = TestServer::starting_at(config, 100);
        let session = test.connect();

        let mut expected = i64::from(test.current_tick());
        for (advance, offset) in steps {
            test.end_ticks(advance);
            let current = i64::from(test.current_tick());
            let ack = current - offset;
            test.server.acknowledge(&session, ack as Tick);

            let in_window = (0..buffer_size).contains(&offset);
            let stored_expired = current - expected >= buffer_size;
            if in_window && (stored_expired || ack >= expected) {
                expected = ack;
            }
            let record = test.server.sessions().session(&session).unwrap();
            prop_assert_eq!(i64::from(record.acknowledged_tick()), expected);
        }
    }
}
