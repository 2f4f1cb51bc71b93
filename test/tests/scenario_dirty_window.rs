//! Scenario tests for the dirty window: when a session can be served a delta
//! and when it falls back to a full resync

use sightline_server::{ResyncReason, VisibilityConfig};
use sightline_test::{entity_set, expect_delta, expect_full_resync, TestServer};

#[test]
fn window_of_eight() {
    let mut test = TestServer::with_buffer_size(8);
    let e1 = test.spawn_at(0.0, 0.0);

    let (added, dirtied) = test.server.dirty_buffer().lookup(0).unwrap();
    assert_eq!(*added, entity_set![e1]);
    assert!(dirtied.is_empty());

    assert_eq!(test.end_ticks(7), 7);
    test.touch(&e1);
    let (added, dirtied) = test.server.dirty_buffer().lookup(7).unwrap();
    assert!(added.is_empty());
    assert_eq!(*dirtied, entity_set![e1]);

    assert_eq!(test.end_tick(), 8);
    assert!(test.server.dirty_buffer().lookup(0).is_none());
    assert!(test.server.dirty_buffer().lookup(1).is_some());
}

#[test]
fn unacknowledged_session_resyncs_when_window_passes() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();

    let mut test = TestServer::with_buffer_size(8);
    let e1 = test.spawn_at(0.0, 0.0);
    let session = test.connect();

    let full = expect_full_resync!(test.serve_and_ack(&session, 0.0, 0.0));
    assert_eq!(full.reason, ResyncReason::NeverSynced);
    assert_eq!(full.entities, entity_set![e1]);

    // ticks 1..=7 are still answerable from tick 0
    for tick in 1..=7 {
        test.end_tick();
        if tick == 7 {
            test.touch(&e1);
        }
        let delta = expect_delta!(test.serve(&session, 0.0, 0.0));
        assert_eq!(delta.since, 0);
        assert_eq!(delta.tick, tick);
    }

    test.end_tick();
    let full = expect_full_resync!(test.serve(&session, 0.0, 0.0));
    assert_eq!(full.reason, ResyncReason::WindowExpired);
    assert_eq!(full.tick, 8);
    assert_eq!(full.entities, entity_set![e1]);
}

#[test]
fn delta_unions_every_tick_since_ack() {
    let mut test = TestServer::with_buffer_size(8);
    let e1 = test.spawn_at(1.0, 1.0);
    let session = test.connect();
    test.serve_and_ack(&session, 0.0, 0.0);

    test.end_tick();
    test.touch(&e1);
    test.end_tick();
    let e2 = test.spawn_at(2.0, 2.0);
    test.touch(&e2);

    let delta = expect_delta!(test.serve(&session, 0.0, 0.0));
    assert_eq!(delta.since, 0);
    assert_eq!(delta.tick, 2);
    assert_eq!(delta.added, entity_set![e2]);
    assert_eq!(delta.dirtied, entity_set![e1]);
}

#[test]
fn acknowledging_every_tick_never_resyncs() {
    let mut test = TestServer::with_buffer_size(4);
    let e1 = test.spawn_at(0.0, 0.0);
    let session = test.connect();
    test.serve_and_ack(&session, 0.0, 0.0);

    for _ in 0..50 {
        test.end_tick();
        test.touch(&e1);
        let delta = expect_delta!(test.serve_and_ack(&session, 0.0, 0.0));
        assert_eq!(delta.dirtied, entity_set![e1]);
    }
}

#[test]
fn resync_restarts_the_window() {
    let mut test = TestServer::with_buffer_size(4);
    test.spawn_at(0.0, 0.0);
    let session = test.connect();
    test.serve_and_ack(&session, 0.0, 0.0);

    test.end_ticks(4);
    let full = expect_full_resync!(test.serve_and_ack(&session, 0.0, 0.0));
    assert_eq!(full.tick, 4);

    test.end_tick();
    let delta = expect_delta!(test.serve(&session, 0.0, 0.0));
    assert_eq!(delta.since, 4);
}

#[test]
fn stale_ack_does_not_rewind_session() {
    let mut test = TestServer::with_buffer_size(4);
    let session = test.connect();
    test.serve_and_ack(&session, 0.0, 0.0);
    test.end_ticks(3);
    test.server.acknowledge(&session, 3);

    // arrives late
    test.server.acknowledge(&session, 1);
    test.end_ticks(3);

    let record = test.server.sessions().session(&session).unwrap();
    assert_eq!(record.acknowledged_tick(), 3);
    let delta = expect_delta!(test.serve(&session, 0.0, 0.0));
    assert_eq!(delta.since, 3);
}

#[test]
fn future_ack_is_ignored() {
    let mut test = TestServer::with_buffer_size(8);
    let e1 = test.spawn_at(0.0, 0.0);
    let session = test.connect();
    test.serve_and_ack(&session, 0.0, 0.0);
    test.end_ticks(2);

    test.server.acknowledge(&session, 1_000_000);
    test.server.acknowledge(&session, 3);

    let record = test.server.sessions().session(&session).unwrap();
    assert_eq!(record.acknowledged_tick(), 0);

    test.end_tick();
    test.touch(&e1);
    let delta = expect_delta!(test.serve_and_ack(&session, 0.0, 0.0));
    assert_eq!(delta.since, 0);
    assert_eq!(delta.dirtied, entity_set![e1]);
    let record = test.server.sessions().session(&session).unwrap();
    assert_eq!(record.acknowledged_tick(), 3);
}

#[test]
fn acknowledging_across_tick_wrap_keeps_deltas() {
    let config = VisibilityConfig {
        dirty_buffer_size: 8,
        ..Default::default()
    };
    let mut test = TestServer::starting_at(config, u32::MAX - 1);
    let e1 = test.spawn_at(0.0, 0.0);
    let session = test.connect();
    expect_full_resync!(test.serve_and_ack(&session, 0.0, 0.0));

    let mut previous = u32::MAX - 1;
    for _ in 0..6 {
        let tick = test.end_tick();
        test.touch(&e1);
        let delta = expect_delta!(test.serve_and_ack(&session, 0.0, 0.0));
        assert_eq!(delta.since, previous);
        assert_eq!(delta.tick, tick);
        assert_eq!(delta.dirtied, entity_set![e1]);

        let record = test.server.sessions().session(&session).unwrap();
        assert_eq!(record.acknowledged_tick(), tick);
        previous = tick;
    }
    assert_eq!(test.current_tick(), 4);
}

#[test]
fn reconnected_session_starts_over() {
    let mut test = TestServer::with_buffer_size(8);
    let e1 = test.spawn_at(0.0, 0.0);
    let session = test.connect();
    test.serve_and_ack(&session, 0.0, 0.0);
    test.end_tick();

    assert!(test.server.disconnect_session(&session).is_some());
    assert!(!test.server.session_exists(&session));
    test.server.connect_session(&session).unwrap();

    let full = expect_full_resync!(test.serve(&session, 0.0, 0.0));
    assert_eq!(full.reason, ResyncReason::NeverSynced);
    assert_eq!(full.entities, entity_set![e1]);
}
