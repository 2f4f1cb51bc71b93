use std::collections::{HashMap, HashSet};

use log::{debug, info};

use sightline_shared::{ChunkIndex, ChunkKey, DirtyRingBuffer, EntityId, Tick};

use crate::{
    interest::InterestRegion,
    update::{DeltaUpdate, FullResync, ResyncReason, SessionUpdate},
    SessionKey, VisibilityError,
};

use super::session_record::SessionRecord;

/// Read side of the dirty tracking, borrowed for the duration of one tick's
/// session reads
#[derive(Clone, Copy)]
pub struct DirtySources<'s> {
    pub dirty_buffer: &'s DirtyRingBuffer,
    pub chunk_index: &'s ChunkIndex,
    pub live_entities: &'s HashSet<EntityId>,
}

/// Per-session acknowledgment bookkeeping. Decides, for each session each
/// tick, whether an incremental delta is possible or a full resync is needed.
pub struct SessionTracker {
    sessions: HashMap<SessionKey, SessionRecord>,
    culling_enabled: bool,
    // sessions treated as having seen every entity while culling is disabled
    seen_all: HashSet<SessionKey>,
}

impl SessionTracker {
    pub fn new(culling_enabled: bool) -> Self {
        Self {
            sessions: HashMap::new(),
            culling_enabled,
            seen_all: HashSet::new(),
        }
    }

    // Culling

    pub fn culling_enabled(&self) -> bool {
        self.culling_enabled
    }

    /// Switching culling off makes every session resync the whole world once
    /// before it receives unfiltered deltas.
    pub fn set_culling_enabled(&mut self, enabled: bool) {
        if self.culling_enabled == enabled {
            return;
        }
        info!("SessionTracker: visibility culling {}", if enabled { "enabled" } else { "disabled" });
        self.culling_enabled = enabled;
        self.seen_all.clear();
    }

    /// Replaces the set of sessions that have seen everything. Only used while
    /// culling is disabled.
    pub fn refresh_seen_all<'k, I: IntoIterator<Item = &'k SessionKey>>(&mut self, sessions: I) {
        self.seen_all.clear();
        for session_key in sessions {
            if self.sessions.contains_key(session_key) {
                self.seen_all.insert(*session_key);
            }
        }
    }

    pub fn has_seen_all(&self, session_key: &SessionKey) -> bool {
        self.seen_all.contains(session_key)
    }

    // Sessions

    pub fn connect(&mut self, session_key: &SessionKey, current_tick: Tick) -> Result<(), VisibilityError> {
        if self.sessions.contains_key(session_key) {
            return Err(VisibilityError::SessionAlreadyConnected {
                session: *session_key,
            });
        }

        info!("SessionTracker: session {:?} connected at tick {}", session_key, current_tick);
        self.sessions.insert(*session_key, SessionRecord::new(current_tick));
        Ok(())
    }

    pub fn is_connected(&self, session_key: &SessionKey) -> bool {
        self.sessions.contains_key(session_key)
    }

    pub fn session(&self, session_key: &SessionKey) -> Option<&SessionRecord> {
        self.sessions.get(session_key)
    }

    pub fn session_keys(&self) -> impl Iterator<Item = &SessionKey> {
        self.sessions.keys()
    }

    pub fn sessions_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drops all tracking state for the session
    pub fn on_disconnect(&mut self, session_key: &SessionKey) -> Option<SessionRecord> {
        self.seen_all.remove(session_key);
        let record = self.sessions.remove(session_key);
        if record.is_some() {
            info!("SessionTracker: session {:?} disconnected", session_key);
        }
        record
    }

    /// Stores the latest tick the remote end confirmed. Acknowledgments older
    /// than the stored one arrived out of order and are ignored. So are ticks
    /// outside the dirty buffer's window, including ticks not produced yet.
    pub fn acknowledge(&mut self, session_key: &SessionKey, tick: Tick, dirty_buffer: &DirtyRingBuffer) {
        let Some(record) = self.sessions.get_mut(session_key) else {
            debug!("SessionTracker: ignoring ack for unknown session {:?}", session_key);
            return;
        };
        if !dirty_buffer.is_within_window(tick) {
            debug!(
                "SessionTracker: ignoring ack {} from session {:?} outside window (current tick {})",
                tick,
                session_key,
                dirty_buffer.current_tick()
            );
            return;
        }
        // a stored tick that has left the window can no longer be ordered
        // against new ones
        if !dirty_buffer.is_within_window(record.acknowledged_tick()) {
            record.replace_acknowledged(tick);
            return;
        }
        if !record.acknowledge(tick) {
            debug!(
                "SessionTracker: ignoring stale ack {} from session {:?} (have {})",
                tick,
                session_key,
                record.acknowledged_tick()
            );
        }
    }

    // Per-tick

    /// Chooses the outgoing update for `session_key` this tick.
    ///
    /// The session gets a delta when it already holds full state and its
    /// acknowledged tick is still inside the dirty buffer's window. Otherwise
    /// it gets a full resync and is flagged as holding full state.
    ///
    /// While culling is disabled the interest region is ignored and the
    /// session is treated as seeing every live entity. Such sessions still
    /// resync when their acknowledgment expires, and also until the next
    /// cleanup has recorded them as having seen everything.
    pub fn session_seen(
        &mut self,
        session_key: &SessionKey,
        interest: &InterestRegion,
        sources: DirtySources<'_>,
    ) -> Result<SessionUpdate, VisibilityError> {
        let culling_enabled = self.culling_enabled;
        let seen_all = self.seen_all.contains(session_key);
        let Some(record) = self.sessions.get_mut(session_key) else {
            return Err(VisibilityError::SessionNotFound {
                session: *session_key,
            });
        };

        let tick = sources.dirty_buffer.current_tick();
        let synced = record.has_full_state() && (culling_enabled || seen_all);

        let dirty_entities = if synced {
            sources.dirty_buffer.collect_since(record.acknowledged_tick())
        } else {
            None
        };

        let Some(dirty_entities) = dirty_entities else {
            let reason = if synced {
                ResyncReason::WindowExpired
            } else {
                ResyncReason::NeverSynced
            };
            debug!(
                "SessionTracker: full resync for session {:?} at tick {} ({:?}, acked {})",
                session_key,
                tick,
                reason,
                record.acknowledged_tick()
            );
            record.set_full_state();

            let entities = if culling_enabled {
                interest.entities(sources.chunk_index).copied().collect()
            } else {
                sources.live_entities.clone()
            };
            return Ok(SessionUpdate::FullResync(FullResync {
                tick,
                reason,
                entities,
            }));
        };

        let since = dirty_entities.since();
        let (added, dirtied) = dirty_entities.into_sets();

        let visible = |entity: &EntityId| {
            if culling_enabled {
                interest.contains_entity(sources.chunk_index, entity)
            } else {
                sources.live_entities.contains(entity)
            }
        };
        let in_region = |chunk_key: &ChunkKey| !culling_enabled || interest.contains(chunk_key);

        let mut dirty_chunks: Vec<ChunkKey> = sources
            .chunk_index
            .dirty_chunks()
            .filter(|chunk_key| in_region(chunk_key))
            .copied()
            .collect();
        dirty_chunks.sort();

        Ok(SessionUpdate::Delta(DeltaUpdate {
            since,
            tick,
            added: added.into_iter().filter(|entity| visible(entity)).collect(),
            dirtied: dirtied.into_iter().filter(|entity| visible(entity)).collect(),
            dirty_chunks,
        }))
    }
}
