use std::collections::{HashMap, HashSet};

use log::{info, warn};

use sightline_shared::{ChunkIndex, DirtyRingBuffer, EntityId, Tick, TickClock, TickSource};

use crate::{
    dirty_marker::DirtyMarker,
    interest::InterestRegion,
    session::{DirtySources, SessionRecord, SessionTracker},
    update::{SessionUpdate, SessionView},
    SessionKey, VisibilityConfig, VisibilityError, MAX_VIEW_CHUNK_RADIUS,
};

/// Tracks which entities changed over the recent ticks and where they are,
/// and uses that to build each connected session's update.
///
/// Expected order within one tick:
/// 1. mutations are reported through [`VisibilityServer::dirty_marker`]
/// 2. every session is served through [`VisibilityServer::session_seen`] or
///    [`VisibilityServer::collect_updates`]
/// 3. [`VisibilityServer::cleanup_dirty`] rotates to the next tick
pub struct VisibilityServer {
    config: VisibilityConfig,
    clock: TickClock,
    dirty_buffer: DirtyRingBuffer,
    chunk_index: ChunkIndex,
    live_entities: HashSet<EntityId>,
    sessions: SessionTracker,
}

impl VisibilityServer {
    /// Create a new VisibilityServer, starting at tick 0
    pub fn new(config: VisibilityConfig) -> Result<Self, VisibilityError> {
        Self::starting_at(config, 0)
    }

    /// Create a new VisibilityServer whose first tick is `tick`
    pub fn starting_at(config: VisibilityConfig, tick: Tick) -> Result<Self, VisibilityError> {
        if !config.view_radius.is_finite() || config.view_radius < 0.0 {
            return Err(VisibilityError::InvalidViewRadius {
                radius: config.view_radius,
            });
        }

        let dirty_buffer = DirtyRingBuffer::starting_at(config.dirty_buffer_size, tick)?;
        let chunk_index = ChunkIndex::new(config.chunk_size)?;
        if config.view_radius / config.chunk_size > MAX_VIEW_CHUNK_RADIUS {
            return Err(VisibilityError::ViewRadiusTooLarge {
                radius: config.view_radius,
                chunk_size: config.chunk_size,
                max_chunks: MAX_VIEW_CHUNK_RADIUS,
            });
        }
        let sessions = SessionTracker::new(config.culling_enabled);

        Ok(Self {
            config,
            clock: TickClock::starting_at(tick),
            dirty_buffer,
            chunk_index,
            live_entities: HashSet::new(),
            sessions,
        })
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    /// Gets the tick currently being simulated
    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick()
    }

    pub fn dirty_buffer(&self) -> &DirtyRingBuffer {
        &self.dirty_buffer
    }

    pub fn chunk_index(&self) -> &ChunkIndex {
        &self.chunk_index
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    // Entities

    /// Entry point for the entity store's change notifications this tick
    pub fn dirty_marker(&mut self) -> DirtyMarker<'_> {
        DirtyMarker::new(
            &self.clock,
            &mut self.dirty_buffer,
            &mut self.chunk_index,
            &mut self.live_entities,
        )
    }

    pub fn entity_exists(&self, entity: &EntityId) -> bool {
        self.live_entities.contains(entity)
    }

    pub fn entities_count(&self) -> usize {
        self.live_entities.len()
    }

    /// Forgets a destroyed entity. The chunk it was in is marked dirty, so
    /// sessions that can see that chunk re-evaluate it.
    pub fn despawn_entity(&mut self, entity: &EntityId) {
        if !self.live_entities.remove(entity) {
            warn!("VisibilityServer: despawning unknown entity {:?}", entity);
        }
        if let Some(chunk_key) = self.chunk_index.remove_entity(entity) {
            self.chunk_index.mark_dirty(&chunk_key);
        }
    }

    // Sessions

    pub fn connect_session(&mut self, session_key: &SessionKey) -> Result<(), VisibilityError> {
        self.sessions.connect(session_key, self.clock.current_tick())
    }

    pub fn disconnect_session(&mut self, session_key: &SessionKey) -> Option<SessionRecord> {
        self.sessions.on_disconnect(session_key)
    }

    pub fn session_exists(&self, session_key: &SessionKey) -> bool {
        self.sessions.is_connected(session_key)
    }

    /// Records that the session received the update for `tick`. Ticks that
    /// are older than the stored one, or outside the dirty window, are ignored.
    pub fn acknowledge(&mut self, session_key: &SessionKey, tick: Tick) {
        self.sessions.acknowledge(session_key, tick, &self.dirty_buffer);
    }

    pub fn culling_enabled(&self) -> bool {
        self.sessions.culling_enabled()
    }

    pub fn set_culling_enabled(&mut self, enabled: bool) {
        self.config.culling_enabled = enabled;
        self.sessions.set_culling_enabled(enabled);
    }

    /// The chunks visible from `view`, empty when it has no position
    pub fn interest_region(&self, view: &SessionView) -> InterestRegion {
        match &view.position {
            Some(position) => {
                InterestRegion::around(&self.chunk_index, position, self.config.view_radius)
            }
            None => InterestRegion::new(),
        }
    }

    /// Builds the update for one session, deriving its interest region from
    /// its view position
    pub fn session_seen(&mut self, view: &SessionView) -> Result<SessionUpdate, VisibilityError> {
        let interest = self.interest_region(view);
        self.session_seen_in(&view.key, &interest)
    }

    /// Builds the update for one session with an explicit interest region
    pub fn session_seen_in(
        &mut self,
        session_key: &SessionKey,
        interest: &InterestRegion,
    ) -> Result<SessionUpdate, VisibilityError> {
        let sources = DirtySources {
            dirty_buffer: &self.dirty_buffer,
            chunk_index: &self.chunk_index,
            live_entities: &self.live_entities,
        };
        self.sessions.session_seen(session_key, interest, sources)
    }

    /// Serves every session in `views` for the current tick. Views of
    /// sessions that are not connected are skipped.
    pub fn collect_updates(&mut self, views: &[SessionView]) -> HashMap<SessionKey, SessionUpdate> {
        let mut output = HashMap::new();
        for view in views {
            match self.session_seen(view) {
                Ok(update) => {
                    output.insert(view.key, update);
                }
                Err(error) => {
                    warn!("VisibilityServer: skipping view: {}", error);
                }
            }
        }
        output
    }

    // Tick

    /// Closes the current tick. Must run after every session has been served
    /// for it and before any mutation of the next tick is reported.
    ///
    /// When culling is disabled `active_sessions` become the sessions that
    /// have seen everything. Returns the new current tick.
    pub fn cleanup_dirty<'k, I: IntoIterator<Item = &'k SessionKey>>(&mut self, active_sessions: I) -> Tick {
        if !self.sessions.culling_enabled() {
            self.sessions.refresh_seen_all(active_sessions);
        }

        let new_tick = self.clock.advance();
        self.dirty_buffer.advance(new_tick);
        self.chunk_index.clear_dirty();

        if new_tick % 1000 == 0 {
            info!(
                "VisibilityServer: tick {} - {} entities, {} sessions, {} chunks",
                new_tick,
                self.live_entities.len(),
                self.sessions.sessions_count(),
                self.chunk_index.chunk_count()
            );
        }

        new_tick
    }
}
