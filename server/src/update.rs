use std::collections::HashSet;

use sightline_shared::{ChunkKey, EntityId, Tick, WorldPosition};

use crate::SessionKey;

/// What the connection layer knows about a session this tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionView {
    pub key: SessionKey,
    /// Center of the session's view. Sessions without one see nothing while
    /// culling is enabled.
    pub position: Option<WorldPosition>,
}

impl SessionView {
    pub fn new(key: SessionKey, position: Option<WorldPosition>) -> Self {
        Self { key, position }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResyncReason {
    /// The session has not received full state since it connected
    NeverSynced,
    /// The acknowledged tick is older than the dirty buffer can represent
    WindowExpired,
}

/// Entities changed since the session's acknowledged tick
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeltaUpdate {
    /// Acknowledged tick the delta is built on
    pub since: Tick,
    pub tick: Tick,
    /// Created after `since`; need their full state
    pub added: HashSet<EntityId>,
    /// Mutated after `since`
    pub dirtied: HashSet<EntityId>,
    /// Chunks changed this tick whose entity lists must be re-evaluated,
    /// sorted
    pub dirty_chunks: Vec<ChunkKey>,
}

/// Complete state for everything the session can see
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullResync {
    pub tick: Tick,
    pub reason: ResyncReason,
    pub entities: HashSet<EntityId>,
}

/// Outgoing update chosen for one session for one tick
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionUpdate {
    Delta(DeltaUpdate),
    FullResync(FullResync),
}

impl SessionUpdate {
    pub fn is_full_resync(&self) -> bool {
        matches!(self, SessionUpdate::FullResync(_))
    }

    pub fn tick(&self) -> Tick {
        match self {
            SessionUpdate::Delta(delta) => delta.tick,
            SessionUpdate::FullResync(full) => full.tick,
        }
    }

    /// Every entity whose state is carried by the update
    pub fn entities(&self) -> HashSet<EntityId> {
        match self {
            SessionUpdate::Delta(delta) => delta.added.union(&delta.dirtied).copied().collect(),
            SessionUpdate::FullResync(full) => full.entities.clone(),
        }
    }
}
