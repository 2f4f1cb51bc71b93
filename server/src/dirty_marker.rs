use std::collections::HashSet;

use log::warn;

use sightline_shared::{ChunkIndex, DirtyRingBuffer, EntityId, Placement, TickSource, WorldPosition};

/// Receives entity lifecycle notifications from the entity store.
///
/// The store calls these synchronously, exactly once per logical event, in
/// the same tick as the mutation they describe.
pub trait EntityChangeListener {
    /// A new entity exists. Its position, if it has one, follows through
    /// [`EntityChangeListener::entity_changed`].
    fn entity_created(&mut self, entity: &EntityId);

    /// An existing entity was mutated. With a position, the entity's chunk is
    /// updated and marked dirty. Entities never reported as created are
    /// ignored.
    fn entity_changed(&mut self, entity: &EntityId, position: Option<&WorldPosition>);
}

/// Resolves the current world position of an entity on demand
pub trait PositionSource {
    fn position(&self, entity: &EntityId) -> Option<WorldPosition>;
}

/// Fans entity notifications out to the dirty ring buffer and the chunk
/// index. Every record is stamped with the tick reported by the injected
/// [`TickSource`].
pub struct DirtyMarker<'s> {
    ticks: &'s dyn TickSource,
    dirty_buffer: &'s mut DirtyRingBuffer,
    chunk_index: &'s mut ChunkIndex,
    live_entities: &'s mut HashSet<EntityId>,
}

impl<'s> DirtyMarker<'s> {
    pub fn new(
        ticks: &'s dyn TickSource,
        dirty_buffer: &'s mut DirtyRingBuffer,
        chunk_index: &'s mut ChunkIndex,
        live_entities: &'s mut HashSet<EntityId>,
    ) -> Self {
        Self {
            ticks,
            dirty_buffer,
            chunk_index,
            live_entities,
        }
    }

    /// Marks the chunk `entity` currently occupies as dirty, resolving its
    /// position through `positions`. Also moves the entity to that chunk if it
    /// changed.
    pub fn mark_entity_chunk(&mut self, entity: &EntityId, positions: &dyn PositionSource) {
        if !self.is_live(entity, "chunk mark") {
            return;
        }
        if let Some(position) = positions.position(entity) {
            self.place(entity, &position);
        }
    }

    // Entities must be reported through `entity_created` before anything else
    fn is_live(&self, entity: &EntityId, operation: &str) -> bool {
        if self.live_entities.contains(entity) {
            return true;
        }
        warn!("DirtyMarker: ignoring {} of unknown entity {:?}", operation, entity);
        false
    }

    fn place(&mut self, entity: &EntityId, position: &WorldPosition) {
        let chunk_key = self.chunk_index.chunk_key_for(position);
        if let Placement::Moved { from } = self.chunk_index.place_entity(entity, &chunk_key) {
            self.chunk_index.mark_dirty(&from);
        }
        self.chunk_index.mark_dirty(&chunk_key);
    }
}

impl<'s> EntityChangeListener for DirtyMarker<'s> {
    fn entity_created(&mut self, entity: &EntityId) {
        self.live_entities.insert(*entity);
        self.dirty_buffer
            .record_added(entity, self.ticks.current_tick());
    }

    fn entity_changed(&mut self, entity: &EntityId, position: Option<&WorldPosition>) {
        if !self.is_live(entity, "change") {
            return;
        }
        self.dirty_buffer
            .record_dirtied(entity, self.ticks.current_tick());
        if let Some(position) = position {
            self.place(entity, position);
        }
    }
}
