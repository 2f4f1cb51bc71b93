use std::collections::{hash_set::Iter, HashMap, HashSet};

use crate::EntityId;

use super::{
    chunk_key::{ChunkKey, WorldPosition},
    error::ChunkIndexError,
};

struct Chunk {
    entities: HashSet<EntityId>,
    version: u64,
}

impl Chunk {
    fn new() -> Self {
        Self {
            entities: HashSet::new(),
            version: 0,
        }
    }
}

/// Where an entity ended up after [`ChunkIndex::place_entity`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// The entity was already in the chunk
    Unchanged,
    /// The entity was not tracked before
    Inserted,
    /// The entity left `from` for the new chunk
    Moved { from: ChunkKey },
}

/// Spatial partition of the world into square chunks.
///
/// Tracks which chunk every placed entity is located in, and which chunks
/// were touched during the current tick so that visibility work can be
/// limited to them.
pub struct ChunkIndex {
    chunk_size: f32,
    chunks: HashMap<ChunkKey, Chunk>,
    entity_chunks: HashMap<EntityId, ChunkKey>,
    dirty: HashSet<ChunkKey>,
    // shared by all chunks so a recreated chunk never repeats a version
    next_version: u64,
}

impl ChunkIndex {
    pub fn new(chunk_size: f32) -> Result<Self, ChunkIndexError> {
        if !chunk_size.is_finite() || chunk_size <= 0.0 {
            return Err(ChunkIndexError::InvalidChunkSize { size: chunk_size });
        }

        Ok(Self {
            chunk_size,
            chunks: HashMap::new(),
            entity_chunks: HashMap::new(),
            dirty: HashSet::new(),
            next_version: 1,
        })
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    pub fn chunk_key_for(&self, position: &WorldPosition) -> ChunkKey {
        ChunkKey::from_position(position, self.chunk_size)
    }

    // Dirty markers

    /// Flags `chunk_key` as changed this tick. Marking the same chunk again
    /// before [`ChunkIndex::clear_dirty`] has no further effect.
    pub fn mark_dirty(&mut self, chunk_key: &ChunkKey) {
        if !self.dirty.insert(*chunk_key) {
            return;
        }

        let version = self.next_version;
        self.next_version += 1;
        if let Some(chunk) = self.chunks.get_mut(chunk_key) {
            chunk.version = version;
        }
    }

    pub fn is_dirty(&self, chunk_key: &ChunkKey) -> bool {
        self.dirty.contains(chunk_key)
    }

    pub fn dirty_chunks(&self) -> Iter<'_, ChunkKey> {
        self.dirty.iter()
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    /// Changes once per tick in which the chunk was marked dirty while holding
    /// entities. Zero for chunks that were never marked or hold no entities.
    pub fn chunk_version(&self, chunk_key: &ChunkKey) -> u64 {
        self.chunks
            .get(chunk_key)
            .map(|chunk| chunk.version)
            .unwrap_or(0)
    }

    // Membership

    /// Records that `entity` is located in `chunk_key`, moving it out of its
    /// previous chunk if needed.
    pub fn place_entity(&mut self, entity: &EntityId, chunk_key: &ChunkKey) -> Placement {
        let placement = match self.entity_chunks.get(entity) {
            Some(current) if current == chunk_key => return Placement::Unchanged,
            Some(current) => Placement::Moved { from: *current },
            None => Placement::Inserted,
        };

        if let Placement::Moved { from } = placement {
            self.detach(entity, &from);
        }

        self.chunks
            .entry(*chunk_key)
            .or_insert_with(Chunk::new)
            .entities
            .insert(*entity);
        self.entity_chunks.insert(*entity, *chunk_key);

        placement
    }

    /// Stops tracking `entity`. Returns the chunk it was located in.
    pub fn remove_entity(&mut self, entity: &EntityId) -> Option<ChunkKey> {
        let chunk_key = self.entity_chunks.remove(entity)?;
        self.detach(entity, &chunk_key);
        Some(chunk_key)
    }

    fn detach(&mut self, entity: &EntityId, chunk_key: &ChunkKey) {
        let Some(chunk) = self.chunks.get_mut(chunk_key) else {
            return;
        };
        chunk.entities.remove(entity);
        if chunk.entities.is_empty() {
            self.chunks.remove(chunk_key);
        }
    }

    pub fn entity_chunk(&self, entity: &EntityId) -> Option<ChunkKey> {
        self.entity_chunks.get(entity).copied()
    }

    pub fn has_entity(&self, entity: &EntityId) -> bool {
        self.entity_chunks.contains_key(entity)
    }

    /// Iterates the entities located in `chunk_key`
    pub fn entities_in(&self, chunk_key: &ChunkKey) -> impl Iterator<Item = &EntityId> {
        self.chunks
            .get(chunk_key)
            .into_iter()
            .flat_map(|chunk| chunk.entities.iter())
    }

    /// Iterates the chunks that currently hold at least one entity
    pub fn chunk_keys(&self) -> impl Iterator<Item = &ChunkKey> {
        self.chunks.keys()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entity_chunks.len()
    }
}
