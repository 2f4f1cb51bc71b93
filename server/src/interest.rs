use std::collections::HashSet;

use sightline_shared::{ChunkIndex, ChunkKey, EntityId, WorldPosition};

/// Largest square, in chunks, that [`InterestRegion::around`] enumerates cell
/// by cell
pub const MAX_DENSE_CHUNKS: i64 = 4096;

/// The chunks a session currently needs updates for
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterestRegion {
    chunks: HashSet<ChunkKey>,
}

impl InterestRegion {
    pub fn new() -> Self {
        Self {
            chunks: HashSet::new(),
        }
    }

    /// Every chunk overlapping the square of half-width `view_radius` centered
    /// on `position`.
    ///
    /// Squares wider than [`MAX_DENSE_CHUNKS`] chunks that also outnumber the
    /// chunks the index knows about are built from the index instead: only
    /// occupied or dirty chunks inside the square are included.
    pub fn around(chunk_index: &ChunkIndex, position: &WorldPosition, view_radius: f32) -> Self {
        let min = chunk_index.chunk_key_for(&WorldPosition::new(
            position.x - view_radius,
            position.y - view_radius,
        ));
        let max = chunk_index.chunk_key_for(&WorldPosition::new(
            position.x + view_radius,
            position.y + view_radius,
        ));

        let width = i64::from(max.x) - i64::from(min.x) + 1;
        let height = i64::from(max.y) - i64::from(min.y) + 1;
        let known = chunk_index.chunk_count() + chunk_index.dirty_count();
        let dense = match width.checked_mul(height) {
            Some(area) => {
                area <= MAX_DENSE_CHUNKS
                    || usize::try_from(area).map_or(false, |area| area <= known)
            }
            None => false,
        };

        let mut chunks = HashSet::new();
        if dense {
            for x in min.x..=max.x {
                for y in min.y..=max.y {
                    chunks.insert(ChunkKey::new(x, y));
                }
            }
        } else {
            let in_square = |chunk_key: &&ChunkKey| {
                (min.x..=max.x).contains(&chunk_key.x) && (min.y..=max.y).contains(&chunk_key.y)
            };
            chunks.extend(chunk_index.chunk_keys().filter(in_square).copied());
            chunks.extend(chunk_index.dirty_chunks().filter(in_square).copied());
        }
        Self { chunks }
    }

    pub fn include(&mut self, chunk_key: ChunkKey) -> &mut Self {
        self.chunks.insert(chunk_key);

        self
    }

    pub fn contains(&self, chunk_key: &ChunkKey) -> bool {
        self.chunks.contains(chunk_key)
    }

    /// Whether `entity` is currently located in one of the region's chunks
    pub fn contains_entity(&self, chunk_index: &ChunkIndex, entity: &EntityId) -> bool {
        chunk_index
            .entity_chunk(entity)
            .map(|chunk_key| self.chunks.contains(&chunk_key))
            .unwrap_or(false)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &ChunkKey> {
        self.chunks.iter()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Every entity located in the region
    pub fn entities<'a>(&'a self, chunk_index: &'a ChunkIndex) -> impl Iterator<Item = &'a EntityId> {
        self.chunks
            .iter()
            .flat_map(move |chunk_key| chunk_index.entities_in(chunk_key))
    }
}

impl FromIterator<ChunkKey> for InterestRegion {
    fn from_iter<I: IntoIterator<Item = ChunkKey>>(iter: I) -> Self {
        Self {
            chunks: iter.into_iter().collect(),
        }
    }
}
