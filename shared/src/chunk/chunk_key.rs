use std::ops::RangeInclusive;

/// A point in world space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
}

impl WorldPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for WorldPosition {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

// ChunkKey
/// Integer coordinate of a chunk: world position divided by chunk size,
/// floored toward negative infinity.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct ChunkKey {
    pub x: i32,
    pub y: i32,
}

impl ChunkKey {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Quantizes `position` into the chunk that contains it.
    /// `chunk_size` must be positive.
    ///
    /// ```
    /// # use sightline_shared::{ChunkKey, WorldPosition};
    /// assert_eq!(ChunkKey::from_position(&WorldPosition::new(7.9, 8.0), 8.0), ChunkKey::new(0, 1));
    /// assert_eq!(ChunkKey::from_position(&WorldPosition::new(-0.5, -8.0), 8.0), ChunkKey::new(-1, -1));
    /// ```
    pub fn from_position(position: &WorldPosition, chunk_size: f32) -> Self {
        Self {
            x: quantize(position.x, chunk_size),
            y: quantize(position.y, chunk_size),
        }
    }

    /// Every chunk whose x and y both lie within `radius` chunks of this one
    pub fn square_around(&self, radius: u32) -> impl Iterator<Item = ChunkKey> {
        let radius = radius.min(i32::MAX as u32) as i32;
        let xs = span(self.x, radius);
        let ys = span(self.y, radius);
        xs.flat_map(move |x| ys.clone().map(move |y| ChunkKey::new(x, y)))
    }
}

fn span(center: i32, radius: i32) -> RangeInclusive<i32> {
    center.saturating_sub(radius)..=center.saturating_add(radius)
}

fn quantize(value: f32, chunk_size: f32) -> i32 {
    // `as` saturates, and maps NaN to 0
    (value / chunk_size).floor() as i32
}
