//! # Sightline Shared
//! Tick-windowed dirty tracking and spatial chunk indexing, used by
//! sightline-server to decide what each session needs to be sent.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod chunk;
mod dirty;
mod entity_id;
mod tick_clock;
mod types;

pub use chunk::{ChunkIndex, ChunkIndexError, ChunkKey, Placement, WorldPosition};
pub use dirty::{DirtyBufferError, DirtyEntities, DirtyRingBuffer};
pub use entity_id::EntityId;
pub use tick_clock::{TickClock, TickSource};
pub use types::{tick_greater_than, ticks_since, Tick};
