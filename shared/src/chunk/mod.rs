mod chunk_index;
mod chunk_key;
mod error;

pub use chunk_index::{ChunkIndex, Placement};
pub use chunk_key::{ChunkKey, WorldPosition};
pub use error::ChunkIndexError;
