use thiserror::Error;

/// Errors that can occur while building a ChunkIndex
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChunkIndexError {
    /// Chunk size must be a finite, strictly positive number of world units
    #[error("Invalid chunk size {size} - must be finite and greater than zero")]
    InvalidChunkSize { size: f32 },
}
