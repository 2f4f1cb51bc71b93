use thiserror::Error;

use sightline_shared::{ChunkIndexError, DirtyBufferError};

use crate::SessionKey;

/// Errors returned by the visibility server
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VisibilityError {
    #[error(transparent)]
    DirtyBuffer(#[from] DirtyBufferError),

    #[error(transparent)]
    ChunkIndex(#[from] ChunkIndexError),

    /// View radius must be finite and not negative
    #[error("Invalid view radius {radius} - must be finite and not negative")]
    InvalidViewRadius { radius: f32 },

    /// View radius covers more chunks per axis than the server enumerates
    #[error("View radius {radius} spans more than {max_chunks} chunks of size {chunk_size}")]
    ViewRadiusTooLarge {
        radius: f32,
        chunk_size: f32,
        max_chunks: f32,
    },

    /// Operation on a session that was never connected or already left
    #[error("Session {session:?} is not connected")]
    SessionNotFound { session: SessionKey },

    /// A session key was connected twice
    #[error("Session {session:?} is already connected")]
    SessionAlreadyConnected { session: SessionKey },
}
