mod dirty_entities;
mod error;
mod ring_buffer;

pub use dirty_entities::DirtyEntities;
pub use error::DirtyBufferError;
pub use ring_buffer::DirtyRingBuffer;
