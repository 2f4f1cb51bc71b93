use std::default::Default;

/// Largest accepted `view_radius`, measured in chunks
pub const MAX_VIEW_CHUNK_RADIUS: f32 = 256.0;

/// Contains Config properties which will be used by the VisibilityServer
#[derive(Clone, Debug)]
pub struct VisibilityConfig {
    /// How many ticks of dirty history are kept. A session whose
    /// acknowledged tick is this many ticks old or more is sent a full
    /// resync instead of a delta.
    pub dirty_buffer_size: usize,
    /// Edge length of a square chunk, in world units
    pub chunk_size: f32,
    /// Half-width of the square a session can see around its view position,
    /// in world units. At most `MAX_VIEW_CHUNK_RADIUS` chunks.
    pub view_radius: f32,
    /// When false, every session is sent every entity with no interest
    /// filtering. Meant for debugging and administrative observers.
    pub culling_enabled: bool,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            dirty_buffer_size: 20,
            chunk_size: 8.0,
            view_radius: 10.0,
            culling_enabled: true,
        }
    }
}
