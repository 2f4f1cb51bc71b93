//! # Sightline Server
//! Decides, once per simulation tick, which entities each connected session
//! has to be told about: an incremental delta of what changed since the
//! session's last acknowledged tick, or a full resync of everything it can
//! see when that tick is no longer tracked.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use sightline_shared::{
        ticks_since, ChunkIndex, ChunkKey, DirtyEntities, DirtyRingBuffer, EntityId, Tick,
        TickClock, TickSource, WorldPosition,
    };
}

mod dirty_marker;
mod error;
mod interest;
mod server;
mod session;
mod update;

pub use dirty_marker::{DirtyMarker, EntityChangeListener, PositionSource};
pub use error::VisibilityError;
pub use interest::{InterestRegion, MAX_DENSE_CHUNKS};
pub use server::{VisibilityConfig, VisibilityServer, MAX_VIEW_CHUNK_RADIUS};
pub use session::{DirtySources, SessionKey, SessionRecord, SessionTracker};
pub use update::{DeltaUpdate, FullResync, ResyncReason, SessionUpdate, SessionView};
