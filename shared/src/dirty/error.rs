use thiserror::Error;

use crate::{EntityId, Tick};

/// Errors raised when the dirty ring buffer is used out of contract
///
/// Every one of these is a programming error in the caller: the buffer only
/// ever accepts writes for the tick in progress and rotation one tick at a
/// time. The buffer refuses the operation and leaves its state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirtyBufferError {
    /// The buffer was constructed with no slots
    #[error("Dirty ring buffer must hold at least one tick")]
    ZeroCapacity,

    /// A record was written for a tick other than the one in progress
    #[error("Cannot record {operation} of {entity:?} for tick {tick} - current tick is {current_tick}")]
    TickMismatch {
        operation: &'static str,
        entity: EntityId,
        tick: Tick,
        current_tick: Tick,
    },

    /// The buffer was rotated to a tick other than the next one
    #[error("Cannot advance dirty ring buffer to tick {requested} - expected tick {expected}")]
    OutOfSequence { requested: Tick, expected: Tick },
}
