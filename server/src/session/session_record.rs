use sightline_shared::{tick_greater_than, Tick};

/// Acknowledgment state kept for one connected session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    acknowledged_tick: Tick,
    has_full_state: bool,
}

impl SessionRecord {
    pub(crate) fn new(connect_tick: Tick) -> Self {
        Self {
            acknowledged_tick: connect_tick,
            has_full_state: false,
        }
    }

    /// Latest tick the remote end confirmed receiving
    pub fn acknowledged_tick(&self) -> Tick {
        self.acknowledged_tick
    }

    /// Whether the session has been sent a full resync since connecting
    pub fn has_full_state(&self) -> bool {
        self.has_full_state
    }

    /// Returns false, and changes nothing, for ticks older than the stored one.
    /// Ticks are compared with wraparound.
    pub(crate) fn acknowledge(&mut self, tick: Tick) -> bool {
        if tick != self.acknowledged_tick && !tick_greater_than(tick, self.acknowledged_tick) {
            return false;
        }
        self.acknowledged_tick = tick;
        true
    }

    /// Stores `tick` unconditionally. Used when the stored tick is too old to
    /// be compared with.
    pub(crate) fn replace_acknowledged(&mut self, tick: Tick) {
        self.acknowledged_tick = tick;
    }

    pub(crate) fn set_full_state(&mut self) {
        self.has_full_state = true;
    }
}
