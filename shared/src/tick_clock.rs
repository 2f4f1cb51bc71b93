use crate::Tick;

/// Supplies the tick currently being simulated.
///
/// Dirty reporting stamps every record with the value returned here, so the
/// source must be the same clock that the cleanup driver advances.
pub trait TickSource {
    fn current_tick(&self) -> Tick;
}

/// The simulation's tick counter. Advanced exactly once per simulation step.
#[derive(Clone, Debug, Default)]
pub struct TickClock {
    current_tick: Tick,
}

impl TickClock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(tick: Tick) -> Self {
        Self { current_tick: tick }
    }

    /// Moves to the next tick and returns it
    pub fn advance(&mut self) -> Tick {
        self.current_tick = self.current_tick.wrapping_add(1);
        self.current_tick
    }

    /// The tick that would follow the current one
    pub fn next_tick(&self) -> Tick {
        self.current_tick.wrapping_add(1)
    }
}

impl TickSource for TickClock {
    fn current_tick(&self) -> Tick {
        self.current_tick
    }
}
