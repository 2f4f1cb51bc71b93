use std::collections::HashSet;

use crate::{ticks_since, EntityId, Tick};

use super::{dirty_entities::DirtyEntities, error::DirtyBufferError};

const SLOT_CAPACITY: usize = 32;

cfg_if! {
    if #[cfg(debug_assertions)] {
        fn contract_violated(error: DirtyBufferError) {
            panic!("{}", error);
        }
    } else {
        fn contract_violated(error: DirtyBufferError) {
            log::warn!("{} - dropping", error);
        }
    }
}

struct RingSlot {
    added: HashSet<EntityId>,
    dirtied: HashSet<EntityId>,
}

impl RingSlot {
    fn new() -> Self {
        Self {
            added: HashSet::with_capacity(SLOT_CAPACITY),
            dirtied: HashSet::with_capacity(SLOT_CAPACITY),
        }
    }

    fn clear(&mut self) {
        self.added.clear();
        self.dirtied.clear();
    }
}

/// Records which entities were added and which were dirtied during each of
/// the last `buffer_size` ticks.
///
/// The cursor slot holds the tick in progress and the slot `n` places behind it
/// holds the tick `n` ticks ago. Anything older has been overwritten, and
/// [`DirtyRingBuffer::lookup`] reports it as expired instead of returning the
/// wrong tick's data.
pub struct DirtyRingBuffer {
    slots: Vec<RingSlot>,
    current_index: usize,
    current_tick: Tick,
}

impl DirtyRingBuffer {
    pub fn new(buffer_size: usize) -> Result<Self, DirtyBufferError> {
        Self::starting_at(buffer_size, 0)
    }

    pub fn starting_at(buffer_size: usize, tick: Tick) -> Result<Self, DirtyBufferError> {
        if buffer_size == 0 {
            return Err(DirtyBufferError::ZeroCapacity);
        }

        let mut slots = Vec::with_capacity(buffer_size);
        for _ in 0..buffer_size {
            slots.push(RingSlot::new());
        }

        Ok(Self {
            slots,
            current_index: 0,
            current_tick: tick,
        })
    }

    pub fn buffer_size(&self) -> usize {
        self.slots.len()
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// The oldest tick that can still be looked up
    pub fn oldest_tick(&self) -> Tick {
        let span = (self.slots.len() - 1).min(Tick::MAX as usize) as Tick;
        self.current_tick.saturating_sub(span)
    }

    /// Whether `tick` is the current tick or one of the ticks still held
    /// behind it. Ticks in the future are not.
    pub fn is_within_window(&self, tick: Tick) -> bool {
        (ticks_since(tick, self.current_tick) as usize) < self.slots.len()
    }

    // Slots are addressed relative to the cursor, so the mapping stays
    // consistent when the tick counter wraps.
    fn index_of(&self, tick: Tick) -> usize {
        let size = self.slots.len();
        let back = ticks_since(tick, self.current_tick) as usize % size;
        (self.current_index + size - back) % size
    }

    fn check_tick(
        &self,
        operation: &'static str,
        entity: &EntityId,
        tick: Tick,
    ) -> Result<(), DirtyBufferError> {
        if tick != self.current_tick {
            return Err(DirtyBufferError::TickMismatch {
                operation,
                entity: *entity,
                tick,
                current_tick: self.current_tick,
            });
        }
        Ok(())
    }

    // Recording

    /// Records that `entity` was created during `tick`, which must be the tick
    /// in progress.
    pub fn try_record_added(&mut self, entity: &EntityId, tick: Tick) -> Result<(), DirtyBufferError> {
        self.check_tick("addition", entity, tick)?;

        let slot = &mut self.slots[self.current_index];
        slot.dirtied.remove(entity);
        slot.added.insert(*entity);
        Ok(())
    }

    /// Records that `entity` was mutated during `tick`, which must be the tick
    /// in progress. Does nothing if the entity was added in the same tick.
    pub fn try_record_dirtied(&mut self, entity: &EntityId, tick: Tick) -> Result<(), DirtyBufferError> {
        self.check_tick("mutation", entity, tick)?;

        let slot = &mut self.slots[self.current_index];
        if !slot.added.contains(entity) {
            slot.dirtied.insert(*entity);
        }
        Ok(())
    }

    /// Like [`DirtyRingBuffer::try_record_added`].
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `tick` is not the current tick. Release builds
    /// log the violation and drop the record.
    pub fn record_added(&mut self, entity: &EntityId, tick: Tick) {
        if let Err(error) = self.try_record_added(entity, tick) {
            contract_violated(error);
        }
    }

    /// Like [`DirtyRingBuffer::try_record_dirtied`].
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `tick` is not the current tick. Release builds
    /// log the violation and drop the record.
    pub fn record_dirtied(&mut self, entity: &EntityId, tick: Tick) {
        if let Err(error) = self.try_record_dirtied(entity, tick) {
            contract_violated(error);
        }
    }

    // Reading

    /// Returns the added and dirtied sets recorded for `since`, or `None` if
    /// that tick has already fallen out of the window.
    ///
    /// `None` means the caller is too far behind and needs a full resync. It
    /// never means "nothing changed".
    pub fn lookup(&self, since: Tick) -> Option<(&HashSet<EntityId>, &HashSet<EntityId>)> {
        if !self.is_within_window(since) {
            return None;
        }

        let slot = &self.slots[self.index_of(since)];
        Some((&slot.added, &slot.dirtied))
    }

    /// Unions every tick after `since` up to and including the current tick.
    ///
    /// Returns `None` under the same condition as [`DirtyRingBuffer::lookup`].
    pub fn collect_since(&self, since: Tick) -> Option<DirtyEntities> {
        self.lookup(since)?;

        let mut output = DirtyEntities::new(since, self.current_tick);
        let mut tick = since;
        while tick != self.current_tick {
            tick = tick.wrapping_add(1);
            let slot = &self.slots[self.index_of(tick)];
            output.extend(&slot.added, &slot.dirtied);
        }
        Some(output)
    }

    // Rotation

    /// Moves the cursor to `new_tick` and clears the slot it will write into.
    /// `new_tick` must directly follow the current tick.
    pub fn try_advance(&mut self, new_tick: Tick) -> Result<(), DirtyBufferError> {
        let expected = self.current_tick.wrapping_add(1);
        if new_tick != expected {
            return Err(DirtyBufferError::OutOfSequence {
                requested: new_tick,
                expected,
            });
        }

        self.current_index = (self.current_index + 1) % self.slots.len();
        self.slots[self.current_index].clear();
        self.current_tick = new_tick;
        Ok(())
    }

    /// Like [`DirtyRingBuffer::try_advance`].
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `new_tick` is out of sequence. Release builds
    /// log the violation and leave the buffer where it was.
    pub fn advance(&mut self, new_tick: Tick) {
        if let Err(error) = self.try_advance(new_tick) {
            contract_violated(error);
        }
    }
}
