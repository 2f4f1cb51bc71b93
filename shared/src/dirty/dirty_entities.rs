use std::collections::HashSet;

use crate::{EntityId, Tick};

/// Every entity added or dirtied over a range of ticks, `since` exclusive and
/// `until` inclusive.
///
/// An entity is reported in at most one of the two sets: one that was added
/// anywhere in the range is reported as added, since its full state must be
/// sent regardless of any later mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtyEntities {
    since: Tick,
    until: Tick,
    added: HashSet<EntityId>,
    dirtied: HashSet<EntityId>,
}

impl DirtyEntities {
    pub(crate) fn new(since: Tick, until: Tick) -> Self {
        Self {
            since,
            until,
            added: HashSet::new(),
            dirtied: HashSet::new(),
        }
    }

    pub(crate) fn extend(&mut self, added: &HashSet<EntityId>, dirtied: &HashSet<EntityId>) {
        for entity in added {
            self.dirtied.remove(entity);
            self.added.insert(*entity);
        }
        for entity in dirtied {
            if !self.added.contains(entity) {
                self.dirtied.insert(*entity);
            }
        }
    }

    pub fn since(&self) -> Tick {
        self.since
    }

    pub fn until(&self) -> Tick {
        self.until
    }

    pub fn added(&self) -> &HashSet<EntityId> {
        &self.added
    }

    pub fn dirtied(&self) -> &HashSet<EntityId> {
        &self.dirtied
    }

    pub fn contains(&self, entity: &EntityId) -> bool {
        self.added.contains(entity) || self.dirtied.contains(entity)
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.dirtied.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.dirtied.len()
    }

    pub fn into_sets(self) -> (HashSet<EntityId>, HashSet<EntityId>) {
        (self.added, self.dirtied)
    }
}
