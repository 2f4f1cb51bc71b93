// EntityId
/// Stable identity of a simulation entity. Carries no ownership, it is only
/// ever used as a key.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub fn from_u64(value: u64) -> Self {
        EntityId(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        EntityId(value)
    }
}
