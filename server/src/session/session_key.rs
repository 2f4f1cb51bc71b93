// SessionKey
/// Identifies one connected session. Assigned by the connection layer.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct SessionKey(u64);

impl SessionKey {
    pub fn from_u64(value: u64) -> Self {
        SessionKey(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}
