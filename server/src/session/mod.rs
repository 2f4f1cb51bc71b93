mod session_key;
mod session_record;
mod session_tracker;

pub use session_key::SessionKey;
pub use session_record::SessionRecord;
pub use session_tracker::{DirtySources, SessionTracker};
