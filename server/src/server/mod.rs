mod visibility_config;
pub use visibility_config::{VisibilityConfig, MAX_VIEW_CHUNK_RADIUS};

mod visibility_server;
pub use visibility_server::VisibilityServer;
