mod fallback;
mod file;
mod memory;
mod rest;

use async_trait::async_trait;

use crate::types::GameSession;

pub use fallback::FallbackStore;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use rest::{RestStore, RestStoreConfig};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors a session backend can report. Never surfaced past [`FallbackStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode session: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Backend that holds the one game session
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the session, or the default session if none was ever saved
    async fn load(&self) -> StoreResult<GameSession>;

    async fn save(&self, session: &GameSession) -> StoreResult<()>;

    /// Short backend name for logs and the debug endpoint
    fn name(&self) -> &str;
}
