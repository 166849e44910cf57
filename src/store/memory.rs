use super::*;
use tokio::sync::RwLock;

/// In-process store. Lives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    session: RwLock<GameSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read without going through the fallible trait signature
    pub async fn get(&self) -> GameSession {
        self.session.read().await.clone()
    }

    pub async fn set(&self, session: GameSession) {
        *self.session.write().await = session;
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self) -> StoreResult<GameSession> {
        Ok(self.get().await)
    }

    async fn save(&self, session: &GameSession) -> StoreResult<()> {
        self.set(session.clone()).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
