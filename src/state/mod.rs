mod game;
mod player;
mod round;

use crate::prompts::PromptTable;
use crate::store::FallbackStore;
use crate::types::{GameSession, RoundState};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Minimum number of registered players for a round
pub const MIN_PLAYERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Need at least {required} players to start a round (have {actual})")]
    InsufficientPlayers { required: usize, actual: usize },
}

/// Owner of the shared game session.
///
/// Mutations hold the write side of `gate` across their whole
/// load-modify-save cycle, so concurrent calls take effect in some serial
/// order. Reads take the read side and only ever see completed writes.
pub struct SessionService {
    store: FallbackStore,
    prompts: Arc<PromptTable>,
    gate: RwLock<()>,
}

impl SessionService {
    pub fn new(store: FallbackStore, prompts: Arc<PromptTable>) -> Self {
        Self {
            store,
            prompts,
            gate: RwLock::new(()),
        }
    }

    /// Service with no durable backend and the built-in prompts
    pub fn in_memory() -> Self {
        Self::new(FallbackStore::in_memory(), Arc::new(PromptTable::builtin()))
    }

    pub fn prompts(&self) -> &PromptTable {
        &self.prompts
    }

    pub fn store(&self) -> &FallbackStore {
        &self.store
    }

    /// Load the session, dropping an active round whose prompt is not in
    /// the table (the table changed since it was saved). Caller holds `gate`.
    async fn load_session(&self) -> GameSession {
        let mut session = self.store.load().await;
        if let Some(index) = session.current_prompt_index() {
            if self.prompts.get(index).is_none() {
                tracing::warn!(
                    "Stored round references prompt #{} but the table has {} entries; treating round as ended",
                    index,
                    self.prompts.len()
                );
                session.round = RoundState::Idle;
            }
        }
        session
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::in_memory()
    }
}
