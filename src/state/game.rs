use super::SessionService;
use crate::types::*;

impl SessionService {
    /// Snapshot of the whole session for status displays
    pub async fn get_session(&self) -> GameSession {
        let _guard = self.gate.read().await;
        self.load_session().await
    }

    /// Drop all players and any running round
    pub async fn reset_game(&self) {
        let _guard = self.gate.write().await;
        let previous = self.load_session().await;

        self.store.save(&GameSession::default()).await;

        tracing::info!(
            "Game reset ({} players removed, round active: {})",
            previous.players.len(),
            previous.is_round_active()
        );
    }
}
