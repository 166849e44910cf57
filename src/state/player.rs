use super::SessionService;
use crate::types::{GameSession, Player};

impl SessionService {
    /// Add a player, or rename the one already registered under this id
    pub async fn register_player(&self, player: Player) {
        self.register_player_snapshot(player).await;
    }

    /// [`register_player`](Self::register_player), returning the session it saved
    pub async fn register_player_snapshot(&self, player: Player) -> GameSession {
        let _guard = self.gate.write().await;
        let mut session = self.load_session().await;

        let rejoin = session.player(&player.id).is_some();
        tracing::info!(
            "Player {} {} as {:?}",
            player.id,
            if rejoin { "rejoined" } else { "joined" },
            player.name
        );
        session.upsert_player(player);

        self.store.save(&session).await;
        tracing::debug!("Session now has {} players", session.players.len());
        session
    }
}
