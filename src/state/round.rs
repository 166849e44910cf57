use super::{SessionError, SessionService, MIN_PLAYERS};
use crate::types::*;
use rand::Rng;

/// Uniform picks of (prompt index, spy player index)
fn roll(prompt_count: usize, player_count: usize) -> (usize, usize) {
    let mut rng = rand::rng();
    (
        rng.random_range(0..prompt_count),
        rng.random_range(0..player_count),
    )
}

impl SessionService {
    /// Start a new round, re-rolling prompt and spy even if one is running
    pub async fn start_round(&self) -> Result<RoundStarted, SessionError> {
        self.start_round_snapshot()
            .await
            .map(|(started, _session)| started)
    }

    /// [`start_round`](Self::start_round), also returning the session it saved
    pub async fn start_round_snapshot(
        &self,
    ) -> Result<(RoundStarted, GameSession), SessionError> {
        let _guard = self.gate.write().await;
        let mut session = self.load_session().await;

        if session.players.len() < MIN_PLAYERS {
            tracing::info!(
                "Refusing to start round with {} players",
                session.players.len()
            );
            return Err(SessionError::InsufficientPlayers {
                required: MIN_PLAYERS,
                actual: session.players.len(),
            });
        }

        let (prompt_index, spy_index) = roll(self.prompts.len(), session.players.len());
        let spy_id = session.players[spy_index].id.clone();
        let prompt = self
            .prompts
            .get(prompt_index)
            .map(|entry| entry.full_text.clone())
            .unwrap_or_default();

        session.begin_round(ActiveRound {
            prompt_index,
            spy_id: spy_id.clone(),
        });
        self.store.save(&session).await;

        tracing::info!(
            "Round {} started with prompt #{} and {} players",
            session.round_number(),
            prompt_index,
            session.players.len()
        );

        Ok((RoundStarted { prompt, spy_id }, session))
    }

    /// What `player_id` should be shown. Does not check registration.
    pub async fn get_player_role(&self, player_id: &str) -> PlayerRole {
        let _guard = self.gate.read().await;
        let session = self.load_session().await;
        self.role_in(&session, player_id)
    }

    /// The registered player and their role, both from one snapshot.
    /// `None` when `player_id` is not registered.
    pub async fn get_player_view(&self, player_id: &str) -> Option<(Player, PlayerRole)> {
        let _guard = self.gate.read().await;
        let session = self.load_session().await;
        let player = session.player(player_id)?.clone();
        let role = self.role_in(&session, player_id);
        Some((player, role))
    }

    fn role_in(&self, session: &GameSession, player_id: &str) -> PlayerRole {
        // load_session guarantees the index is in the table
        let Some(entry) = session
            .current_prompt_index()
            .and_then(|index| self.prompts.get(index))
        else {
            return PlayerRole::idle();
        };

        let is_spy = session.spy_id() == Some(player_id);
        tracing::debug!("Role lookup for {}: spy={}", player_id, is_spy);

        PlayerRole {
            is_spy,
            prompt: Some(if is_spy {
                entry.redacted_text.clone()
            } else {
                entry.full_text.clone()
            }),
        }
    }
}
