use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::prompts::PromptTable;

/// Opaque ID types for type safety
pub type PlayerId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The prompt and spy chosen for the round in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRound {
    pub prompt_index: usize,
    pub spy_id: PlayerId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RoundState {
    #[default]
    Idle,
    Active(ActiveRound),
}

/// The single shared game session.
///
/// Persisted as a flat camelCase record. Decoding rejects records that break
/// the session invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord", into = "SessionRecord")]
pub struct GameSession {
    pub players: Vec<Player>,
    pub round: RoundState,
    /// Rounds started since the last reset (0 = none yet)
    rounds_started: u32,
}

impl GameSession {
    pub fn is_round_active(&self) -> bool {
        matches!(self.round, RoundState::Active(_))
    }

    pub fn active_round(&self) -> Option<&ActiveRound> {
        match &self.round {
            RoundState::Active(round) => Some(round),
            RoundState::Idle => None,
        }
    }

    pub fn current_prompt_index(&self) -> Option<usize> {
        self.active_round().map(|r| r.prompt_index)
    }

    pub fn spy_id(&self) -> Option<&str> {
        self.active_round().map(|r| r.spy_id.as_str())
    }

    /// Number shown for the current round; 1 until the second round starts
    pub fn round_number(&self) -> u32 {
        self.rounds_started.max(1)
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Full text of the active round's prompt
    pub fn current_prompt<'a>(&self, prompts: &'a PromptTable) -> Option<&'a str> {
        self.current_prompt_index()
            .and_then(|i| prompts.get(i))
            .map(|entry| entry.full_text.as_str())
    }

    /// Insert a player or rename the existing one with the same id
    pub(crate) fn upsert_player(&mut self, player: Player) {
        match self.players.iter_mut().find(|p| p.id == player.id) {
            Some(existing) => existing.name = player.name,
            None => self.players.push(player),
        }
    }

    pub(crate) fn begin_round(&mut self, round: ActiveRound) {
        self.round = RoundState::Active(round);
        self.rounds_started += 1;
    }
}

/// Persisted shape of [`GameSession`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    #[serde(default)]
    players: Vec<Player>,
    #[serde(default)]
    current_prompt_index: Option<usize>,
    #[serde(default)]
    spy_id: Option<PlayerId>,
    #[serde(default)]
    is_round_active: bool,
    #[serde(default)]
    round_number: Option<u32>,
    #[serde(default)]
    rounds_started: Option<u32>,
}

impl From<GameSession> for SessionRecord {
    fn from(session: GameSession) -> Self {
        let round_number = session.round_number();
        let (current_prompt_index, spy_id) = match session.round {
            RoundState::Active(round) => (Some(round.prompt_index), Some(round.spy_id)),
            RoundState::Idle => (None, None),
        };
        Self {
            is_round_active: current_prompt_index.is_some(),
            players: session.players,
            current_prompt_index,
            spy_id,
            round_number: Some(round_number),
            rounds_started: Some(session.rounds_started),
        }
    }
}

impl TryFrom<SessionRecord> for GameSession {
    type Error = String;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        {
            let mut seen = HashSet::new();
            if let Some(dup) = record.players.iter().find(|p| !seen.insert(p.id.as_str())) {
                return Err(format!("Duplicate player id '{}'", dup.id));
            }
        }

        let round = match (record.is_round_active, record.current_prompt_index, record.spy_id) {
            (false, None, None) => RoundState::Idle,
            (true, Some(prompt_index), Some(spy_id)) => {
                if !record.players.iter().any(|p| p.id == spy_id) {
                    return Err(format!("Spy '{}' is not a registered player", spy_id));
                }
                RoundState::Active(ActiveRound {
                    prompt_index,
                    spy_id,
                })
            }
            (active, index, spy) => {
                return Err(format!(
                    "Inconsistent round state: isRoundActive={}, currentPromptIndex={:?}, spyId={:?}",
                    active, index, spy
                ));
            }
        };

        // Records without roundsStarted only carried roundNumber while a round ran
        let rounds_started = record.rounds_started.unwrap_or(match round {
            RoundState::Active(_) => record.round_number.unwrap_or(1),
            RoundState::Idle => 0,
        });

        Ok(Self {
            players: record.players,
            round,
            rounds_started,
        })
    }
}

/// Result of a successful round start
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStarted {
    pub prompt: String,
    pub spy_id: PlayerId,
}

/// What a single player is allowed to see
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRole {
    pub is_spy: bool,
    pub prompt: Option<String>,
}

impl PlayerRole {
    pub fn idle() -> Self {
        Self {
            is_spy: false,
            prompt: None,
        }
    }
}
