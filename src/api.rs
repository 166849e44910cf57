//! HTTP endpoints for the host dashboard and player devices.
//!
//! Handlers only translate between JSON and [`SessionService`] calls. Each
//! response is built from the single snapshot its service call returns.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::{SessionError, SessionService};
use crate::types::{GameSession, Player, PlayerId};

/// Build the application router
pub fn router(service: Arc<SessionService>) -> Router {
    Router::new()
        .route("/api/join", post(join))
        .route("/api/start-round", post(start_round))
        .route("/api/get-role", get(get_role))
        .route("/api/game-status", get(game_status))
        .route("/api/reset", post(reset))
        .route("/api/debug", get(debug))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Error body shared by all failing endpoints
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            message: message.into(),
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub success: bool,
    pub player_id: PlayerId,
    pub player_count: usize,
}

/// POST /api/join
pub async fn join(
    State(service): State<Arc<SessionService>>,
    Json(req): Json<JoinRequest>,
) -> Response {
    let Some(name) = req.name.filter(|n| !n.trim().is_empty()) else {
        return error(StatusCode::BAD_REQUEST, "Player name is required");
    };

    let player_id = ulid::Ulid::new().to_string();
    let session = service
        .register_player_snapshot(Player::new(player_id.clone(), name.trim()))
        .await;
    let player_count = session.players.len();

    Json(JoinResponse {
        success: true,
        player_id,
        player_count,
    })
    .into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRoundResponse {
    pub success: bool,
    pub prompt: String,
    pub spy_id: PlayerId,
    pub player_count: usize,
    pub players: Vec<Player>,
}

/// POST /api/start-round
pub async fn start_round(State(service): State<Arc<SessionService>>) -> Response {
    match service.start_round_snapshot().await {
        Ok((started, session)) => Json(StartRoundResponse {
            success: true,
            prompt: started.prompt,
            spy_id: started.spy_id,
            player_count: session.players.len(),
            players: session.players,
        })
        .into_response(),
        Err(e @ SessionError::InsufficientPlayers { .. }) => {
            error(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleQuery {
    pub player_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub success: bool,
    pub is_spy: bool,
    pub prompt: Option<String>,
    pub message: Option<String>,
    pub player_name: String,
}

/// GET /api/get-role?playerId=...
pub async fn get_role(
    State(service): State<Arc<SessionService>>,
    Query(query): Query<RoleQuery>,
) -> Response {
    let Some(player_id) = query.player_id.filter(|id| !id.is_empty()) else {
        return error(StatusCode::BAD_REQUEST, "Player ID is required");
    };

    let Some((player, role)) = service.get_player_view(&player_id).await else {
        tracing::info!("Role requested for unknown player {}", player_id);
        return error(StatusCode::NOT_FOUND, "Player not found");
    };

    let message = if role.is_spy {
        Some("You are the spy.".to_string())
    } else {
        role.prompt.clone()
    };

    Json(RoleResponse {
        success: true,
        is_spy: role.is_spy,
        prompt: role.prompt,
        message,
        player_name: player.name,
    })
    .into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatusResponse {
    pub success: bool,
    pub players: Vec<Player>,
    pub player_count: usize,
    pub is_round_active: bool,
    pub current_prompt: Option<String>,
    pub spy_id: Option<PlayerId>,
    pub round_number: u32,
    pub timestamp: String,
}

/// GET /api/game-status
pub async fn game_status(State(service): State<Arc<SessionService>>) -> Json<GameStatusResponse> {
    let session = service.get_session().await;

    Json(GameStatusResponse {
        success: true,
        player_count: session.players.len(),
        is_round_active: session.is_round_active(),
        current_prompt: session.current_prompt(service.prompts()).map(str::to_string),
        spy_id: session.spy_id().map(str::to_string),
        round_number: session.round_number(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        players: session.players,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
    pub player_count: usize,
}

/// POST /api/reset
pub async fn reset(State(service): State<Arc<SessionService>>) -> Json<ResetResponse> {
    service.reset_game().await;

    Json(ResetResponse {
        success: true,
        message: "Game reset successfully".to_string(),
        player_count: 0,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugResponse {
    pub store: String,
    pub degraded: bool,
    pub prompt_count: usize,
    pub session: GameSession,
}

/// GET /api/debug
pub async fn debug(State(service): State<Arc<SessionService>>) -> Json<DebugResponse> {
    Json(DebugResponse {
        store: service.store().backend_name().to_string(),
        degraded: service.store().is_degraded(),
        prompt_count: service.prompts().len(),
        session: service.get_session().await,
    })
}
