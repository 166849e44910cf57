use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::get, Json, Router};
use serde_json::Value;
use spyprompt::prompts::PromptTable;
use spyprompt::state::{SessionError, SessionService};
use spyprompt::store::{FallbackStore, FileStore, RestStore, RestStoreConfig, SessionStore};
use spyprompt::types::{GameSession, Player};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

async fn service_with(ids: &[&str]) -> Arc<SessionService> {
    let service = Arc::new(SessionService::in_memory());
    for id in ids {
        service.register_player(Player::new(*id, *id)).await;
    }
    service
}

/// Scenario A: two players can start a round
#[tokio::test]
async fn test_two_players_start_round() {
    let service = service_with(&["P1", "P2"]).await;

    let started = service.start_round().await.expect("round should start");
    assert!(["P1", "P2"].contains(&started.spy_id.as_str()));

    let table = PromptTable::builtin();
    assert!(table
        .entries()
        .iter()
        .any(|entry| entry.full_text == started.prompt));

    let session = service.get_session().await;
    assert_eq!(session.round_number(), 1);
    assert!(session.is_round_active());
}

/// Scenario B: a single player cannot start a round
#[tokio::test]
async fn test_single_player_cannot_start() {
    let service = service_with(&["P1"]).await;

    let result = service.start_round().await;
    assert!(matches!(
        result,
        Err(SessionError::InsufficientPlayers { actual: 1, .. })
    ));
    assert!(!service.get_session().await.is_round_active());
}

/// Scenario C: the spy sees the redaction, everyone else the full prompt
#[tokio::test]
async fn test_spy_and_civilian_views() {
    let service = service_with(&["P1", "P2"]).await;
    let started = service.start_round().await.unwrap();

    let session = service.get_session().await;
    let entry = service
        .prompts()
        .get(session.current_prompt_index().unwrap())
        .unwrap()
        .clone();
    let other = if started.spy_id == "P1" { "P2" } else { "P1" };

    let spy = service.get_player_role(&started.spy_id).await;
    assert!(spy.is_spy);
    assert_eq!(spy.prompt.as_deref(), Some(entry.redacted_text.as_str()));

    let civilian = service.get_player_role(other).await;
    assert!(!civilian.is_spy);
    assert_eq!(civilian.prompt.as_deref(), Some(entry.full_text.as_str()));
    assert_ne!(spy.prompt, civilian.prompt);
}

/// Scenario D: starting again while a round is active re-rolls it
#[tokio::test]
async fn test_back_to_back_rounds() {
    let service = service_with(&["P1", "P2"]).await;

    service.start_round().await.unwrap();
    let first = service.get_session().await;
    assert_eq!(first.round_number(), 1);
    assert!(first.is_round_active());

    service.start_round().await.unwrap();
    let second = service.get_session().await;
    assert_eq!(second.round_number(), 2);
    assert!(second.is_round_active());
    assert!(second.player(second.spy_id().unwrap()).is_some());
}

/// Scenario E: reset wipes players and the current round
#[tokio::test]
async fn test_reset_after_round() {
    let service = service_with(&["P1", "P2", "P3"]).await;
    service.start_round().await.unwrap();

    service.reset_game().await;

    let session = service.get_session().await;
    assert!(session.players.is_empty());
    assert_eq!(session.round_number(), 1);
    assert!(!session.is_round_active());
    assert_eq!(session.spy_id(), None);
    assert_eq!(session.current_prompt_index(), None);
}

#[tokio::test]
async fn test_repeated_joins_stay_unique() {
    let service = service_with(&[]).await;
    let ids = ["a", "b", "a", "c", "b", "a"];
    for (n, id) in ids.iter().enumerate() {
        service
            .register_player(Player::new(*id, format!("name-{}", n)))
            .await;
    }

    let session = service.get_session().await;
    let order: Vec<_> = session.players.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "c"]);
    assert_eq!(session.player("a").unwrap().name, "name-5");
    assert_eq!(session.player("b").unwrap().name, "name-4");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_lose_nothing() {
    let service = service_with(&[]).await;

    let tasks = (0..50).map(|i| {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .register_player(Player::new(format!("p{}", i), format!("Player {}", i)))
                .await;
        })
    });
    for result in futures::future::join_all(tasks).await {
        result.unwrap();
    }

    let session = service.get_session().await;
    assert_eq!(session.players.len(), 50);
    let unique: HashSet<_> = session.players.iter().map(|p| p.id.clone()).collect();
    assert_eq!(unique.len(), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rounds_and_joins_stay_consistent() {
    let service = service_with(&["p0", "p1"]).await;

    let mut tasks = Vec::new();
    for i in 2..22 {
        let joiner = service.clone();
        tasks.push(tokio::spawn(async move {
            joiner
                .register_player(Player::new(format!("p{}", i), "late"))
                .await;
        }));
        let host = service.clone();
        tasks.push(tokio::spawn(async move {
            host.start_round().await.unwrap();
        }));
    }
    for result in futures::future::join_all(tasks).await {
        result.unwrap();
    }

    let session = service.get_session().await;
    assert_eq!(session.players.len(), 22);
    assert_eq!(session.round_number(), 20);
    assert!(session.player(session.spy_id().unwrap()).is_some());
}

#[tokio::test]
async fn test_file_backed_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game_state.json");
    let prompts = Arc::new(PromptTable::builtin());

    let first = SessionService::new(
        FallbackStore::new(Box::new(FileStore::new(&path))),
        prompts.clone(),
    );
    first.register_player(Player::new("p1", "Alice")).await;
    first.register_player(Player::new("p2", "Bob")).await;
    let started = first.start_round().await.unwrap();

    let second = SessionService::new(FallbackStore::new(Box::new(FileStore::new(&path))), prompts);
    let session = second.get_session().await;
    assert_eq!(session.players.len(), 2);
    assert_eq!(session.spy_id(), Some(started.spy_id.as_str()));
    assert!(!second.store().is_degraded());
}

#[tokio::test]
async fn test_broken_durable_store_keeps_game_playable() {
    let dir = tempfile::tempdir().unwrap();
    // Parent directory does not exist, so every save fails
    let path = dir.path().join("missing").join("game_state.json");
    let service = SessionService::new(
        FallbackStore::new(Box::new(FileStore::new(path))),
        Arc::new(PromptTable::builtin()),
    );

    service.register_player(Player::new("p1", "Alice")).await;
    service.register_player(Player::new("p2", "Bob")).await;
    assert!(service.store().is_degraded());

    let started = service.start_round().await.unwrap();
    let role = service.get_player_role(&started.spy_id).await;
    assert!(role.is_spy);
    assert_eq!(service.get_session().await.players.len(), 2);
}

/// Minimal stand-in for a PostgREST table holding one row
type FakeRow = Arc<Mutex<Option<Value>>>;

async fn fake_select(State(row): State<FakeRow>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if headers.get("apikey").is_none() {
        return (StatusCode::UNAUTHORIZED, Json(Value::Null));
    }
    let rows = match row.lock().await.clone() {
        Some(data) => serde_json::json!([{ "data": data }]),
        None => serde_json::json!([]),
    };
    (StatusCode::OK, Json(rows))
}

async fn fake_upsert(
    State(row): State<FakeRow>,
    headers: HeaderMap,
    Json(body): Json<Vec<Value>>,
) -> StatusCode {
    let prefer = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if headers.get("apikey").is_none() || !prefer.contains("merge-duplicates") {
        return StatusCode::BAD_REQUEST;
    }
    let Some(first) = body.into_iter().next() else {
        return StatusCode::BAD_REQUEST;
    };
    if first["id"] != "main" || first["updated_at"].is_null() {
        return StatusCode::BAD_REQUEST;
    }
    *row.lock().await = Some(first["data"].clone());
    StatusCode::CREATED
}

async fn spawn_fake_postgrest() -> (String, FakeRow) {
    let row: FakeRow = Arc::new(Mutex::new(None));
    let app = Router::new()
        .route("/rest/v1/game_state", get(fake_select).post(fake_upsert))
        .with_state(row.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), row)
}

#[tokio::test]
async fn test_rest_store_round_trip() {
    let (url, row) = spawn_fake_postgrest().await;
    let store = RestStore::new(RestStoreConfig::new(url, "anon")).unwrap();

    assert_eq!(store.load().await.unwrap(), GameSession::default());

    let mut session = GameSession::default();
    session.players.push(Player::new("p1", "Alice"));
    store.save(&session).await.unwrap();

    let stored = row.lock().await.clone().unwrap();
    assert_eq!(stored["players"][0]["name"], "Alice");
    assert_eq!(stored["isRoundActive"], false);
    assert_eq!(store.load().await.unwrap(), session);
}

#[tokio::test]
async fn test_rest_store_behind_service() {
    let (url, row) = spawn_fake_postgrest().await;
    let store = RestStore::new(RestStoreConfig::new(url, "anon")).unwrap();
    let service = SessionService::new(
        FallbackStore::new(Box::new(store)),
        Arc::new(PromptTable::builtin()),
    );

    service.register_player(Player::new("p1", "Alice")).await;
    service.register_player(Player::new("p2", "Bob")).await;
    service.start_round().await.unwrap();

    let stored = row.lock().await.clone().unwrap();
    assert_eq!(stored["isRoundActive"], true);
    assert_eq!(stored["roundNumber"], 1);
    assert!(!service.store().is_degraded());
}
