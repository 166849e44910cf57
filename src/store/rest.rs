use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for a hosted PostgREST (Supabase) table
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Anonymous/service key, sent as `apikey` and bearer token
    pub api_key: String,
    pub table: String,
    /// Primary key of the single session row
    pub row_id: String,
    pub timeout: Duration,
}

impl RestStoreConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            table: "game_state".to_string(),
            row_id: "main".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Durable store backed by one row of a hosted database table.
///
/// Row layout: `{ id: text primary key, data: jsonb, updated_at: timestamptz }`.
pub struct RestStore {
    config: RestStoreConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SelectRow {
    data: GameSession,
}

#[derive(Debug, Serialize)]
struct UpsertRow<'a> {
    id: &'a str,
    data: &'a GameSession,
    updated_at: String,
}

impl RestStore {
    pub fn new(config: RestStoreConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.table
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn check_status(response: reqwest::Response) -> StoreResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl SessionStore for RestStore {
    async fn load(&self) -> StoreResult<GameSession> {
        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[
                ("id", format!("eq.{}", self.config.row_id)),
                ("select", "data".to_string()),
            ])
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        // Decode from text so a malformed row is a Decode error, not Http
        let body = response.text().await?;
        let rows: Vec<SelectRow> = serde_json::from_str(&body)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.data)
            .unwrap_or_default())
    }

    async fn save(&self, session: &GameSession) -> StoreResult<()> {
        let row = UpsertRow {
            id: &self.config.row_id,
            data: session,
            updated_at: chrono::Utc::now().to_rfc3339(),
        };
        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row])
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "rest"
    }
}
