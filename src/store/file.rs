use super::*;
use std::path::PathBuf;

/// Durable store keeping the session as a JSON file on local disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn load(&self) -> StoreResult<GameSession> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(GameSession::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, session: &GameSession) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(session)?;
        // Write-then-rename so readers never see a half-written file
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Player;

    #[tokio::test]
    async fn test_missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));
        assert_eq!(store.load().await.unwrap(), GameSession::default());
    }

    #[tokio::test]
    async fn test_save_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut session = GameSession::default();
        session.players.push(Player::new("p1", "Alice"));
        FileStore::new(&path).save(&session).await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.load().await.unwrap(), session);
        assert!(!reopened.temp_path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = FileStore::new(&path).load().await;
        assert!(matches!(result, Err(StoreError::Decode(_))));
    }

    #[tokio::test]
    async fn test_unwritable_location_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("missing").join("state.json"));
        let result = store.save(&GameSession::default()).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
