//! Environment-driven startup configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::prompts::PromptTable;
use crate::store::{FallbackStore, FileStore, RestStore, RestStoreConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid prompt table: {0}")]
    InvalidPrompts(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Which backend holds the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    File,
    Rest,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store_kind: StoreKind,
    pub session_file: PathBuf,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub session_row_id: String,
    pub store_timeout: Duration,
    pub prompts_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            store_kind: StoreKind::Memory,
            session_file: PathBuf::from("game_state.json"),
            supabase_url: None,
            supabase_key: None,
            session_row_id: "main".to_string(),
            store_timeout: Duration::from_secs(5),
            prompts_file: None,
        }
    }
}

/// Read an env var, trimmed, treating empty as unset
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = match env_var("BIND_ADDR") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                name: "BIND_ADDR",
                value: v,
            })?,
            None => defaults.bind_addr,
        };

        let supabase_url = env_var("SUPABASE_URL");
        let supabase_key = env_var("SUPABASE_ANON_KEY");

        let store_kind = match env_var("SESSION_STORE").map(|v| v.to_lowercase()) {
            Some(v) if v == "memory" => StoreKind::Memory,
            Some(v) if v == "file" => StoreKind::File,
            Some(v) if v == "rest" || v == "supabase" => StoreKind::Rest,
            Some(v) => {
                return Err(ConfigError::InvalidValue {
                    name: "SESSION_STORE",
                    value: v,
                })
            }
            None if supabase_url.is_some() && supabase_key.is_some() => StoreKind::Rest,
            None => StoreKind::Memory,
        };

        let store_timeout = env_var("STORE_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.store_timeout);

        Ok(Self {
            bind_addr,
            store_kind,
            session_file: env_var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
            supabase_url,
            supabase_key,
            session_row_id: env_var("SESSION_ROW_ID").unwrap_or(defaults.session_row_id),
            store_timeout,
            prompts_file: env_var("PROMPTS_FILE").map(PathBuf::from),
        })
    }

    pub fn load_prompts(&self) -> Result<PromptTable, ConfigError> {
        match &self.prompts_file {
            Some(path) => {
                let table = PromptTable::from_file(path)?;
                tracing::info!("Loaded {} prompts from {}", table.len(), path.display());
                Ok(table)
            }
            None => Ok(PromptTable::builtin()),
        }
    }

    /// Build the session store. A durable backend that cannot be set up
    /// is replaced by the in-memory store with a warning.
    pub fn build_store(&self) -> FallbackStore {
        match self.store_kind {
            StoreKind::Memory => {
                tracing::info!("Using in-memory session store");
                FallbackStore::in_memory()
            }
            StoreKind::File => {
                tracing::info!(
                    "Using file session store at {}",
                    self.session_file.display()
                );
                FallbackStore::new(Box::new(FileStore::new(self.session_file.clone())))
            }
            StoreKind::Rest => {
                let (Some(url), Some(key)) = (&self.supabase_url, &self.supabase_key) else {
                    tracing::warn!(
                        "SUPABASE_URL and SUPABASE_ANON_KEY must both be set for the rest store; using in-memory session store"
                    );
                    return FallbackStore::in_memory();
                };
                let config = RestStoreConfig {
                    row_id: self.session_row_id.clone(),
                    timeout: self.store_timeout,
                    ..RestStoreConfig::new(url.clone(), key.clone())
                };
                match RestStore::new(config) {
                    Ok(store) => {
                        tracing::info!("Using rest session store at {}", url);
                        FallbackStore::new(Box::new(store))
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Failed to build rest session store: {}; using in-memory session store",
                            e
                        );
                        FallbackStore::in_memory()
                    }
                }
            }
        }
    }
}
