//! Persistence layer.
//!
//! Player and team-aggregate documents live behind the [`Store`] trait.
//! The bundled implementation keeps them as JSONL files under the data
//! directory:
//! - `store/players.jsonl` (one document per player)
//! - `store/team_aggregate.jsonl` (at most one document)

mod jsonl;
mod store;

pub use jsonl::*;
pub use store::*;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::models::{MapStatsSummary, Player, Rating, SeasonSummary, TeamAggregate};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    pub fn entity_path(&self, entity: EntityType) -> PathBuf {
        self.store_dir().join(entity.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Document operations needed by the update cycle and the API.
#[async_trait]
pub trait Store: Send + Sync {
    /// All players in stored order.
    async fn list_players(&self) -> Result<Vec<Player>, StorageError>;

    async fn count_players(&self) -> Result<usize, StorageError>;

    async fn get_player(&self, handle: &str) -> Result<Option<Player>, StorageError>;

    /// Player with the oldest `last_updated`; never-updated players sort
    /// first, ties keep stored order.
    async fn find_stalest(&self) -> Result<Option<Player>, StorageError>;

    /// Replace the document with the same handle, or insert a new one.
    async fn save_player(&self, player: &Player) -> Result<(), StorageError>;

    /// Set only `last_updated`.
    async fn touch_player(&self, handle: &str, at: DateTime<Utc>) -> Result<(), StorageError>;

    /// Write one provider refresh onto the current stored document, leaving
    /// profile fields as they are, and return the result.
    async fn refresh_player(
        &self,
        handle: &str,
        rating: Rating,
        season: Option<SeasonSummary>,
        maps: MapStatsSummary,
        at: DateTime<Utc>,
    ) -> Result<Player, StorageError>;

    /// Players whose `last_updated` is set and strictly earlier than `at`.
    async fn count_updated_before(&self, at: DateTime<Utc>) -> Result<usize, StorageError>;

    async fn team_aggregate(&self) -> Result<Option<TeamAggregate>, StorageError>;

    /// Replace the singleton aggregate, creating it if absent.
    async fn save_team_aggregate(&self, aggregate: &TeamAggregate) -> Result<(), StorageError>;
}

/// Lazily opened store handle.
///
/// `connect` opens the store on first use and hands out the same instance
/// afterwards; concurrent first calls share one open.
pub struct Database {
    config: StorageConfig,
    store: OnceCell<Arc<JsonlStore>>,
}

impl Database {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            store: OnceCell::new(),
        }
    }

    pub async fn connect(&self) -> Result<Arc<JsonlStore>, StorageError> {
        let store = self
            .store
            .get_or_try_init(|| async {
                info!("Opening store at {:?}", self.config.store_dir());
                JsonlStore::open(&self.config).map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(store))
    }

    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }
}
