//! File-backed document store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::{EntityType, JsonlReader, JsonlWriter, StorageConfig, StorageError, Store};
use crate::models::{MapStatsSummary, Player, Rating, SeasonSummary, TeamAggregate};

#[derive(Debug, Default)]
struct Collections {
    players: Vec<Player>,
    team: Option<TeamAggregate>,
}

/// JSONL-backed [`Store`]. Documents are held in memory and the affected
/// collection file is rewritten on every mutation. Memory only changes once
/// the rewrite has succeeded.
pub struct JsonlStore {
    config: StorageConfig,
    docs: RwLock<Collections>,
}

impl JsonlStore {
    /// Load both collections from disk. Missing files mean empty collections.
    pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        let players: Vec<Player> =
            JsonlReader::for_entity(config, EntityType::Player).read_all()?;
        let team = JsonlReader::<TeamAggregate>::for_entity(config, EntityType::TeamAggregate)
            .read_all()?
            .into_iter()
            .last();

        debug!(
            "Loaded {} players (team aggregate present: {})",
            players.len(),
            team.is_some()
        );

        Ok(Self {
            config: config.clone(),
            docs: RwLock::new(Collections { players, team }),
        })
    }

    fn persist_players(&self, players: &[Player]) -> Result<(), StorageError> {
        JsonlWriter::for_entity(&self.config, EntityType::Player).write_all(players)?;
        Ok(())
    }

    /// Apply `change` to a copy of the player collection, persist the copy,
    /// then swap it in.
    async fn update_player<F>(&self, handle: &str, change: F) -> Result<Player, StorageError>
    where
        F: FnOnce(&mut Player) + Send,
    {
        let mut docs = self.docs.write().await;

        let idx = docs
            .players
            .iter()
            .position(|p| p.handle == handle)
            .ok_or_else(|| StorageError::PlayerNotFound(handle.to_string()))?;

        let mut next = docs.players.clone();
        change(&mut next[idx]);
        self.persist_players(&next)?;

        let updated = next[idx].clone();
        docs.players = next;
        Ok(updated)
    }
}

#[async_trait]
impl Store for JsonlStore {
    async fn list_players(&self) -> Result<Vec<Player>, StorageError> {
        Ok(self.docs.read().await.players.clone())
    }

    async fn count_players(&self) -> Result<usize, StorageError> {
        Ok(self.docs.read().await.players.len())
    }

    async fn get_player(&self, handle: &str) -> Result<Option<Player>, StorageError> {
        Ok(self
            .docs
            .read()
            .await
            .players
            .iter()
            .find(|p| p.handle == handle)
            .cloned())
    }

    async fn find_stalest(&self) -> Result<Option<Player>, StorageError> {
        // `None < Some(_)`, and min_by_key returns the first minimum
        Ok(self
            .docs
            .read()
            .await
            .players
            .iter()
            .min_by_key(|p| p.last_updated)
            .cloned())
    }

    async fn save_player(&self, player: &Player) -> Result<(), StorageError> {
        let mut docs = self.docs.write().await;

        match docs.players.iter().position(|p| p.handle == player.handle) {
            Some(idx) => {
                let mut next = docs.players.clone();
                next[idx] = player.clone();
                self.persist_players(&next)?;
                docs.players = next;
            }
            None => {
                JsonlWriter::for_entity(&self.config, EntityType::Player).append(player)?;
                docs.players.push(player.clone());
            }
        }

        Ok(())
    }

    async fn touch_player(&self, handle: &str, at: DateTime<Utc>) -> Result<(), StorageError> {
        self.update_player(handle, |p| p.last_updated = Some(at))
            .await
            .map(|_| ())
    }

    async fn refresh_player(
        &self,
        handle: &str,
        rating: Rating,
        season: Option<SeasonSummary>,
        maps: MapStatsSummary,
        at: DateTime<Utc>,
    ) -> Result<Player, StorageError> {
        self.update_player(handle, |p| p.apply_refresh(rating, season, maps, at))
            .await
    }

    async fn count_updated_before(&self, at: DateTime<Utc>) -> Result<usize, StorageError> {
        Ok(self
            .docs
            .read()
            .await
            .players
            .iter()
            .filter(|p| p.last_updated.is_some_and(|t| t < at))
            .count())
    }

    async fn team_aggregate(&self) -> Result<Option<TeamAggregate>, StorageError> {
        Ok(self.docs.read().await.team.clone())
    }

    async fn save_team_aggregate(&self, aggregate: &TeamAggregate) -> Result<(), StorageError> {
        let mut docs = self.docs.write().await;
        JsonlWriter::for_entity(&self.config, EntityType::TeamAggregate)
            .write_all(std::slice::from_ref(aggregate))?;
        docs.team = Some(aggregate.clone());
        Ok(())
    }
}
