//! Roster onboarding from the JSON manifest.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::{ManifestEntry, Player};
use crate::storage::{StorageError, Store};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Outcome of a seed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Manifest entries processed
    pub count: usize,
    pub inserted: usize,
    pub updated: usize,
}

/// Read a manifest: a JSON array of `RiotUserName`/`RealName`/`PhotoPath`.
pub fn load_manifest(path: &Path) -> Result<Vec<ManifestEntry>, SeedError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Upsert every manifest entry by handle. New handles start with zeroed
/// stats; existing records only get their profile fields refreshed.
pub async fn seed_players(
    store: &dyn Store,
    entries: &[ManifestEntry],
    now: DateTime<Utc>,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for entry in entries {
        if entry.handle.trim().is_empty() {
            warn!("Skipping manifest entry without a handle: {:?}", entry.display_name);
            continue;
        }
        report.count += 1;

        match store.get_player(&entry.handle).await? {
            Some(mut existing) => {
                existing.display_name = entry.display_name.clone();
                existing.avatar = entry.avatar.clone();
                store.save_player(&existing).await?;
                report.updated += 1;
            }
            None => {
                let player = Player::new(
                    entry.handle.clone(),
                    entry.display_name.clone(),
                    entry.avatar.clone(),
                    now,
                );
                store.save_player(&player).await?;
                report.inserted += 1;
            }
        }
    }

    info!(
        "Seeded {} players ({} new, {} refreshed)",
        report.count, report.inserted, report.updated
    );
    Ok(report)
}

/// Seed from `manifest` when the roster is empty. Failures are logged and
/// swallowed so read paths keep working without a manifest.
pub async fn seed_if_empty(store: &dyn Store, manifest: &Path, now: DateTime<Utc>) {
    match store.count_players().await {
        Ok(0) => {}
        Ok(_) => return,
        Err(e) => {
            error!("Error counting players before seeding: {}", e);
            return;
        }
    }

    info!("Roster is empty, seeding from {:?}", manifest);

    let result = match load_manifest(manifest) {
        Ok(entries) => seed_players(store, &entries, now).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        error!("Error seeding roster: {}", e);
    }
}
