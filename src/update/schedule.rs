//! In-process tick scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use super::{UpdateCycle, UpdateError};

/// Tick forever at a fixed interval. The first tick fires immediately.
/// Failures are logged and the loop carries on.
pub async fn run_periodic(cycle: Arc<UpdateCycle>, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Scheduling an update every {:?}", every);

    loop {
        ticker.tick().await;

        match cycle.tick().await {
            Ok(report) => info!(
                "Scheduled update finished for {} (team stats updated: {})",
                report.display_name, report.team_stats_updated
            ),
            Err(UpdateError::NoPlayers) => info!("Scheduled update skipped: roster is empty"),
            Err(e) => warn!("Scheduled update failed: {}", e),
        }
    }
}

/// Spawn [`run_periodic`] onto the runtime.
pub fn spawn_periodic(cycle: Arc<UpdateCycle>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(run_periodic(cycle, every))
}
