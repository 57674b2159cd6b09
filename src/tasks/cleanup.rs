//! Cache Sweep Task
//!
//! Background task that periodically removes expired entries from every
//! cache registered with a [`CleanupCoordinator`].

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::coordinator::CleanupCoordinator;

/// Spawns the sweep loop for a coordinator.
///
/// The loop sweeps once per `interval`, starting one interval after spawn.
/// Sweeps run sequentially and never overlap; a slow sweep delays the next
/// tick instead of bursting. The loop exits when `cancel` or `stop` fires, or
/// when the coordinator has been dropped.
///
/// # Arguments
/// * `coordinator` - Weak handle so the task does not keep the coordinator alive
/// * `interval` - Time between sweeps, must be non-zero
/// * `cancel` - Caller-owned token, typically the process shutdown token
/// * `stop` - Coordinator-owned token fired by `CleanupCoordinator::stop`
pub fn spawn_cleanup_task(
    coordinator: Weak<CleanupCoordinator>,
    interval: Duration,
    cancel: CancellationToken,
    stop: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        info!("Starting cache sweep task with interval of {:?}", interval);

        loop {
            tokio::select! {
                biased;

                _ = stop.cancelled() => {
                    debug!("Cache sweep task stopped");
                    break;
                }
                _ = cancel.cancelled() => {
                    info!("Cache sweep task cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let Some(coordinator) = coordinator.upgrade() else {
                        debug!("Coordinator dropped, ending cache sweep task");
                        break;
                    };

                    let results = coordinator.clean_all();
                    let removed: usize = results.values().sum();

                    if removed > 0 {
                        info!(
                            "Cache sweep: removed {} expired entries across {} caches",
                            removed,
                            results.len()
                        );
                    } else {
                        debug!("Cache sweep: no expired entries found");
                    }
                }
            }
        }
    })
}
