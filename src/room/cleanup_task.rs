use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, instrument};

use super::store::RoomStore;

/// Configuration for the cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run the cleanup task
    pub cleanup_interval: Duration,
    /// How long a room must be inactive before deletion
    pub inactivity_threshold: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(30 * 60), // 30 minutes
            inactivity_threshold: Duration::from_secs(24 * 60 * 60), // 24 hours
        }
    }
}

/// Starts the background task that periodically removes abandoned rooms.
///
/// There is no server-side turn timeout, so a stalled room stays live at
/// the same progress index until its speaker returns; this sweep is the
/// only thing bounding how long an abandoned room is retained.
#[instrument(skip(store))]
pub async fn start_cleanup_task(store: Arc<RoomStore>, config: CleanupConfig) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        inactivity_threshold_secs = config.inactivity_threshold.as_secs(),
        "Starting room cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        let removed = store.remove_stale(config.inactivity_threshold).await;
        if removed.is_empty() {
            info!("No stale rooms to clean up");
        } else {
            info!(
                removed_count = removed.len(),
                codes = ?removed,
                "Room cleanup completed"
            );
        }
    }
}
