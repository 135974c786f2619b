use chrono::Utc;
use std::sync::Arc;
use tokio::time::interval;
use tracing::{debug, info, instrument};

use super::directory::{ReapSummary, RoomDirectory};
use crate::config::CleanupConfig;

/// Starts the background task that periodically evicts stale members and
/// dormant rooms
#[instrument(skip(directory))]
pub async fn start_cleanup_task(directory: Arc<RoomDirectory>, config: CleanupConfig) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        member_ttl_secs = config.member_ttl.as_secs(),
        room_ttl_secs = config.room_ttl.as_secs(),
        "Starting room cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);
    // The first tick completes immediately
    cleanup_interval.tick().await;

    loop {
        cleanup_interval.tick().await;
        run_cleanup(&directory, &config).await;
    }
}

/// One reaper pass
pub async fn run_cleanup(directory: &RoomDirectory, config: &CleanupConfig) -> ReapSummary {
    debug!("Running room cleanup task");
    let summary = directory.reap(Utc::now(), config).await;

    if summary == ReapSummary::default() {
        debug!("Nothing to clean up");
    } else {
        info!(
            evicted_members = summary.evicted_members,
            removed_rooms = summary.removed_rooms,
            "Room cleanup completed"
        );
    }
    summary
}
