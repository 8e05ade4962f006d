//! Background tasks for the frontdesk server.
//!
//! Includes:
//! - Reloading the mock data file when it is edited on disk.

use frontdesk_store::BusinessService;
use tokio::time::{sleep, Duration};

/// Starts the data file sync task.
///
/// Runs indefinitely, checking every `interval_secs` whether the data file
/// changed on disk and reloading it when it did.
pub async fn start_sync_task(store: BusinessService, interval_secs: u64) {
    if interval_secs == 0 {
        tracing::warn!("data file sync task disabled (interval=0)");
        return;
    }

    let interval = Duration::from_secs(interval_secs);
    tracing::info!(interval_secs, "starting data file sync task");

    loop {
        sleep(interval).await;

        match store.sync_with_disk().await {
            Ok(true) => {
                tracing::info!("reloaded mock data after external edit");
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!("failed to sync mock data with disk: {}", e);
            }
        }
    }
}
