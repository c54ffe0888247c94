// Expiration sweep module
// Periodically drops expired entries from the in-process store

use std::sync::Arc;
use std::time::Duration;

use crate::logger;
use crate::store::MemoryStore;

/// Spawn the sweep task; an interval of 0 disables it
pub fn start_sweeper(store: Arc<MemoryStore>, interval_secs: u64) {
    if interval_secs == 0 {
        return;
    }

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.purge_expired().await;
            logger::log_sweep(removed, store.len().await);
        }
    });
}
