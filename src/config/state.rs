// Application state module
// Shared by every connection: loaded configuration plus the store handle

use crate::store::SharedStore;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: SharedStore,
}

impl AppState {
    pub fn new(config: &Config, store: SharedStore) -> Self {
        Self {
            config: config.clone(),
            store,
        }
    }

    /// TTL used for writes that carry no expiration
    pub const fn default_ttl(&self) -> i64 {
        self.config.store.default_ttl
    }

    pub const fn list_page_size(&self) -> usize {
        self.config.store.list_page_size
    }

    pub const fn max_body_size(&self) -> u64 {
        self.config.http.max_body_size
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
