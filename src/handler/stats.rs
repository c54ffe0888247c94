//! Status endpoint
//!
//! Reports the live number of stored keys. The count is recomputed on every
//! request by walking the store's listing.

use hyper::StatusCode;
use serde::Serialize;
use std::sync::Arc;

use crate::config::AppState;
use crate::http::{self, HttpResponse};
use crate::logger;
use crate::store;

/// Service version reported by the status endpoint
pub const SERVICE_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_users: u64,
    pub status: &'static str,
    pub version: &'static str,
}

/// Handle `/`
pub async fn handle_stats(state: &Arc<AppState>) -> HttpResponse {
    match store::count_keys(state.store.as_ref(), state.list_page_size()).await {
        Ok(total_users) => http::build_pretty_json_response(
            StatusCode::OK,
            &StatsResponse {
                total_users,
                status: "running",
                version: SERVICE_VERSION,
            },
        ),
        Err(e) => {
            logger::log_error(&format!("[Stats] key listing failed: {e}"));
            http::build_500_response()
        }
    }
}
