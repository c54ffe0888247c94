//! Fetch endpoint
//!
//! `/get/{uuid}` returns the stored ciphertext verbatim. The identifier is
//! the raw path remainder; it is not percent-decoded.

use hyper::StatusCode;
use serde::Serialize;
use std::sync::Arc;

use crate::config::AppState;
use crate::http::{self, HttpResponse};
use crate::logger;

#[derive(Serialize)]
struct FetchResponse {
    encrypted: String,
}

/// Handle `/get/{uuid}`
pub async fn handle_fetch(uuid: &str, state: &Arc<AppState>) -> HttpResponse {
    if uuid.is_empty() {
        return http::build_400_response();
    }

    match state.store.get(uuid).await {
        Ok(Some(encrypted)) if !encrypted.is_empty() => {
            http::build_json_response(StatusCode::OK, &FetchResponse { encrypted })
        }
        Ok(_) => http::build_404_response(),
        Err(e) => {
            logger::log_error(&format!("[Fetch] store read failed for {uuid}: {e}"));
            http::build_500_response()
        }
    }
}
