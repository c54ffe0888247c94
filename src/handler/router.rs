//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Dispatch order:
//! 1. `OPTIONS` on any path answers the cross-origin preflight
//! 2. `/` (or an empty path) reports service status
//! 3. `POST /update` stores an entry
//! 4. `/get/{uuid}` fetches an entry
//! 5. anything else is 404

use hyper::body::Body;
use hyper::{Method, Request};
use std::convert::Infallible;
use std::sync::Arc;

use super::{fetch, stats, update};
use crate::config::AppState;
use crate::http::{self, HttpResponse};
use crate::logger;

const UPDATE_PATH: &str = "/update";
const FETCH_PREFIX: &str = "/get/";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<HttpResponse, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.method() == Method::OPTIONS {
        return Ok(http::build_options_response());
    }

    let path = req.uri().path().to_string();

    if path == "/" || path.is_empty() {
        return Ok(stats::handle_stats(&state).await);
    }

    if path == UPDATE_PATH && req.method() == Method::POST {
        if let Some(resp) = check_body_size(&req, state.max_body_size()) {
            return Ok(resp);
        }
        return Ok(update::handle_update(req, &state).await);
    }

    if let Some(uuid) = path.strip_prefix(FETCH_PREFIX) {
        return Ok(fetch::handle_fetch(uuid, &state).await);
    }

    Ok(http::build_404_response())
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<HttpResponse> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}
