//! Create/update endpoint
//!
//! `POST /update` accepts `{ "encrypted", "uuid", "expiration"? }`, optionally
//! gzip-encoded. Field checks follow JavaScript truthiness and `expiration`
//! is coerced the way `parseInt` coerces, since browser clients build these
//! bodies.

use hyper::body::Body;
use hyper::{Request, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppState;
use crate::http::{self, BodyError, HttpResponse};
use crate::logger;
use crate::store::StoreError;

/// Successful result of processing an update body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Entry written with the given TTL (seconds)
    Stored { ttl: i64 },
    /// `encrypted` or `uuid` missing or falsy
    MissingFields,
}

/// Failures while processing an update; all share one wire response
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Body(#[from] BodyError),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request body is JSON null")]
    NullBody,

    #[error("field `{0}` must be a string")]
    InvalidField(&'static str),

    #[error("expiration {0} is not an integer")]
    InvalidExpiration(String),

    #[error("store write failed: {0}")]
    Store(#[from] StoreError),
}

impl UpdateError {
    /// Short label used in log lines
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Body(_) => "body",
            Self::Json(_) | Self::NullBody => "parse",
            Self::InvalidField(_) | Self::InvalidExpiration(_) => "input",
            Self::Store(_) => "store",
        }
    }
}

#[derive(Serialize)]
struct UpdateResponse {
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration: Option<i64>,
}

/// Handle `POST /update`
pub async fn handle_update<B>(req: Request<B>, state: &Arc<AppState>) -> HttpResponse
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match process_update(req, state).await {
        Ok(UpdateOutcome::Stored { ttl }) => http::build_json_response(
            StatusCode::OK,
            &UpdateResponse {
                action: "done",
                expiration: Some(ttl),
            },
        ),
        Ok(UpdateOutcome::MissingFields) => http::build_400_response(),
        Err(e) => {
            logger::log_warning(&format!("[Update] {} error: {e}", e.kind()));
            http::build_json_response(
                StatusCode::OK,
                &UpdateResponse {
                    action: "error",
                    expiration: None,
                },
            )
        }
    }
}

/// Read, decode, validate and store one update request
pub async fn process_update<B>(
    req: Request<B>,
    state: &Arc<AppState>,
) -> Result<UpdateOutcome, UpdateError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let gzip = is_gzip(&req);
    let limit = usize::try_from(state.max_body_size()).unwrap_or(usize::MAX);
    let bytes = http::read_body(req.into_body(), limit, gzip).await?;

    let payload: Value = serde_json::from_slice(&bytes)?;
    if payload.is_null() {
        return Err(UpdateError::NullBody);
    }

    let encrypted = payload.get("encrypted");
    let uuid = payload.get("uuid");
    if !is_truthy(encrypted) || !is_truthy(uuid) {
        return Ok(UpdateOutcome::MissingFields);
    }
    let encrypted = encrypted
        .and_then(Value::as_str)
        .ok_or(UpdateError::InvalidField("encrypted"))?;
    let uuid = uuid
        .and_then(Value::as_str)
        .ok_or(UpdateError::InvalidField("uuid"))?;

    let ttl = match payload.get("expiration") {
        Some(expiration) if is_truthy(Some(expiration)) => parse_int(expiration)
            .ok_or_else(|| UpdateError::InvalidExpiration(expiration.to_string()))?,
        _ => state.default_ttl(),
    };

    state.store.put(uuid, encrypted, ttl).await?;
    Ok(UpdateOutcome::Stored { ttl })
}

fn is_gzip<B>(req: &Request<B>) -> bool {
    req.headers()
        .get("content-encoding")
        .is_some_and(|v| v.as_bytes() == b"gzip")
}

/// JavaScript truthiness of an optional JSON field
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Integer coercion matching `parseInt(value)` on the value's string form.
/// `None` stands for not-a-number.
fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_int_prefix(s),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            // Numbers stringify in exponent form outside this range
            if f.abs() >= 1e21 || (f != 0.0 && f.abs() < 1e-6) {
                parse_int_prefix(&format!("{f:e}"))
            } else {
                #[allow(clippy::cast_possible_truncation)]
                let truncated = f.trunc() as i64;
                Some(truncated)
            }
        }
        // Arrays stringify as comma-joined elements, so only the first counts
        Value::Array(items) => items.first().and_then(parse_int),
        Value::Null | Value::Bool(_) | Value::Object(_) => None,
    }
}

/// Parse the leading integer of `s`: optional whitespace, sign, then
/// decimal digits (or hex after `0x`). Saturates instead of overflowing.
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match s.get(..2) {
        Some("0x" | "0X") => (16, &s[2..]),
        _ => (10, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else { break };
        seen = true;
        value = value
            .saturating_mul(i64::from(radix))
            .saturating_add(i64::from(d));
    }

    seen.then(|| if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("120"), Some(120));
        assert_eq!(parse_int_prefix("  42"), Some(42));
        assert_eq!(parse_int_prefix("120abc"), Some(120));
        assert_eq!(parse_int_prefix("12.9"), Some(12));
        assert_eq!(parse_int_prefix("-5"), Some(-5));
        assert_eq!(parse_int_prefix("+7"), Some(7));
        assert_eq!(parse_int_prefix("0x10"), Some(16));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("0x"), None);
        assert_eq!(parse_int_prefix("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_parse_int_values() {
        assert_eq!(parse_int(&json!("120")), Some(120));
        assert_eq!(parse_int(&json!(3600)), Some(3600));
        assert_eq!(parse_int(&json!(120.9)), Some(120));
        assert_eq!(parse_int(&json!(-120.9)), Some(-120));
        assert_eq!(parse_int(&json!(1e21)), Some(1));
        assert_eq!(parse_int(&json!(1e-7)), Some(1));
        assert_eq!(parse_int(&json!(["300", 5])), Some(300));
        assert_eq!(parse_int(&json!([])), None);
        assert_eq!(parse_int(&json!(true)), None);
        assert_eq!(parse_int(&json!({ "ttl": 5 })), None);
        assert_eq!(parse_int(&json!("soon")), None);
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(0.0))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(is_truthy(Some(&json!("x"))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!([]))));
        assert!(is_truthy(Some(&json!({}))));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(UpdateError::NullBody.kind(), "parse");
        assert_eq!(UpdateError::InvalidField("uuid").kind(), "input");
        assert_eq!(
            UpdateError::Store(StoreError::InvalidTtl(5)).kind(),
            "store"
        );
        assert_eq!(UpdateError::Body(BodyError::TooLarge(1)).kind(), "body");
    }
}
