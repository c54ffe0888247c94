//! Request body reading
//!
//! Collects a request body under a size limit and optionally gunzips it.
//! The decoded payload is bounded by the same limit and must consume the
//! whole body.

use flate2::bufread::GzDecoder;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use std::io::Read;
use thiserror::Error;

/// Errors produced while reading a request body
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("body exceeds {0} bytes")]
    TooLarge(usize),

    #[error("failed to read body: {0}")]
    Read(String),

    #[error("failed to decode gzip body: {0}")]
    Gzip(#[from] std::io::Error),

    #[error("{0} unexpected bytes after gzip stream")]
    TrailingData(usize),
}

/// Read the full body, failing once more than `limit` bytes arrive.
/// When `gzip` is set the collected bytes are decompressed.
pub async fn read_body<B>(body: B, limit: usize, gzip: bool) -> Result<Bytes, BodyError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let collected = Limited::new(body, limit).collect().await.map_err(|e| {
        if e.downcast_ref::<LengthLimitError>().is_some() {
            BodyError::TooLarge(limit)
        } else {
            BodyError::Read(e.to_string())
        }
    })?;
    let raw = collected.to_bytes();

    if gzip {
        gunzip(&raw, limit)
    } else {
        Ok(raw)
    }
}

fn gunzip(data: &[u8], limit: usize) -> Result<Bytes, BodyError> {
    let mut decoded = Vec::new();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let mut decoder = GzDecoder::new(data);
    (&mut decoder).take(cap).read_to_end(&mut decoded)?;
    if decoded.len() > limit {
        return Err(BodyError::TooLarge(limit));
    }

    // The decoder stops at the end of the first member
    let rest = decoder.into_inner();
    if !rest.is_empty() {
        return Err(BodyError::TrailingData(rest.len()));
    }
    Ok(Bytes::from(decoded))
}
