//! HTTP response building module
//!
//! Provides builders for the relay's responses. Plain-text bodies carry the
//! same content type a browser `fetch` runtime assigns to string bodies.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Response type produced by every handler
pub type HttpResponse = Response<Full<Bytes>>;

/// Cross-origin headers attached to every response
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Content-Encoding"),
    ("Access-Control-Expose-Headers", "Content-Encoding"),
];

const TEXT_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";
const JSON_CONTENT_TYPE: &str = "application/json";

fn with_cors(mut builder: Builder) -> Builder {
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }
    builder
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> HttpResponse {
    with_cors(Response::builder().status(StatusCode::OK))
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build compact JSON response
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    match serde_json::to_string(body) {
        Ok(json) => json_response(status, json),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_500_response()
        }
    }
}

/// Build JSON response pretty-printed with 2-space indentation
pub fn build_pretty_json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    match serde_json::to_string_pretty(body) {
        Ok(json) => json_response(status, json),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_500_response()
        }
    }
}

fn json_response(status: StatusCode, json: String) -> HttpResponse {
    with_cors(Response::builder().status(status))
        .header("Content-Type", JSON_CONTENT_TYPE)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn text_response(status: StatusCode, text: &'static str) -> HttpResponse {
    with_cors(Response::builder().status(status))
        .header("Content-Type", TEXT_CONTENT_TYPE)
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from_static(text.as_bytes())))
        })
}

/// Build 400 Bad Request response
pub fn build_400_response() -> HttpResponse {
    text_response(StatusCode::BAD_REQUEST, "Bad Request")
}

/// Build 404 Not Found response
pub fn build_404_response() -> HttpResponse {
    text_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> HttpResponse {
    text_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> HttpResponse {
    text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
