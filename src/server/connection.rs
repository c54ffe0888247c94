// Connection handling module
// Accepts a TCP connection and serves HTTP/1 requests on it

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;

use crate::config;
use crate::handler;
use crate::http::HttpResponse;
use crate::logger::{self, AccessLogEntry};

/// Accept and process a connection, enforcing the connection limit.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<config::AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    if state.access_log_enabled() {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Serve one connection in a local task.
///
/// The connection lives at most `max(read_timeout, write_timeout)` seconds;
/// the active connection counter is released when it ends.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<config::AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let timeout_duration = Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| serve_request(req, peer_addr, Arc::clone(&service_state))),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Run the router for one request, writing an access log line when enabled
async fn serve_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<config::AppState>,
) -> Result<HttpResponse, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if !state.access_log_enabled() {
        return handler::handle_request(req, state).await;
    }

    let started = Instant::now();
    let mut entry = AccessLogEntry::from_request(&req, peer_addr);
    let resp = handler::handle_request(req, Arc::clone(&state)).await?;

    let body_bytes = resp.body().size_hint().exact().unwrap_or_default();
    entry.complete(resp.status().as_u16(), body_bytes, started.elapsed());
    logger::log_access(&entry, &state.config.logging.access_log_format);

    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::MemoryStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const STATUS_REQUEST: &[u8] = b"GET / HTTP/1.1\r\nHost: relay\r\nConnection: close\r\n\r\n";

    async fn wait_for_count(counter: &AtomicUsize, expected: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while counter.load(Ordering::SeqCst) != expected {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_connection_limit_rejects_then_releases() {
        let mut cfg = Config::from_defaults().unwrap();
        cfg.logging.access_log = false;
        cfg.performance.max_connections = Some(1);
        let state = Arc::new(config::AppState::new(&cfg, Arc::new(MemoryStore::new(60))));
        let counter = Arc::new(AtomicUsize::new(0));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let mut first = TcpStream::connect(addr).await.unwrap();
                let (stream, peer) = listener.accept().await.unwrap();
                accept_connection(stream, peer, &state, &counter);
                assert_eq!(counter.load(Ordering::SeqCst), 1);

                // Over the limit: closed without a response
                let mut second = TcpStream::connect(addr).await.unwrap();
                let (stream, peer) = listener.accept().await.unwrap();
                accept_connection(stream, peer, &state, &counter);
                assert_eq!(counter.load(Ordering::SeqCst), 1);
                let mut rejected = Vec::new();
                second.read_to_end(&mut rejected).await.unwrap();
                assert!(rejected.is_empty());

                first.write_all(STATUS_REQUEST).await.unwrap();
                let mut response = Vec::new();
                first.read_to_end(&mut response).await.unwrap();
                assert!(response.starts_with(b"HTTP/1.1 200 OK"));
                wait_for_count(&counter, 0).await;

                // A slot is free again
                let mut third = TcpStream::connect(addr).await.unwrap();
                let (stream, peer) = listener.accept().await.unwrap();
                accept_connection(stream, peer, &state, &counter);
                assert_eq!(counter.load(Ordering::SeqCst), 1);
                third.write_all(STATUS_REQUEST).await.unwrap();
                let mut response = Vec::new();
                third.read_to_end(&mut response).await.unwrap();
                assert!(response.starts_with(b"HTTP/1.1 200 OK"));
                wait_for_count(&counter, 0).await;
            })
            .await;
    }
}
