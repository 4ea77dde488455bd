//! Proxy server setup and per-connection service.
//!
//! # Responsibilities
//! - Build the shared state (cache, hand-off queue)
//! - Spawn the fixed worker pool once, then loop accepting and enqueuing
//! - Drive each connection: cache lookup, origin connect, rewrite,
//!   relay, opportunistic insert
//!
//! # Design Decisions
//! - Workers are detached and long-lived; they end with the process
//! - A socket closes when its halves drop, on every exit path
//! - Errors mid-relay abort the single request, never the process

use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use uuid::Uuid;

use crate::cache::ResponseCache;
use crate::config::{ProxyConfig, UpstreamConfig};
use crate::http::request::{self, RequestError};
use crate::http::response;
use crate::http::uri;
use crate::net::{HandoffQueue, Listener, ListenerError};
use crate::observability::metrics;

/// Shared state handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ResponseCache>,
    pub upstream: Arc<UpstreamConfig>,
}

/// The forward proxy: a fixed worker pool fed by an accept loop.
pub struct ProxyServer {
    config: ProxyConfig,
    state: AppState,
    queue: Arc<HandoffQueue<TcpStream>>,
}

impl ProxyServer {
    /// Create a new proxy server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let state = AppState {
            cache: Arc::new(ResponseCache::new(&config.cache)),
            upstream: Arc::new(config.upstream.clone()),
        };
        let queue = Arc::new(HandoffQueue::new(config.workers.queue_depth));

        Self {
            config,
            state,
            queue,
        }
    }

    /// Handle to the shared cache.
    pub fn cache(&self) -> Arc<ResponseCache> {
        self.state.cache.clone()
    }

    /// Run the proxy: spawn the worker pool, then accept forever.
    ///
    /// Accepted sockets are pushed onto the hand-off queue; when every
    /// slot is taken the accept loop itself waits, which is the only
    /// backpressure the proxy applies.
    pub async fn run(self, listener: Listener) -> Result<(), ListenerError> {
        for worker_id in 0..self.config.workers.count {
            let queue = self.queue.clone();
            let state = self.state.clone();
            tokio::spawn(async move {
                worker_loop(worker_id, queue, state).await;
            });
        }

        tracing::info!(
            workers = self.config.workers.count,
            queue_depth = self.queue.capacity(),
            "Worker pool started"
        );

        loop {
            match listener.accept().await {
                Ok((stream, _peer)) => self.queue.push(stream).await,
                Err(e) => {
                    tracing::error!(error = %e, "Accept failed");
                }
            }
        }
    }
}

/// One worker: claim connections from the queue until process exit.
async fn worker_loop(worker_id: usize, queue: Arc<HandoffQueue<TcpStream>>, state: AppState) {
    loop {
        let stream = queue.pop().await;
        handle_connection(stream, &state, worker_id).await;
    }
}

/// Serve a single client connection.
async fn handle_connection(stream: TcpStream, state: &AppState, worker_id: usize) {
    let request_id = Uuid::new_v4();
    let max_line = state.upstream.max_line_bytes;

    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let line = match request::read_line_bounded(&mut reader, max_line).await {
        Ok(Some(line)) => line,
        Ok(None) => return,
        Err(RequestError::LineTooLong) => {
            request::drain_headers(&mut reader, max_line).await;
            respond_error(
                &mut write_half,
                500,
                "Internal Server Error",
                "request line",
                "Line exceeds the proxy's bound",
            )
            .await;
            return;
        }
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Failed to read request line");
            return;
        }
    };

    let (method, target) = match request::parse_request_line(&line) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Rejecting request");
            request::drain_headers(&mut reader, max_line).await;
            let shown = String::from_utf8_lossy(&line);
            respond_error(
                &mut write_half,
                400,
                "Bad Request",
                shown.trim_end(),
                "Malformed request line",
            )
            .await;
            return;
        }
    };

    // Text copies for logging and error pages; the raw bytes stay the
    // protocol currency.
    let method_text = String::from_utf8_lossy(&method).into_owned();
    metrics::record_request(&method_text);

    if !method.eq_ignore_ascii_case(b"GET") {
        tracing::debug!(request_id = %request_id, method = %method_text, "Method not implemented");
        request::drain_headers(&mut reader, max_line).await;
        respond_error(
            &mut write_half,
            501,
            "Not Implemented",
            &method_text,
            "The proxy does not implement this method",
        )
        .await;
        return;
    }

    // Cache hit: replay the stored response, origin untouched
    if let Some(body) = state.cache.find(&target).await {
        tracing::debug!(
            request_id = %request_id,
            worker_id,
            target = %String::from_utf8_lossy(&target),
            bytes = body.len(),
            "Cache hit"
        );
        request::drain_headers(&mut reader, max_line).await;
        if let Err(e) = write_half.write_all(&body).await {
            tracing::warn!(request_id = %request_id, error = %e, "Client write failed on cached response");
        }
        return;
    }

    let origin_addr = uri::parse_target(&target);
    let host = origin_addr.host_lossy().into_owned();
    tracing::debug!(
        request_id = %request_id,
        worker_id,
        host = %host,
        port = origin_addr.port,
        path = %String::from_utf8_lossy(&origin_addr.path),
        "Cache miss, contacting origin"
    );

    let origin = match TcpStream::connect((host.as_str(), origin_addr.port)).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                host = %host,
                error = %e,
                "Origin connect failed"
            );
            request::drain_headers(&mut reader, max_line).await;
            respond_error(
                &mut write_half,
                503,
                "Service Unavailable",
                &host,
                "Could not reach the origin server",
            )
            .await;
            return;
        }
    };

    let upstream_request = match request::build_upstream_request(
        &mut reader,
        &origin_addr,
        &state.upstream.user_agent,
        max_line,
    )
    .await
    {
        Ok(req) => req,
        Err(RequestError::LineTooLong) => {
            request::drain_headers(&mut reader, max_line).await;
            respond_error(
                &mut write_half,
                500,
                "Internal Server Error",
                "header line",
                "Line exceeds the proxy's bound",
            )
            .await;
            return;
        }
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Failed to read client headers");
            return;
        }
    };

    let (origin_read, mut origin_write) = origin.into_split();
    if let Err(e) = origin_write.write_all(&upstream_request).await {
        tracing::warn!(request_id = %request_id, error = %e, "Failed to send upstream request");
        return;
    }

    let mut origin_reader = BufReader::new(origin_read);
    match response::stream_and_capture(
        &mut origin_reader,
        &mut write_half,
        state.cache.max_object_bytes(),
        max_line,
    )
    .await
    {
        Ok(Some(captured)) => {
            state.cache.insert(&target, captured).await;
        }
        Ok(None) => {
            tracing::debug!(
                request_id = %request_id,
                target = %String::from_utf8_lossy(&target),
                "Response exceeded the object bound, not cached"
            );
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Relay aborted");
        }
    }
}

async fn respond_error(
    writer: &mut OwnedWriteHalf,
    status: u16,
    reason: &str,
    cause: &str,
    detail: &str,
) {
    if let Err(e) = response::write_client_error(writer, status, reason, cause, detail).await {
        tracing::debug!(error = %e, "Failed to write error response");
    }
    metrics::record_client_error(status);
}
