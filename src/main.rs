//! Concurrent caching HTTP/1.0 forward proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                 FORWARD PROXY                   │
//!                    │                                                 │
//!   Client ──────────┼─▶ net/listener ──▶ net/queue ──▶ worker pool   │
//!                    │                    (bounded FIFO)   (4 tasks)   │
//!                    │                                        │        │
//!                    │            ┌── hit ── cache ◀──────────┤        │
//!   Client ◀─────────┼────────────┘                           ▼        │
//!                    │                      http/uri → origin socket   │
//!   Client ◀─────────┼── relay + capture ◀─ http/request rewrite ──────┼──▶ Origin
//!                    │         │                                       │
//!                    │         └──▶ cache insert (bounded, LRU)        │
//!                    └────────────────────────────────────────────────┘
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forward_proxy::config::validation::validate_config;
use forward_proxy::config::ProxyConfig;
use forward_proxy::net::Listener;
use forward_proxy::ProxyServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forward_proxy=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: {} <port>", args[0]);
        std::process::exit(1);
    }

    tracing::info!("forward-proxy v0.1.0 starting");

    let mut config = ProxyConfig::default();
    config.listener.bind_address = format!("0.0.0.0:{}", args[1]);

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(%error, "Invalid configuration");
        }
        std::process::exit(1);
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        workers = config.workers.count,
        queue_depth = config.workers.queue_depth,
        cache_total_bytes = config.cache.max_total_bytes,
        cache_object_bytes = config.cache.max_object_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            forward_proxy::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = Listener::bind(&config.listener).await?;
    let server = ProxyServer::new(config);
    server.run(listener).await?;

    Ok(())
}
