//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits; every field has a default so the binary
//! can run from nothing but the port argument.

use serde::{Deserialize, Serialize};

/// Fixed User-Agent presented to every origin server.
pub const UPSTREAM_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3";

/// Root configuration for the forward proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Worker pool and hand-off queue sizing.
    pub workers: WorkerConfig,

    /// Response cache bounds.
    pub cache: CacheConfig,

    /// Upstream request settings.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of long-lived worker tasks serving connections.
    pub count: usize,

    /// Capacity of the acceptor-to-worker hand-off queue.
    pub queue_depth: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            count: 4,
            queue_depth: 16,
        }
    }
}

/// Response cache bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Total bytes the cache may hold across all entries.
    pub max_total_bytes: usize,

    /// Largest single response body eligible for caching.
    pub max_object_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_total_bytes: 1_049_000,
            max_object_bytes: 102_400,
        }
    }
}

/// Upstream request settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// User-Agent substituted into every origin-bound request.
    pub user_agent: String,

    /// Hard bound on a single request or header line, in bytes.
    pub max_line_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: UPSTREAM_USER_AGENT.to_string(),
            max_line_bytes: 8192,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
