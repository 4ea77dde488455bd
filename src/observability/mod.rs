//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields, request id correlation)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The tracing subscriber is installed by the binary, not the library
//! - Metrics are cheap (atomic increments) and no-ops until a recorder
//!   is installed, so the library records them unconditionally

pub mod metrics;
