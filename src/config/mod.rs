//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI port argument
//!     → schema.rs defaults (every field has one)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - The only external input is the port argument; everything else is a
//!   default. The schema still exists so every constant has one home and
//!   tests can override bounds.
//! - Validation separates syntactic (serde) from semantic checks

pub mod schema;
pub mod validation;

pub use schema::CacheConfig;
pub use schema::ListenerConfig;
pub use schema::ProxyConfig;
pub use schema::UpstreamConfig;
pub use schema::WorkerConfig;
