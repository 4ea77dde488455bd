//! Concurrent caching HTTP/1.0 forward proxy library.

pub mod cache;
pub mod config;
pub mod http;
pub mod net;
pub mod observability;

pub use cache::ResponseCache;
pub use config::ProxyConfig;
pub use http::ProxyServer;
pub use net::Listener;
