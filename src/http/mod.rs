//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (claimed from the hand-off queue)
//!     → request.rs (bounded line read, method/target split)
//!     → [cache lookup decides hit or miss]
//!     → uri.rs (target → host, port, path)
//!     → request.rs (rewrite headers for the origin)
//!     → response.rs (relay + capture, error pages)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod uri;

pub use server::ProxyServer;
pub use uri::RequestTarget;
