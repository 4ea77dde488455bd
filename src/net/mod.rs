//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop)
//!     → queue.rs (bounded FIFO hand-off, acceptor blocks when full)
//!     → claimed by a worker task in the HTTP layer
//! ```

pub mod listener;
pub mod queue;

pub use listener::{Listener, ListenerError};
pub use queue::HandoffQueue;
