//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Server::listen(port)
//!     → listener.rs (Serve / ListenerHandle contracts)
//!     → host.rs (bind TcpListener, axum::serve, graceful shutdown)
//!     → dispatch: exact table lookup, else fallback
//!
//! Listener States:
//!     Bound → Serving → Draining → Closed
//! ```
//!
//! # Design Decisions
//! - The router only talks to the contracts; `AxumServe` is the default
//!   host and tests substitute their own
//! - Stop completes (drain or abort) before the port is reused

pub mod host;
pub mod listener;

pub use host::{AxumServe, ConnectInfoResolver};
pub use listener::{ListenerHandle, ResolveAddress, Serve, ServeConfig};
