//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging → Build server → Mount statics
//!
//! Restart (http::server):
//!     Stop listener → Drain (bounded) → Rebind same port
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then routes, then the listener
//! - Shutdown has a timeout: the serving task is aborted after the deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
