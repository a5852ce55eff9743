//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!
//! logging.rs installs the subscriber:
//!     → EnvFilter (RUST_LOG, else config level)
//!     → fmt layer (pretty or JSON) on stdout
//!
//! net::host adds per-request spans (TraceLayer) and x-request-id.
//! ```

pub mod logging;
