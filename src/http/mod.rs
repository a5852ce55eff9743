//! HTTP surface subsystem.
//!
//! # Data Flow
//! ```text
//! Setup:
//!     Route registrations / static files
//!     → server.rs (aggregate table, global middleware)
//!     → net::host (listener serving the table)
//!
//! Per request:
//!     Host request
//!     → request.rs (wrapper with IP slot and body helpers)
//!     → middleware chain
//!     → response.rs (text, JSON, 404, 500)
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod static_files;

pub use request::Request;
pub use response::Response;
pub use server::Server;
pub use static_files::{FileLoader, LoadStatic};
