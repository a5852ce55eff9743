//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (setup time):
//!     route.get("/hello", layers)
//!     → path.rs (server base + base URL + sub-path)
//!     → route.rs (bind layers into an endpoint)
//!     → table.rs (merge into routes[full_path][GET])
//!
//! Dispatch (per request):
//!     path + method
//!     → table.rs (exact match)
//!     → endpoint (resolve IP, compose chain, run)
//!     → miss: fallback 404
//! ```
//!
//! # Design Decisions
//! - Exact string keys only; no parameters, no wildcards
//! - Closed method set, one fixed slot per method
//! - Same (path, method) twice replaces one slot; siblings survive

pub mod method;
pub mod path;
pub mod route;
pub mod table;

pub use method::{Method, MethodHandlers, UnsupportedMethod};
pub use route::Route;
pub use table::{endpoint, Endpoint, RouteTable};
