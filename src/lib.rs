//! Switchyard: exact-match HTTP routing with composable middleware
//! chains on top of axum.

pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod routing;

// Request pipeline
pub mod middleware;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServerConfig;
pub use error::{Error, Result};
pub use http::{Request, Response, Server};
pub use lifecycle::Shutdown;
pub use middleware::{handler, layer, middleware, HandlerResult, Layer, Middleware, Next};
pub use routing::{Method, Route};
