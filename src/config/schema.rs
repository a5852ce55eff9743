//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every section has defaults so an empty file is a valid config.

use serde::{Deserialize, Serialize};

/// Root configuration for a server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener bind and stop behaviour.
    pub listener: ListenerConfig,

    /// Route composition and table refresh behaviour.
    pub routing: RoutingConfig,

    /// Static files mounted at startup.
    pub statics: Vec<StaticMount>,

    /// Logging and request tracing.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0", "::", "127.0.0.1").
    pub host: String,

    /// Port used by the binary when none is given on the command line.
    pub port: u16,

    /// Let in-flight requests finish when stopping or restarting.
    pub graceful_stop: bool,

    /// Upper bound on a graceful drain before the listener is aborted.
    pub drain_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            graceful_stop: true,
            drain_timeout_secs: 10,
        }
    }
}

/// How structural table changes reach a live listener.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReloadStrategy {
    /// Stop the listener and bind again on the same port.
    #[default]
    Restart,
    /// Replace the table inside the running listener.
    HotSwap,
}

/// Routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    /// Prefix for routes registered directly on the server (e.g., "/v1").
    pub base_path: String,

    /// Applied after `use_route` and `serve_static`.
    pub reload: ReloadStrategy,

    /// Maximum request body size in bytes for the body helpers.
    pub max_body_bytes: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            reload: ReloadStrategy::Restart,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// A file served at a fixed path.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StaticMount {
    /// URL path (e.g., "/html").
    pub path: String,

    /// Filesystem path of the file to serve.
    pub file: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Attach and propagate `x-request-id`.
    pub request_id: bool,

    /// Wrap the service in a tower-http trace layer.
    pub trace_requests: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            request_id: true,
            trace_requests: true,
        }
    }
}
