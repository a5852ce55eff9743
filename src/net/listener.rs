//! Host server primitive contracts.
//!
//! # Responsibilities
//! - `Serve`: bind a listener serving a route table with a fallback
//! - `ListenerHandle`: the live listener (stop, address resolution,
//!   table hot swap)
//! - `ResolveAddress`: requester address lookup shared with routes
//!
//! # Design Decisions
//! - The server owns the handle exclusively; routes only ever see the
//!   resolver half of it
//! - `stop` consumes the handle, so a stopped listener cannot be reused

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::Result;
use crate::http::request::{Request, DEFAULT_BODY_LIMIT};
use crate::routing::table::{Endpoint, RouteTable};

/// Everything a host needs to start serving.
#[derive(Clone)]
pub struct ServeConfig {
    pub host: IpAddr,
    pub port: u16,
    pub table: Arc<RouteTable>,
    /// Answers every request that misses the table.
    pub fallback: Endpoint,
    pub max_body_bytes: usize,
}

impl ServeConfig {
    pub fn new(port: u16, table: Arc<RouteTable>, fallback: Endpoint) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port,
            table,
            fallback,
            max_body_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

impl std::fmt::Debug for ServeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServeConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("paths", &self.table.len())
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

/// Looks up the address a request came from.
pub trait ResolveAddress: Send + Sync {
    fn requester_address(&self, req: &Request) -> Option<String>;
}

/// A live, bound listener.
pub trait ListenerHandle: Send + Sync {
    fn local_addr(&self) -> SocketAddr;

    fn port(&self) -> u16 {
        self.local_addr().port()
    }

    /// Resolver routes use to fill in the requester IP.
    fn resolver(&self) -> Arc<dyn ResolveAddress>;

    fn requester_address(&self, req: &Request) -> Option<String> {
        self.resolver().requester_address(req)
    }

    /// Serve `table` from now on without rebinding.
    fn swap_table(&self, table: Arc<RouteTable>);

    /// Stop accepting and release the port.
    ///
    /// With `graceful`, in-flight requests finish first.
    fn stop(self: Box<Self>, graceful: bool) -> BoxFuture<'static, Result<()>>;
}

/// Starts listeners.
pub trait Serve: Send + Sync {
    fn serve(&self, config: ServeConfig) -> BoxFuture<'_, Result<Box<dyn ListenerHandle>>>;
}
