//! Route registrar.
//!
//! # Responsibilities
//! - Record method + path + chain registrations under one base URL
//! - Compose full paths (server base + base URL + sub-path)
//! - Build endpoints that resolve the requester IP, then run
//!   global ++ route ++ call-site layers
//!
//! # Design Decisions
//! - Endpoints read both middleware stacks when a request arrives, so
//!   layers added after registration still apply
//! - A route learns about its server (global layers, address resolver)
//!   through a subscription set when the server uses it

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::http::request::Request;
use crate::middleware::chain::{self, Layer};
use crate::middleware::stack::MiddlewareStack;
use crate::net::listener::ResolveAddress;
use crate::routing::method::Method;
use crate::routing::path;
use crate::routing::table::{endpoint, Endpoint, RouteTable};

const IPV4_MAPPED_PREFIX: &str = "::ffff:";

/// State a server shares with every route it has used.
#[derive(Default)]
pub(crate) struct ServerShared {
    pub(crate) globals: MiddlewareStack,
    resolver: ArcSwapOption<Arc<dyn ResolveAddress>>,
}

impl ServerShared {
    pub(crate) fn resolver(&self) -> Option<Arc<dyn ResolveAddress>> {
        self.resolver.load_full().map(|r| Arc::clone(&*r))
    }

    pub(crate) fn set_resolver(&self, resolver: Option<Arc<dyn ResolveAddress>>) {
        self.resolver.store(resolver.map(Arc::new));
    }
}

/// Per-route state captured by every endpoint the route builds.
#[derive(Default)]
struct Scope {
    middleware: MiddlewareStack,
    server: ArcSwapOption<ServerShared>,
    /// Run server globals in the order they were added (server-owned routes).
    globals_oldest_first: bool,
}

impl Scope {
    fn compose(&self, call_site: &[Layer]) -> Arc<[Layer]> {
        let own = self.middleware.snapshot();
        let mut chain: Vec<Layer> = Vec::with_capacity(own.len() + call_site.len());
        if let Some(server) = self.server.load_full() {
            let globals = server.globals.snapshot();
            if self.globals_oldest_first {
                chain.extend(globals.iter().rev().cloned());
            } else {
                chain.extend(globals.iter().cloned());
            }
        }
        chain.extend(own.iter().cloned());
        chain.extend(call_site.iter().cloned());
        chain.into()
    }

    fn resolve_ip(&self, req: &mut Request) {
        let Some(resolver) = self.server.load_full().and_then(|s| s.resolver()) else {
            return;
        };
        if let Some(address) = resolver.requester_address(req) {
            let ip = strip_ipv4_mapped(&address).to_string();
            req.set_ip(ip);
        }
    }
}

/// Drop a leading IPv4-mapped-IPv6 prefix (`::ffff:10.0.0.1` → `10.0.0.1`).
pub fn strip_ipv4_mapped(address: &str) -> &str {
    address.strip_prefix(IPV4_MAPPED_PREFIX).unwrap_or(address)
}

/// A group of registrations sharing a base URL and a middleware stack.
pub struct Route {
    base_url: String,
    server_base: String,
    routes: RouteTable,
    scope: Arc<Scope>,
}

impl Route {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            server_base: String::new(),
            routes: RouteTable::new(),
            scope: Arc::default(),
        }
    }

    /// Root route owned by a server: empty base URL, server globals
    /// oldest-first.
    pub(crate) fn server_root(server_base: impl Into<String>) -> Self {
        let scope = Scope {
            globals_oldest_first: true,
            ..Scope::default()
        };
        Self {
            base_url: String::new(),
            server_base: server_base.into(),
            routes: RouteTable::new(),
            scope: Arc::new(scope),
        }
    }

    /// Prefix applied in front of the base URL for later registrations.
    pub fn with_server_base(mut self, prefix: impl Into<String>) -> Self {
        self.set_server_base(prefix);
        self
    }

    pub fn set_server_base(&mut self, prefix: impl Into<String>) {
        self.server_base = prefix.into();
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn server_base(&self) -> &str {
        &self.server_base
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Route-level layers in execution order.
    pub fn middleware(&self) -> Arc<Vec<Layer>> {
        self.scope.middleware.snapshot()
    }

    /// Add a route-level layer ahead of the ones already present.
    pub fn add_middleware(&mut self, layer: Layer) {
        self.scope.middleware.prepend(layer);
    }

    /// Table key a sub-path registers under.
    pub fn full_path(&self, sub_path: &str) -> String {
        path::compose(&self.server_base, &self.base_url, sub_path)
    }

    /// Bind `chain` to `method` at `sub_path`.
    ///
    /// Other methods already registered at the same path are kept.
    pub fn register<I>(&mut self, method: Method, sub_path: &str, chain: I) -> &mut Self
    where
        I: IntoIterator<Item = Layer>,
    {
        let full = self.full_path(sub_path);
        let call_site: Vec<Layer> = chain.into_iter().collect();
        tracing::debug!(
            method = %method,
            path = %full,
            layers = call_site.len(),
            "Route registered"
        );
        let ep = self.bind(call_site);
        self.routes.register(full, method, ep);
        self
    }

    pub fn get<I: IntoIterator<Item = Layer>>(&mut self, sub_path: &str, chain: I) -> &mut Self {
        self.register(Method::Get, sub_path, chain)
    }

    pub fn post<I: IntoIterator<Item = Layer>>(&mut self, sub_path: &str, chain: I) -> &mut Self {
        self.register(Method::Post, sub_path, chain)
    }

    pub fn put<I: IntoIterator<Item = Layer>>(&mut self, sub_path: &str, chain: I) -> &mut Self {
        self.register(Method::Put, sub_path, chain)
    }

    pub fn delete<I: IntoIterator<Item = Layer>>(&mut self, sub_path: &str, chain: I) -> &mut Self {
        self.register(Method::Delete, sub_path, chain)
    }

    pub fn head<I: IntoIterator<Item = Layer>>(&mut self, sub_path: &str, chain: I) -> &mut Self {
        self.register(Method::Head, sub_path, chain)
    }

    pub fn options<I: IntoIterator<Item = Layer>>(&mut self, sub_path: &str, chain: I) -> &mut Self {
        self.register(Method::Options, sub_path, chain)
    }

    /// Attach this route to a server's global layers and listener.
    pub(crate) fn subscribe(&self, server: &Arc<ServerShared>) {
        self.scope.server.store(Some(Arc::clone(server)));
    }

    #[cfg(test)]
    pub(crate) fn is_subscribed_to(&self, server: &Arc<ServerShared>) -> bool {
        self.scope
            .server
            .load_full()
            .is_some_and(|s| Arc::ptr_eq(&s, server))
    }

    fn bind(&self, call_site: Vec<Layer>) -> Endpoint {
        let scope = Arc::clone(&self.scope);
        let call_site: Arc<[Layer]> = call_site.into();
        endpoint(move |req| {
            let scope = Arc::clone(&scope);
            let call_site = Arc::clone(&call_site);
            async move {
                let mut req = req;
                scope.resolve_ip(&mut req);
                let chain = scope.compose(&call_site);
                chain::run(&mut req, chain).await
            }
        })
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::new("")
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("base_url", &self.base_url)
            .field("server_base", &self.server_base)
            .field("routes", &self.routes)
            .field("middleware", &self.scope.middleware)
            .finish()
    }
}
