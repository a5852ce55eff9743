//! Server aggregator.
//!
//! # Responsibilities
//! - Own the global middleware stack and the aggregate route table
//! - Merge used routes and static mounts into the table
//! - Start, restart, hot swap and stop the live listener
//! - Publish the listener's address resolver to every used route
//!
//! # Design Decisions
//! - Structural changes (`use_route`, `serve_static`) refresh the
//!   listener; middleware changes never do
//! - Mounting and applying are separate steps (`mount_*` vs `restart` /
//!   `hot_swap`); the combined calls follow `ReloadStrategy`
//! - Every lifecycle call takes `&mut self`, so a restart cannot overlap
//!   another mutation

use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use crate::config::{ReloadStrategy, ServerConfig};
use crate::error::{Error, Result};
use crate::http::response;
use crate::http::static_files::{FileLoader, LoadStatic};
use crate::middleware::chain::Layer;
use crate::net::host::AxumServe;
use crate::net::listener::{ListenerHandle, Serve, ServeConfig};
use crate::routing::method::{Method, MethodHandlers};
use crate::routing::route::{Route, ServerShared};
use crate::routing::table::{endpoint, Endpoint, RouteTable};

/// Aggregates routes, global middleware and static files behind one listener.
pub struct Server {
    config: ServerConfig,
    /// Registrations made directly on the server.
    root: Route,
    routes: RouteTable,
    /// Base URLs of used routes.
    mounted: BTreeSet<String>,
    shared: Arc<ServerShared>,
    listener: Option<Box<dyn ListenerHandle>>,
    serve: Arc<dyn Serve>,
    loader: Arc<dyn LoadStatic>,
    fallback: Endpoint,
}

impl Server {
    /// Server backed by axum and the filesystem loader.
    pub fn new(config: ServerConfig) -> Self {
        let serve = Arc::new(AxumServe::from_config(&config));
        Self::with_primitives(config, serve, Arc::new(FileLoader))
    }

    /// Server backed by caller-supplied host and loader primitives.
    pub fn with_primitives(
        config: ServerConfig,
        serve: Arc<dyn Serve>,
        loader: Arc<dyn LoadStatic>,
    ) -> Self {
        let shared = Arc::new(ServerShared::default());
        let root = Route::server_root(config.routing.base_path.clone());
        root.subscribe(&shared);

        Self {
            config,
            root,
            routes: RouteTable::new(),
            mounted: BTreeSet::new(),
            shared,
            listener: None,
            serve,
            loader,
            fallback: endpoint(|_req| async move { Ok(response::not_found()) }),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The aggregate table the next refresh will serve.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Global layers in execution order.
    pub fn global_middleware(&self) -> Arc<Vec<Layer>> {
        self.shared.globals.snapshot()
    }

    /// Base URLs of every route used so far.
    pub fn mounted_bases(&self) -> impl Iterator<Item = &str> {
        self.mounted.iter().map(String::as_str)
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(|l| l.local_addr())
    }

    pub fn port(&self) -> Option<u16> {
        self.listener.as_ref().map(|l| l.port())
    }

    /// Add a global layer, effective from the next request.
    ///
    /// Used routes run it ahead of the globals already present; routes
    /// registered on the server itself run globals in the order added.
    pub fn use_middleware(&mut self, layer: Layer) {
        self.shared.globals.prepend(layer);
        tracing::debug!(globals = self.shared.globals.len(), "Global middleware added");
    }

    /// Merge `route` into the table and attach it to this server.
    ///
    /// Does not touch the listener; see [`Server::use_route`].
    pub fn mount_route(&mut self, route: &Route) {
        self.routes.merge(route.routes());
        route.subscribe(&self.shared);
        self.mounted.insert(route.base_url().to_string());
        tracing::info!(
            base_url = %route.base_url(),
            paths = route.routes().len(),
            "Route mounted"
        );
    }

    /// Mount `route`, then refresh the listener.
    pub async fn use_route(&mut self, route: &Route) -> Result<()> {
        self.mount_route(route);
        self.refresh().await
    }

    /// Load `file` and answer every method at `path` with it.
    ///
    /// On a load failure the table is left as it was.
    pub async fn mount_static(&mut self, path: &str, file: impl AsRef<Path>) -> Result<()> {
        let file = file.as_ref();
        let ep = self.loader.load_default_export(file).await?;
        self.routes.insert(path, MethodHandlers::uniform(ep));
        tracing::info!(path = %path, file = %file.display(), "Static file mounted");
        Ok(())
    }

    /// Mount a static file, then refresh the listener.
    pub async fn serve_static(&mut self, path: &str, file: impl AsRef<Path>) -> Result<()> {
        self.mount_static(path, file).await?;
        self.refresh().await
    }

    /// Register a chain directly on the server, under `routing.base_path`.
    ///
    /// Lands in the table at once; a live listener sees it after the next
    /// refresh.
    pub fn register<I>(&mut self, method: Method, sub_path: &str, chain: I) -> &mut Self
    where
        I: IntoIterator<Item = Layer>,
    {
        let full = self.root.full_path(sub_path);
        self.root.register(method, sub_path, chain);
        if let Some(ep) = self.root.routes().lookup(&full, method) {
            self.routes.register(full, method, ep.clone());
        }
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

    /// Serve the table on `port`, then call `on_ready` with the bound address.
    ///
    /// An existing listener is stopped first.
    pub async fn listen<F>(&mut self, port: u16, on_ready: F) -> Result<SocketAddr>
    where
        F: FnOnce(SocketAddr),
    {
        if self.listener.is_some() {
            self.stop().await?;
        }
        let addr = self.bind(port).await?;
        on_ready(addr);
        Ok(addr)
    }

    /// Stop the live listener and bind again on the same port.
    ///
    /// No-op when nothing is listening.
    pub async fn restart(&mut self) -> Result<()> {
        let Some(listener) = self.listener.take() else {
            tracing::debug!("Restart skipped, not listening");
            return Ok(());
        };
        let port = listener.port();
        tracing::info!(port, paths = self.routes.len(), "Restarting listener");

        self.shared.set_resolver(None);
        listener.stop(self.config.listener.graceful_stop).await?;
        self.bind(port).await?;
        Ok(())
    }

    /// Hand the live listener the current table without rebinding.
    ///
    /// No-op when nothing is listening.
    pub fn hot_swap(&mut self) {
        match &self.listener {
            Some(listener) => listener.swap_table(Arc::new(self.routes.clone())),
            None => tracing::debug!("Hot swap skipped, not listening"),
        }
    }

    /// Apply table changes to the live listener per `routing.reload`.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.config.routing.reload {
            ReloadStrategy::Restart => self.restart().await,
            ReloadStrategy::HotSwap => {
                self.hot_swap();
                Ok(())
            }
        }
    }

    /// Stop listening. Routes stop resolving requester addresses.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(listener) = self.listener.take() else {
            return Ok(());
        };
        let addr = listener.local_addr();
        self.shared.set_resolver(None);
        listener.stop(self.config.listener.graceful_stop).await?;
        tracing::info!(address = %addr, "Server stopped");
        Ok(())
    }

    async fn bind(&mut self, port: u16) -> Result<SocketAddr> {
        let host: IpAddr = self
            .config
            .listener
            .host
            .parse()
            .map_err(|_| Error::InvalidHost(self.config.listener.host.clone()))?;

        let mut serve_config = ServeConfig::new(port, Arc::new(self.routes.clone()), self.fallback.clone());
        serve_config.host = host;
        serve_config.max_body_bytes = self.config.routing.max_body_bytes;

        let listener = self.serve.serve(serve_config).await?;
        let addr = listener.local_addr();
        self.shared.set_resolver(Some(listener.resolver()));
        self.listener = Some(listener);

        tracing::info!(
            address = %addr,
            paths = self.routes.len(),
            routes = self.mounted.len(),
            "Server listening"
        );
        Ok(addr)
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("routes", &self.routes)
            .field("mounted", &self.mounted)
            .field("globals", &self.shared.globals.len())
            .field("local_addr", &self.local_addr())
            .finish()
    }
}
