//! Default host primitive on top of axum.
//!
//! # Responsibilities
//! - Bind a Tokio `TcpListener` and serve it with `axum::serve`
//! - Dispatch by exact path + method against a swappable table
//! - Map chain failures to a generic 500
//! - Graceful stop bounded by a drain timeout
//!
//! # Design Decisions
//! - A single axum fallback handler does all dispatch, so axum never
//!   compiles path patterns
//! - Peer addresses come from `ConnectInfo<SocketAddr>`
//! - Dropping a handle without `stop` still starts a graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::extract::{ConnectInfo, State};
use axum::Router;
use futures_util::future::BoxFuture;
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinHandle};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::http::request::Request;
use crate::http::response::{self, Response};
use crate::lifecycle::Shutdown;
use crate::net::listener::{ListenerHandle, ResolveAddress, Serve, ServeConfig};
use crate::routing::method::Method;
use crate::routing::table::{Endpoint, RouteTable};

const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Serves route tables with axum/hyper.
#[derive(Debug, Clone)]
pub struct AxumServe {
    drain_timeout: Duration,
    request_ids: bool,
    trace_requests: bool,
}

impl AxumServe {
    pub fn new() -> Self {
        Self {
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            request_ids: true,
            trace_requests: true,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            drain_timeout: Duration::from_secs(config.listener.drain_timeout_secs),
            request_ids: config.observability.request_id,
            trace_requests: config.observability.trace_requests,
        }
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// The axum service dispatching against `table`.
    pub fn app(&self, table: Arc<ArcSwap<RouteTable>>, fallback: Endpoint, max_body_bytes: usize) -> Router {
        let state = DispatchState {
            table,
            fallback,
            max_body_bytes,
        };
        let mut app = Router::new().fallback(dispatch).with_state(state);

        if self.trace_requests {
            app = app.layer(TraceLayer::new_for_http());
        }
        if self.request_ids {
            app = app
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        }
        app
    }
}

impl Default for AxumServe {
    fn default() -> Self {
        Self::new()
    }
}

impl Serve for AxumServe {
    fn serve(&self, config: ServeConfig) -> BoxFuture<'_, Result<Box<dyn ListenerHandle>>> {
        Box::pin(async move {
            let addr = SocketAddr::new(config.host, config.port);
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|source| Error::Bind { addr, source })?;
            let local_addr = listener
                .local_addr()
                .map_err(|source| Error::Bind { addr, source })?;

            let table = Arc::new(ArcSwap::new(config.table));
            let app = self.app(Arc::clone(&table), config.fallback, config.max_body_bytes);

            let shutdown = Shutdown::new();
            let signal = shutdown.subscribe();
            let task = tokio::spawn(async move {
                axum::serve(
                    listener,
                    app.into_make_service_with_connect_info::<SocketAddr>(),
                )
                .with_graceful_shutdown(signal.recv())
                .await
            });

            tracing::info!(address = %local_addr, "Listener bound");

            let handle: Box<dyn ListenerHandle> = Box::new(AxumListener {
                local_addr,
                table,
                shutdown,
                task,
                drain_timeout: self.drain_timeout,
            });
            Ok(handle)
        })
    }
}

#[derive(Clone)]
struct DispatchState {
    table: Arc<ArcSwap<RouteTable>>,
    fallback: Endpoint,
    max_body_bytes: usize,
}

async fn dispatch(State(state): State<DispatchState>, request: axum::extract::Request) -> Response {
    let method = Method::from_http(request.method());
    let path = request.uri().path().to_string();
    let endpoint = {
        let table = state.table.load();
        method.and_then(|m| table.lookup(&path, m).cloned())
    };

    let req = Request::new(request).with_body_limit(state.max_body_bytes);
    let result = match endpoint {
        Some(endpoint) => endpoint(req).await,
        None => {
            tracing::debug!(method = ?method, path = %path, "No route matched");
            (state.fallback)(req).await
        }
    };

    match result {
        Ok(res) => res,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Request chain failed");
            response::internal_error()
        }
    }
}

/// Reads the peer address axum attaches to every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConnectInfoResolver;

impl ResolveAddress for ConnectInfoResolver {
    fn requester_address(&self, req: &Request) -> Option<String> {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    }
}

struct AxumListener {
    local_addr: SocketAddr,
    table: Arc<ArcSwap<RouteTable>>,
    shutdown: Shutdown,
    task: JoinHandle<std::io::Result<()>>,
    drain_timeout: Duration,
}

impl ListenerHandle for AxumListener {
    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn resolver(&self) -> Arc<dyn ResolveAddress> {
        Arc::new(ConnectInfoResolver)
    }

    fn swap_table(&self, table: Arc<RouteTable>) {
        tracing::debug!(address = %self.local_addr, paths = table.len(), "Route table swapped");
        self.table.store(table);
    }

    fn stop(self: Box<Self>, graceful: bool) -> BoxFuture<'static, Result<()>> {
        let AxumListener {
            local_addr,
            shutdown,
            mut task,
            drain_timeout,
            ..
        } = *self;

        Box::pin(async move {
            if graceful {
                shutdown.trigger();
                match tokio::time::timeout(drain_timeout, &mut task).await {
                    Ok(joined) => return finish(local_addr, joined),
                    Err(_) => tracing::warn!(
                        address = %local_addr,
                        timeout_secs = drain_timeout.as_secs(),
                        "Drain timed out, aborting listener"
                    ),
                }
            }

            task.abort();
            match task.await {
                Err(e) if e.is_cancelled() => {
                    tracing::info!(address = %local_addr, "Listener aborted");
                    Ok(())
                }
                joined => finish(local_addr, joined),
            }
        })
    }
}

fn finish(local_addr: SocketAddr, joined: Result<std::io::Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(Ok(())) => {
            tracing::info!(address = %local_addr, "Listener stopped");
            Ok(())
        }
        Ok(Err(e)) => Err(Error::Listener(e.to_string())),
        Err(e) => Err(Error::Listener(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::table::endpoint;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use tower::ServiceExt;

    fn status(code: StatusCode) -> Endpoint {
        endpoint(move |_req| async move { Ok(response::empty(code)) })
    }

    fn not_found() -> Endpoint {
        endpoint(|_req| async move { Ok(response::not_found()) })
    }

    fn app(table: RouteTable) -> (Router, Arc<ArcSwap<RouteTable>>) {
        let shared = Arc::new(ArcSwap::from_pointee(table));
        let app = AxumServe::new().app(Arc::clone(&shared), not_found(), 1024);
        (app, shared)
    }

    async fn send(app: &Router, method: &str, uri: &str) -> Response {
        let req = HttpRequest::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn test_exact_dispatch_and_fallback() {
        let mut table = RouteTable::new();
        table.register("/api/hello", Method::Get, status(StatusCode::OK));
        let (app, _) = app(table);

        assert_eq!(send(&app, "GET", "/api/hello").await.status(), StatusCode::OK);
        assert_eq!(send(&app, "POST", "/api/hello").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, "PATCH", "/api/hello").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, "GET", "/api/hello/").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, "GET", "/not-found").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let mut table = RouteTable::new();
        table.register("/", Method::Get, status(StatusCode::OK));
        let (app, _) = app(table);

        let res = send(&app, "GET", "/").await;
        assert!(res.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_chain_error_maps_to_500() {
        let mut table = RouteTable::new();
        table.register(
            "/broken",
            Method::Get,
            endpoint(|_req| async move { Err(Error::ChainExhausted) }),
        );
        let (app, _) = app(table);

        let res = send(&app, "GET", "/broken").await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_swapped_table_is_served() {
        let (app, shared) = app(RouteTable::new());
        assert_eq!(send(&app, "GET", "/cats").await.status(), StatusCode::NOT_FOUND);

        let mut table = RouteTable::new();
        table.register("/cats", Method::Get, status(StatusCode::OK));
        shared.store(Arc::new(table));
        assert_eq!(send(&app, "GET", "/cats").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_connect_info_resolver() {
        let peer: SocketAddr = "127.0.0.1:4567".parse().unwrap();
        let mut inner = HttpRequest::new(Body::empty());
        inner.extensions_mut().insert(ConnectInfo(peer));
        let req = Request::new(inner);
        assert_eq!(
            ConnectInfoResolver.requester_address(&req).as_deref(),
            Some("127.0.0.1")
        );

        let bare = Request::new(HttpRequest::new(Body::empty()));
        assert_eq!(ConnectInfoResolver.requester_address(&bare), None);
    }

    #[tokio::test]
    async fn test_serve_and_stop_releases_port() {
        let serve = AxumServe::new().with_drain_timeout(Duration::from_secs(2));
        let mut config = ServeConfig::new(0, Arc::new(RouteTable::new()), not_found());
        config.host = "127.0.0.1".parse().unwrap();

        let handle = serve.serve(config.clone()).await.unwrap();
        let port = handle.port();
        assert_ne!(port, 0);
        handle.stop(true).await.unwrap();

        config.port = port;
        let again = serve.serve(config).await.unwrap();
        assert_eq!(again.port(), port);
        again.stop(false).await.unwrap();
    }
}
