//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::http::{HeaderValue, StatusCode};
use futures_util::future::BoxFuture;
use serde_json::json;

use switchyard::http::response;
use switchyard::net::listener::{ListenerHandle, ResolveAddress, Serve, ServeConfig};
use switchyard::routing::RouteTable;
use switchyard::{handler, middleware, Layer, Request, Route, ServerConfig};

/// Config bound to loopback with a short drain.
#[allow(dead_code)]
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.drain_timeout_secs = 2;
    config
}

/// Client without connection reuse, so restarts never hit a stale socket.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

/// Entries pushed by `logger` into request extensions.
#[allow(dead_code)]
#[derive(Clone, Default, Debug)]
pub struct Logs(pub Vec<&'static str>);

#[allow(dead_code)]
fn push_log(req: &mut Request, entry: &'static str) {
    let mut logs = req.extensions().get::<Logs>().cloned().unwrap_or_default();
    logs.0.push(entry);
    req.extensions_mut().insert(logs);
}

#[allow(dead_code)]
pub fn logger() -> Layer {
    middleware(|req, next| {
        Box::pin(async move {
            push_log(req, "logger-start");
            let res = next.run(req).await;
            push_log(req, "logger-end");
            res
        })
    })
}

#[allow(dead_code)]
pub fn add_custom_header() -> Layer {
    middleware(|req, next| {
        Box::pin(async move {
            let mut res = next.run(req).await?;
            res.headers_mut().insert("x-custom", HeaderValue::from_static("true"));
            Ok(res)
        })
    })
}

/// Terminal layer answering `{"echo": <raw body>}`.
#[allow(dead_code)]
pub fn echo_json() -> Layer {
    middleware(|req, _next| {
        Box::pin(async move {
            let body = req.text().await?;
            Ok(response::json(StatusCode::OK, &json!({ "echo": body })))
        })
    })
}

#[allow(dead_code)]
pub fn text(body: &'static str) -> Layer {
    handler(move |_req| Box::pin(async move { Ok(response::text(StatusCode::OK, body)) }))
}

/// The `/api` route the server suites share.
#[allow(dead_code)]
pub fn sample_route() -> Route {
    let mut api = Route::new("/api");
    api.get("/hello", [logger(), add_custom_header(), text("Hello World")])
        .get("/bye", [logger(), add_custom_header(), text("Bye World")])
        .options(
            "/hello",
            [handler(|_req| Box::pin(async { Ok(response::empty(StatusCode::NO_CONTENT)) }))],
        )
        .post(
            "/echo",
            [handler(|req| {
                Box::pin(async move {
                    let data: serde_json::Value = req.json().await?;
                    Ok(response::json(StatusCode::OK, &json!({ "received": data })))
                })
            })],
        )
        .get(
            "/logs",
            [
                logger(),
                handler(|req| {
                    Box::pin(async move {
                        let logs = req.extensions().get::<Logs>().cloned().unwrap_or_default();
                        Ok(response::json(StatusCode::OK, &logs.0))
                    })
                }),
            ],
        )
        .get(
            "/ip",
            [handler(|req| {
                Box::pin(async move {
                    let ip = req.ip().unwrap_or("none").to_string();
                    Ok(response::text(StatusCode::OK, ip))
                })
            })],
        );
    api
}

#[allow(dead_code)]
pub fn cats_route() -> Route {
    let mut cats = Route::new("/cats");
    cats.get("/", [text("cats")]);
    cats
}

/// What the recording host saw, in order.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Serve { port: u16, paths: usize },
    Swap { paths: usize },
    Stop { port: u16, graceful: bool },
}

#[allow(dead_code)]
pub type Events = Arc<Mutex<Vec<Event>>>;

/// Host primitive that records calls instead of binding sockets.
#[allow(dead_code)]
#[derive(Default, Clone)]
pub struct RecordingServe {
    pub events: Events,
}

#[allow(dead_code)]
impl RecordingServe {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl Serve for RecordingServe {
    fn serve(&self, config: ServeConfig) -> BoxFuture<'_, switchyard::Result<Box<dyn ListenerHandle>>> {
        let port = if config.port == 0 { 45000 } else { config.port };
        self.events.lock().unwrap().push(Event::Serve {
            port,
            paths: config.table.len(),
        });
        let handle: Box<dyn ListenerHandle> = Box::new(RecordingHandle {
            addr: SocketAddr::from(([127, 0, 0, 1], port)),
            events: Arc::clone(&self.events),
        });
        Box::pin(async move { Ok(handle) })
    }
}

#[allow(dead_code)]
struct RecordingHandle {
    addr: SocketAddr,
    events: Events,
}

#[allow(dead_code)]
struct Loopback;

impl ResolveAddress for Loopback {
    fn requester_address(&self, _req: &Request) -> Option<String> {
        Some("::ffff:127.0.0.1".to_string())
    }
}

impl ListenerHandle for RecordingHandle {
    fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    fn resolver(&self) -> Arc<dyn ResolveAddress> {
        Arc::new(Loopback)
    }

    fn swap_table(&self, table: Arc<RouteTable>) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Swap { paths: table.len() });
    }

    fn stop(self: Box<Self>, graceful: bool) -> BoxFuture<'static, switchyard::Result<()>> {
        self.events.lock().unwrap().push(Event::Stop {
            port: self.addr.port(),
            graceful,
        });
        Box::pin(async { Ok(()) })
    }
}
