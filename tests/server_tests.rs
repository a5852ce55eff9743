//! End-to-end tests against the axum host on real sockets.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use serde_json::{json, Value};

use switchyard::config::ReloadStrategy;
use switchyard::http::response;
use switchyard::{handler, middleware, Layer, Route, Server, ServerConfig};

mod common;

async fn start(config: ServerConfig) -> (Server, SocketAddr) {
    let mut server = Server::new(config);
    server.use_route(&common::sample_route()).await.unwrap();
    server.post("/test-mw", [common::echo_json()]);
    let addr = server.listen(0, |_| {}).await.unwrap();
    (server, addr)
}

fn global_header(value: &'static str) -> Layer {
    middleware(move |req, next| {
        Box::pin(async move {
            let mut res = next.run(req).await?;
            res.headers_mut().append("x-global", HeaderValue::from_static(value));
            Ok(res)
        })
    })
}

#[tokio::test]
async fn test_hello_and_bye_with_route_middleware() {
    let (mut server, addr) = start(common::test_config()).await;
    let client = common::client();

    for (path, body) in [("/api/hello", "Hello World"), ("/api/bye", "Bye World")] {
        let res = client.get(common::url(addr, path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["x-custom"], "true");
        assert_eq!(res.text().await.unwrap(), body);
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_echo_json_body() {
    let (mut server, addr) = start(common::test_config()).await;

    let res = common::client()
        .post(common::url(addr, "/api/echo"))
        .json(&json!({ "msg": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "received": { "msg": "hi" } }));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_server_owned_route_with_middleware_terminal() {
    let (mut server, addr) = start(common::test_config()).await;

    let res = common::client()
        .post(common::url(addr, "/test-mw"))
        .body("switchyard-test")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["echo"], "switchyard-test");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_misses_are_plain_404() {
    let (mut server, addr) = start(common::test_config()).await;
    let client = common::client();

    let res = client.get(common::url(addr, "/not-found")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "Not Found");

    // Known path, unregistered method: still 404, never 405.
    let res = client.get(common::url(addr, "/api/echo")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .patch(common::url(addr, "/api/hello"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(common::url(addr, "/api/hello/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.stop().await.unwrap();
}

fn counting_global(hits: Arc<AtomicUsize>) -> Layer {
    middleware(move |req, next| {
        let hits = Arc::clone(&hits);
        Box::pin(async move {
            hits.fetch_add(1, Ordering::SeqCst);
            next.run(req).await
        })
    })
}

#[tokio::test]
async fn test_misses_run_no_middleware_or_handler() {
    let (mut server, addr) = start(common::test_config()).await;
    let client = common::client();

    let global_hits = Arc::new(AtomicUsize::new(0));
    let handler_hits = Arc::new(AtomicUsize::new(0));
    server.use_middleware(counting_global(Arc::clone(&global_hits)));

    let mut counted = Route::new("/counted");
    let hits = Arc::clone(&handler_hits);
    counted.get(
        "/",
        [handler(move |_req| {
            let hits = Arc::clone(&hits);
            Box::pin(async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(response::text(StatusCode::OK, "counted"))
            })
        })],
    );
    server.use_route(&counted).await.unwrap();

    let misses = [
        (reqwest::Method::GET, "/nowhere"),
        (reqwest::Method::PATCH, "/nowhere"),
        (reqwest::Method::POST, "/counted"),
        (reqwest::Method::PATCH, "/counted"),
        (reqwest::Method::DELETE, "/counted"),
    ];
    for (method, path) in misses {
        let res = client
            .request(method, common::url(addr, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.text().await.unwrap(), "Not Found");
    }
    assert_eq!(global_hits.load(Ordering::SeqCst), 0);
    assert_eq!(handler_hits.load(Ordering::SeqCst), 0);

    let res = client.get(common::url(addr, "/counted")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "counted");
    assert_eq!(global_hits.load(Ordering::SeqCst), 1);
    assert_eq!(handler_hits.load(Ordering::SeqCst), 1);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_options_only_when_registered() {
    let (mut server, addr) = start(common::test_config()).await;
    let client = common::client();

    let res = client
        .request(reqwest::Method::OPTIONS, common::url(addr, "/api/hello"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .request(reqwest::Method::OPTIONS, common::url(addr, "/api/bye"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_layers_share_request_context() {
    let (mut server, addr) = start(common::test_config()).await;

    let res = common::client()
        .get(common::url(addr, "/api/logs"))
        .send()
        .await
        .unwrap();
    let logs: Vec<String> = res.json().await.unwrap();
    assert_eq!(logs, vec!["logger-start"]);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_requester_ip_is_loopback() {
    let (mut server, addr) = start(common::test_config()).await;

    let res = common::client()
        .get(common::url(addr, "/api/ip"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "127.0.0.1");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_used_route_appears_after_restart_on_same_port() {
    let (mut server, addr) = start(common::test_config()).await;
    let client = common::client();

    let res = client.get(common::url(addr, "/cats")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.use_route(&common::cats_route()).await.unwrap();
    assert_eq!(server.local_addr(), Some(addr));

    let res = client.get(common::url(addr, "/cats")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "cats");

    // Earlier routes survive the restart.
    let res = client.get(common::url(addr, "/api/hello")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_global_middleware_reaches_live_routes() {
    let (mut server, addr) = start(common::test_config()).await;
    let client = common::client();

    server.use_middleware(global_header("outer"));
    server.use_middleware(global_header("newest"));
    assert_eq!(server.local_addr(), Some(addr));

    let res = client.get(common::url(addr, "/api/hello")).send().await.unwrap();
    let globals: Vec<_> = res
        .headers()
        .get_all("x-global")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    // Appended on the way out: the newest layer is outermost, so it runs last here.
    assert_eq!(globals, vec!["outer", "newest"]);
    assert_eq!(res.headers()["x-custom"], "true");

    let res = client
        .post(common::url(addr, "/test-mw"))
        .body("x")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers().get_all("x-global").iter().count(), 2);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_hot_swap_serves_new_routes_without_rebind() {
    let mut config = common::test_config();
    config.routing.reload = ReloadStrategy::HotSwap;
    let (mut server, addr) = start(config).await;
    let client = common::client();

    let mut birds = Route::new("/birds");
    birds.get("/", [common::text("birds")]);
    server.use_route(&birds).await.unwrap();

    let res = client.get(common::url(addr, "/birds")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "birds");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_static_file_answers_every_method() {
    let mut file = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
    write!(file, "<p>static</p>").unwrap();

    let (mut server, addr) = start(common::test_config()).await;
    server.serve_static("/html", file.path()).await.unwrap();
    let client = common::client();

    for method in [reqwest::Method::GET, reqwest::Method::POST, reqwest::Method::DELETE] {
        let res = client
            .request(method, common::url(addr, "/html"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["content-type"], "text/html");
        assert_eq!(res.text().await.unwrap(), "<p>static</p>");
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_chain_without_handler_is_500() {
    let (mut server, addr) = start(common::test_config()).await;

    let mut broken = Route::new("/broken");
    broken.get("/", [common::add_custom_header()]);
    server.use_route(&broken).await.unwrap();

    let res = common::client()
        .get(common::url(addr, "/broken"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await.unwrap(), "Internal Server Error");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_releases_the_port() {
    let (mut server, addr) = start(common::test_config()).await;
    server.stop().await.unwrap();
    assert!(!server.is_listening());

    let err = common::client()
        .get(common::url(addr, "/api/hello"))
        .send()
        .await;
    assert!(err.is_err());

    let rebound = server.listen(addr.port(), |_| {}).await.unwrap();
    assert_eq!(rebound, addr);
    server.stop().await.unwrap();
}
