//! Switchyard demo server.
//!
//! ```text
//!   request ──▶ axum fallback ──▶ exact table lookup ──▶ endpoint
//!                                       │                   │
//!                                       ▼                   ▼
//!                                 404 Not Found     globals ▶ route ▶ call-site
//! ```
//!
//! Serves a sample `/api` route plus any static mounts from the config
//! file until SIGINT or SIGTERM.

use std::path::PathBuf;

use axum::http::{HeaderValue, StatusCode};
use clap::Parser;
use serde_json::json;

use switchyard::http::response;
use switchyard::lifecycle::{signals, startup};
use switchyard::observability::logging;
use switchyard::{handler, middleware, Layer, Route};

#[derive(Debug, Parser)]
#[command(name = "switchyard", version, about = "Exact-match HTTP router demo")]
struct Cli {
    /// TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding `listener.port`.
    #[arg(short, long)]
    port: Option<u16>,
}

/// Logs the request line and how long the rest of the chain took.
fn request_logger() -> Layer {
    middleware(|req, next| {
        Box::pin(async move {
            let method = req.method().clone();
            let path = req.path().to_string();
            let started = std::time::Instant::now();
            let res = next.run(req).await?;
            tracing::info!(
                method = %method,
                path = %path,
                ip = req.ip().unwrap_or("-"),
                status = res.status().as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Handled request"
            );
            Ok(res)
        })
    })
}

fn custom_header() -> Layer {
    middleware(|req, next| {
        Box::pin(async move {
            let mut res = next.run(req).await?;
            res.headers_mut().insert("x-custom", HeaderValue::from_static("true"));
            Ok(res)
        })
    })
}

fn sample_route() -> Route {
    let mut api = Route::new("/api");
    api.get(
        "/hello",
        [
            custom_header(),
            handler(|_req| Box::pin(async { Ok(response::text(StatusCode::OK, "Hello World")) })),
        ],
    )
    .get(
        "/bye",
        [
            custom_header(),
            handler(|_req| Box::pin(async { Ok(response::text(StatusCode::OK, "Bye World")) })),
        ],
    )
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
    );
    api
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = startup::load(cli.config.as_deref())?;
    if let Err(e) = logging::init(&config.observability) {
        eprintln!("logging already initialized: {e}");
    }

    tracing::info!("switchyard v{} starting", env!("CARGO_PKG_VERSION"));

    let port = cli.port.unwrap_or(config.listener.port);
    let mut server = startup::prepare(config).await?;
    server.use_middleware(request_logger());
    server.use_route(&sample_route()).await?;

    server
        .listen(port, |addr| {
            tracing::info!(address = %addr, "Listening for connections");
        })
        .await?;

    let signal = signals::wait_for_signal().await?;
    tracing::info!(signal, "Shutdown signal received");

    server.stop().await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
