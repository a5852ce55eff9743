//! Static file loading.
//!
//! # Responsibilities
//! - Turn a file path into an endpoint serving its contents
//! - Guess `Content-Type` from the file extension
//!
//! # Design Decisions
//! - The file is read once, at mount time; later edits need a remount
//! - Static endpoints answer directly and never run middleware

use std::path::Path;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use futures_util::future::BoxFuture;

use crate::error::{Error, Result};
use crate::http::response::Response;
use crate::routing::table::{endpoint, Endpoint};

/// Produces the handler a static mount serves.
pub trait LoadStatic: Send + Sync {
    fn load_default_export<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Endpoint>>;
}

/// Reads files from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl LoadStatic for FileLoader {
    fn load_default_export<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Endpoint>> {
        Box::pin(async move {
            let contents = tokio::fs::read(path).await.map_err(|source| Error::StaticLoad {
                path: path.to_path_buf(),
                source,
            })?;
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            let content_type = HeaderValue::from_str(mime.as_ref())
                .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

            tracing::debug!(
                file = %path.display(),
                bytes = contents.len(),
                content_type = %mime,
                "Static file loaded"
            );

            let body = Bytes::from(contents);
            Ok(endpoint(move |_req| {
                let res = file_response(body.clone(), content_type.clone());
                async move { Ok(res) }
            }))
        })
    }
}

fn file_response(body: Bytes, content_type: HeaderValue) -> Response {
    let mut res = Response::new(Body::from(body));
    *res.status_mut() = StatusCode::OK;
    res.headers_mut().insert(header::CONTENT_TYPE, content_type);
    res
}
