//! Per-request context passed through the middleware chain.
//!
//! # Responsibilities
//! - Wrap the host's `http::Request` without copying it
//! - Carry the resolved requester IP for downstream layers
//! - Read the body once (text, JSON, raw bytes) under a size limit
//!
//! # Design Decisions
//! - Layers receive `&mut Request`, so anything one layer attaches
//!   (extensions, IP, a consumed body) is seen by every other layer
//! - The body is taken on first read; later reads see an empty body

use axum::body::{Body, Bytes};
use axum::http::{self, Extensions, HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Default request body limit (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// The request seen by middleware and handlers.
#[derive(Debug)]
pub struct Request {
    inner: http::Request<Body>,
    ip: Option<String>,
    body_limit: usize,
}

impl Request {
    /// Wrap a host request.
    pub fn new(inner: http::Request<Body>) -> Self {
        Self {
            inner,
            ip: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Set the maximum number of body bytes the read helpers accept.
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// Typed per-request storage shared by all layers of the chain.
    pub fn extensions(&self) -> &Extensions {
        self.inner.extensions()
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        self.inner.extensions_mut()
    }

    /// Requester IP resolved by the owning route, if a listener was live.
    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    pub fn set_ip(&mut self, ip: impl Into<String>) {
        self.ip = Some(ip.into());
    }

    /// Take the whole body as bytes.
    pub async fn bytes(&mut self) -> Result<Bytes> {
        let body = std::mem::take(self.inner.body_mut());
        axum::body::to_bytes(body, self.body_limit)
            .await
            .map_err(Error::Body)
    }

    /// Take the body as a UTF-8 string.
    pub async fn text(&mut self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Take the body and decode it as JSON.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn into_inner(self) -> http::Request<Body> {
        self.inner
    }
}

impl From<http::Request<Body>> for Request {
    fn from(inner: http::Request<Body>) -> Self {
        Self::new(inner)
    }
}
